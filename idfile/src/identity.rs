//! The in-memory form of an identity file.

use std::fmt::{Debug, Formatter};

/// The components of an identity file.
///
/// Every field holds raw bytes exactly as they appear in the file. An empty
/// buffer means the component is absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct IdentityFile {
    /// PEM encoded private key.
    pub private_key: Vec<u8>,
    pub certs: Certs,
    pub ca_certs: CaCerts,
}

/// Certificates issued for the private key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Certs {
    /// OpenSSH certificate line (`ssh-...-cert-v01@openssh.com AAAA...`).
    pub ssh: Vec<u8>,
    /// PEM encoded X.509 certificate.
    pub tls: Vec<u8>,
}

/// Trust anchors for validating peers, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaCerts {
    /// `@cert-authority` known_hosts lines.
    pub ssh: Vec<Vec<u8>>,
    /// PEM encoded X.509 CA certificates.
    pub tls: Vec<Vec<u8>>,
}

impl IdentityFile {
    pub fn new(private_key: impl Into<Vec<u8>>) -> Self {
        IdentityFile {
            private_key: private_key.into(),
            ..Default::default()
        }
    }

    pub fn with_ssh_cert(mut self, cert: impl Into<Vec<u8>>) -> Self {
        self.certs.ssh = cert.into();
        self
    }

    pub fn with_tls_cert(mut self, cert: impl Into<Vec<u8>>) -> Self {
        self.certs.tls = cert.into();
        self
    }

    pub fn with_ssh_ca(mut self, ca: impl Into<Vec<u8>>) -> Self {
        self.ca_certs.ssh.push(ca.into());
        self
    }

    pub fn with_tls_ca(mut self, ca: impl Into<Vec<u8>>) -> Self {
        self.ca_certs.tls.push(ca.into());
        self
    }

    pub fn has_private_key(&self) -> bool {
        !self.private_key.is_empty()
    }

    pub fn has_ssh_cert(&self) -> bool {
        !self.certs.ssh.is_empty()
    }

    pub fn has_tls_cert(&self) -> bool {
        !self.certs.tls.is_empty()
    }
}

impl Debug for IdentityFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityFile")
            .field(
                "private_key",
                &format_args!("[redacted; {} bytes]", self.private_key.len()),
            )
            .field("certs", &self.certs)
            .field("ca_certs", &self.ca_certs)
            .finish()
    }
}

//! rustls client configuration from an identity file.
//!
//! This module is only compiled when the `rustls` feature is enabled.

use std::sync::Arc;

use pem::Label;
use rustls::crypto::CryptoProvider;
use rustls::sign::CertifiedKey;
use rustls::{ClientConfig, InconsistentKeys, RootCertStore};
use rustls_pki_types::{
    CertificateDer, PrivateKeyDer, PrivatePkcs1KeyDer, PrivatePkcs8KeyDer, PrivateSec1KeyDer,
};
use tracing::debug;

use crate::error::{Error, Result};
use crate::identity::IdentityFile;

impl IdentityFile {
    /// Builds a TLS client configuration using the ring crypto provider.
    ///
    /// See [`IdentityFile::tls_config_with_provider`].
    pub fn tls_config(&self) -> Result<ClientConfig> {
        self.tls_config_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
    }

    /// Builds a TLS client configuration presenting the identity's
    /// certificate and trusting every TLS CA of the identity file.
    ///
    /// # Errors
    ///
    /// * [`Error::MissingPrivateKey`] if there is no private key.
    /// * [`Error::KeyCertMismatch`] if the TLS certificate is missing or was
    ///   not issued for the private key.
    /// * [`Error::InvalidTrustAnchor`] if any TLS CA entry is not a certificate.
    pub fn tls_config_with_provider(&self, provider: Arc<CryptoProvider>) -> Result<ClientConfig> {
        let key = private_key_der(&self.private_key)?;
        let chain = certificate_chain(&self.certs.tls)?;
        check_key_pair(&chain, &key, &provider)?;
        let roots = root_store(&self.ca_certs.tls)?;
        debug!(roots = roots.len(), chain = chain.len(), "building TLS client config");

        ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| Error::Tls(format!("TLS version config: {e}")))?
            .with_root_certificates(roots)
            .with_client_auth_cert(chain, key)
            .map_err(|e| Error::KeyCertMismatch(format!("client cert config: {e}")))
    }
}

/// Converts the PEM private key of an identity file to DER, keyed by its label.
pub(crate) fn private_key_der(private_key: &[u8]) -> Result<PrivateKeyDer<'static>> {
    if private_key.is_empty() {
        return Err(Error::MissingPrivateKey);
    }
    let pems = pem::parse_many(private_key)?;
    let Some(block) = pems.first() else {
        return Err(Error::MissingPrivateKey);
    };
    let der = block.to_der()?;
    match block.label() {
        Label::PrivateKey => Ok(PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(der))),
        Label::RSAPrivateKey => Ok(PrivateKeyDer::Pkcs1(PrivatePkcs1KeyDer::from(der))),
        Label::ECPrivateKey => Ok(PrivateKeyDer::Sec1(PrivateSec1KeyDer::from(der))),
        other => Err(Error::Tls(format!(
            "unsupported private key type for TLS: {other}"
        ))),
    }
}

fn certificate_chain(cert: &[u8]) -> Result<Vec<CertificateDer<'static>>> {
    if cert.is_empty() {
        return Err(Error::KeyCertMismatch(
            "identity file has no TLS certificate".to_string(),
        ));
    }
    pem::parse_many(cert)?
        .iter()
        .map(|block| -> Result<CertificateDer<'static>> {
            match block.label() {
                Label::Certificate => Ok(CertificateDer::from(block.to_der()?)),
                other => Err(Error::KeyCertMismatch(format!(
                    "expected a CERTIFICATE block, found {other}"
                ))),
            }
        })
        .collect()
}

fn check_key_pair(
    chain: &[CertificateDer<'static>],
    key: &PrivateKeyDer<'static>,
    provider: &CryptoProvider,
) -> Result<()> {
    let signing_key = provider
        .key_provider
        .load_private_key(key.clone_key())
        .map_err(|e| Error::KeyCertMismatch(format!("unusable private key: {e}")))?;
    match CertifiedKey::new(chain.to_vec(), signing_key).keys_match() {
        // the provider cannot tell; leave it to the handshake
        Ok(()) | Err(rustls::Error::InconsistentKeys(InconsistentKeys::Unknown)) => Ok(()),
        Err(e) => Err(Error::KeyCertMismatch(e.to_string())),
    }
}

fn root_store(cas: &[Vec<u8>]) -> Result<RootCertStore> {
    let mut roots = RootCertStore::empty();
    for (index, ca) in cas.iter().enumerate() {
        let invalid = |reason: String| Error::InvalidTrustAnchor { index, reason };
        let blocks = pem::parse_many(ca).map_err(|e| invalid(e.to_string()))?;
        for block in blocks {
            if block.label() != &Label::Certificate {
                return Err(invalid(format!(
                    "expected a CERTIFICATE block, found {}",
                    block.label()
                )));
            }
            let der = block.to_der().map_err(|e| invalid(e.to_string()))?;
            roots
                .add(CertificateDer::from(der))
                .map_err(|e| invalid(e.to_string()))?;
        }
    }
    Ok(roots)
}

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use clap::Args;
use idfile::IdentityFile;
use serde::Serialize;
use ssh_key::{Certificate, HashAlg};

use crate::error::{Error, Result};
use crate::output::OutputFormat;
use crate::utils::{read_identity, sha256_fingerprint};

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the identity file. If not specified, reads from stdin
    file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,
}

/// What an identity file holds. Private key material is reduced to its label.
#[derive(Debug, Serialize)]
pub(crate) struct Summary {
    private_key: Option<String>,
    ssh_cert: Option<SshCertSummary>,
    tls_cert: Option<PemSummary>,
    ssh_cas: usize,
    tls_cas: Vec<PemSummary>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SshCertSummary {
    algorithm: String,
    cert_type: String,
    key_id: String,
    principals: Vec<String>,
    valid_after: u64,
    valid_before: u64,
    fingerprint: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PemSummary {
    label: String,
    sha256_fingerprint: String,
}

impl Summary {
    pub(crate) fn new(ident: &IdentityFile) -> Result<Self> {
        let private_key = if ident.has_private_key() {
            let blocks = pem::parse_many(&ident.private_key)?;
            blocks.first().map(|block| block.label().to_string())
        } else {
            None
        };
        let ssh_cert = if ident.has_ssh_cert() {
            Some(SshCertSummary::new(&ident.certs.ssh)?)
        } else {
            None
        };
        let tls_cert = if ident.has_tls_cert() {
            Some(PemSummary::new(&ident.certs.tls)?)
        } else {
            None
        };
        let tls_cas = ident
            .ca_certs
            .tls
            .iter()
            .map(|ca| PemSummary::new(ca))
            .collect::<Result<Vec<_>>>()?;

        Ok(Summary {
            private_key,
            ssh_cert,
            tls_cert,
            ssh_cas: ident.ca_certs.ssh.len(),
            tls_cas,
        })
    }
}

impl SshCertSummary {
    fn new(line: &[u8]) -> Result<Self> {
        let line = std::str::from_utf8(line)
            .map_err(|e| Error::InvalidInput(format!("SSH certificate is not UTF-8: {e}")))?;
        let cert = Certificate::from_openssh(line.trim())?;
        Ok(SshCertSummary {
            algorithm: cert.algorithm().to_string(),
            cert_type: format!("{:?}", cert.cert_type()).to_lowercase(),
            key_id: cert.key_id().to_string(),
            principals: cert.valid_principals().to_vec(),
            valid_after: cert.valid_after(),
            valid_before: cert.valid_before(),
            fingerprint: cert.public_key().fingerprint(HashAlg::Sha256).to_string(),
        })
    }
}

impl PemSummary {
    fn new(data: &[u8]) -> Result<Self> {
        let blocks = pem::parse_many(data)?;
        let block = blocks
            .first()
            .ok_or_else(|| Error::InvalidInput("entry contains no PEM block".to_string()))?;
        Ok(PemSummary {
            label: block.label().to_string(),
            sha256_fingerprint: sha256_fingerprint(&block.to_der()?),
        })
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Identity File:")?;
        match &self.private_key {
            Some(label) => writeln!(f, "    Private Key: {}", label)?,
            None => writeln!(f, "    Private Key: (none)")?,
        }
        match &self.ssh_cert {
            Some(cert) => {
                writeln!(f, "    SSH Certificate:")?;
                writeln!(f, "        Algorithm: {}", cert.algorithm)?;
                writeln!(f, "        Type: {}", cert.cert_type)?;
                writeln!(f, "        Key ID: {}", cert.key_id)?;
                writeln!(f, "        Principals: {}", cert.principals.join(", "))?;
                writeln!(
                    f,
                    "        Validity: {} - {}",
                    cert.valid_after, cert.valid_before
                )?;
                writeln!(f, "        Public Key: {}", cert.fingerprint)?;
            }
            None => writeln!(f, "    SSH Certificate: (none)")?,
        }
        match &self.tls_cert {
            Some(cert) => {
                writeln!(f, "    TLS Certificate:")?;
                writeln!(f, "        Label: {}", cert.label)?;
                writeln!(f, "        SHA256 Fingerprint: {}", cert.sha256_fingerprint)?;
            }
            None => writeln!(f, "    TLS Certificate: (none)")?,
        }
        writeln!(f, "    SSH CAs: {}", self.ssh_cas)?;
        writeln!(f, "    TLS CAs: {}", self.tls_cas.len())?;
        for (i, ca) in self.tls_cas.iter().enumerate() {
            writeln!(f, "        [{}] SHA256 Fingerprint: {}", i, ca.sha256_fingerprint)?;
        }
        Ok(())
    }
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let ident = read_identity(config.file.as_deref())?;
    let summary = Summary::new(&ident)?;

    match config.output {
        OutputFormat::Text => print!("{}", summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Yaml => println!("{}", serde_yml::to_string(&summary)?),
    }

    Ok(())
}

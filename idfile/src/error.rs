use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors produced while reading, writing or using an identity file.
///
/// None of these are retried internally.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying reader failed (including caller-side cancellation)
    #[error("failed to read identity file{}: {source}", at(.path))]
    ReadFault {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },

    /// The underlying writer failed
    #[error("failed to write identity file{}: {source}", at(.path))]
    WriteFault {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },

    /// Structural violation of the format, e.g. a PEM block without its END line
    #[error("malformed identity file{}: {reason}", at(.path))]
    MalformedInput {
        path: Option<PathBuf>,
        reason: String,
    },

    /// The SSH certificate is neither in the identity file nor in its sibling file
    #[error(
        "could not find SSH cert in the identity file {} or {}: {source}",
        .path.display(),
        .cert_path.display()
    )]
    CertificateNotFound {
        path: PathBuf,
        cert_path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A TLS CA entry could not be parsed or added to the root store
    #[error("invalid TLS CA cert (entry {index}): {reason}")]
    InvalidTrustAnchor { index: usize, reason: String },

    /// The private key and the certificate do not form a usable pair
    #[error("private key does not match certificate: {0}")]
    KeyCertMismatch(String),

    #[error("identity file has no private key")]
    MissingPrivateKey,

    #[error("PEM error: {0}")]
    Pem(#[from] pem::error::Error),

    #[error("SSH error: {0}")]
    Ssh(String),

    #[error("TLS error: {0}")]
    Tls(String),
}

fn at(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}

impl Error {
    pub(crate) fn read_fault(source: io::Error) -> Self {
        Error::ReadFault { path: None, source }
    }

    pub(crate) fn write_fault(source: io::Error) -> Self {
        Error::WriteFault { path: None, source }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            path: None,
            reason: reason.into(),
        }
    }

    /// Attaches the artifact path to stream-level errors that do not carry one yet.
    pub fn with_path(self, artifact: &Path) -> Self {
        match self {
            Error::ReadFault { path: None, source } => Error::ReadFault {
                path: Some(artifact.to_path_buf()),
                source,
            },
            Error::WriteFault { path: None, source } => Error::WriteFault {
                path: Some(artifact.to_path_buf()),
                source,
            },
            Error::MalformedInput { path: None, reason } => Error::MalformedInput {
                path: Some(artifact.to_path_buf()),
                reason,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

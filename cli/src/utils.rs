use std::fs;
use std::io::{self, Read};
use std::path::Path;

use idfile::IdentityFile;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::{Error, Result};

/// Read an identity file from a path or stdin
///
/// A file path goes through [`idfile::read_from_path`], including the
/// sibling `-cert.pub` lookup. When neither the file nor the sibling holds an
/// SSH certificate the file is decoded on its own (TLS-only bundles). Stdin
/// has no sibling.
pub(crate) fn read_identity(file: Option<&Path>) -> Result<IdentityFile> {
    match file {
        Some(path) => match idfile::read_from_path(path) {
            Ok(ident) => Ok(ident),
            Err(idfile::Error::CertificateNotFound { cert_path, .. }) => {
                warn!(
                    path = %cert_path.display(),
                    "no SSH certificate in identity file or sibling file"
                );
                let file = fs::File::open(path).map_err(Error::file(path))?;
                Ok(idfile::decode_identity_file(file).map_err(|e| e.with_path(path))?)
            }
            Err(e) => Err(e.into()),
        },
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Ok(idfile::decode_identity_file(buffer.as_slice())?)
        }
    }
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(Error::file(path))
}

/// SHA-256 digest as colon separated upper-case hex, the format `openssl x509 -fingerprint` prints
pub(crate) fn sha256_fingerprint(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}

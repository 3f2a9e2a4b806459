//! Reading and writing identity files on disk.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::decoder::decode_identity_file;
use crate::encoder::Encoder;
use crate::error::{Error, Result};
use crate::identity::IdentityFile;

/// Unix mode of written identity files: owner read/write only.
pub const IDENTITY_FILE_PERMISSIONS: u32 = 0o600;

/// Suffix appended to an identity file's path to find its SSH certificate
/// when the file itself does not contain one.
pub const SSH_CERT_FILE_EXTENSION: &str = "-cert.pub";

/// Options for [`write_to_path_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileOptions {
    /// Unix mode bits of the written file. Ignored on other platforms.
    pub permissions: u32,
}

impl Default for FileOptions {
    fn default() -> Self {
        FileOptions {
            permissions: IDENTITY_FILE_PERMISSIONS,
        }
    }
}

/// Path of the separate SSH certificate file for the identity file at `path`.
pub fn ssh_cert_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(SSH_CERT_FILE_EXTENSION);
    PathBuf::from(name)
}

/// Reads an identity file from the given path.
///
/// If the file has no SSH certificate, the sibling file returned by
/// [`ssh_cert_path`] is read and its contents used verbatim.
///
/// # Errors
///
/// Decoding errors carry `path`. [`Error::CertificateNotFound`] is returned
/// when the sibling file cannot be read.
pub fn read_from_path(path: impl AsRef<Path>) -> Result<IdentityFile> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::ReadFault {
        path: Some(path.to_path_buf()),
        source,
    })?;
    let mut ident = decode_identity_file(file).map_err(|e| e.with_path(path))?;

    if !ident.has_ssh_cert() {
        let cert_path = ssh_cert_path(path);
        debug!(path = %cert_path.display(), "SSH cert not in identity file, trying sibling file");
        ident.certs.ssh = fs::read(&cert_path).map_err(|source| Error::CertificateNotFound {
            path: path.to_path_buf(),
            cert_path,
            source,
        })?;
    }

    Ok(ident)
}

/// Writes `ident` to `path` with [`IDENTITY_FILE_PERMISSIONS`].
pub fn write_to_path(ident: &IdentityFile, path: impl AsRef<Path>) -> Result<()> {
    write_to_path_with(ident, path, &FileOptions::default())
}

/// Writes `ident` to `path`.
///
/// The content is encoded in memory, written to a temporary file in the
/// target directory whose mode is set before any byte is written, then
/// renamed over `path`. A failed write leaves any existing file untouched.
pub fn write_to_path_with(
    ident: &IdentityFile,
    path: impl AsRef<Path>,
    options: &FileOptions,
) -> Result<()> {
    let path = path.as_ref();
    let write_fault = |source: std::io::Error| Error::WriteFault {
        path: Some(path.to_path_buf()),
        source,
    };

    let encoded: Vec<u8> = ident.encode()?;

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_fault)?;
    set_permissions(tmp.as_file(), options.permissions).map_err(write_fault)?;
    tmp.write_all(&encoded).map_err(write_fault)?;
    tmp.as_file().sync_all().map_err(write_fault)?;
    tmp.persist(path).map_err(|e| write_fault(e.error))?;

    debug!(path = %path.display(), bytes = encoded.len(), "wrote identity file");
    Ok(())
}

/// Sets the Unix mode bits of an open file. A no-op on other platforms.
#[cfg(unix)]
pub fn set_permissions(file: &File, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
pub fn set_permissions(_file: &File, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use clap::Args;
use idfile::IDENTITY_FILE_PERMISSIONS;
use idfile::encoder::write_with_newline;
use idfile::fs::set_permissions;
use tracing::debug;

use crate::error::{Error, Result};
use crate::utils::read_identity;

pub(crate) const KEY_FILE: &str = "key";
pub(crate) const SSH_CERT_FILE: &str = "key-cert.pub";
pub(crate) const TLS_CERT_FILE: &str = "tls.crt";
pub(crate) const SSH_CA_FILE: &str = "ssh_ca.txt";
pub(crate) const TLS_CA_FILE: &str = "tls_ca.crt";

const PUBLIC_FILE_PERMISSIONS: u32 = 0o644;

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the identity file. If not specified, reads from stdin
    file: Option<PathBuf>,

    /// Output directory, created if missing
    #[arg(short, long)]
    dir: PathBuf,
}

/// Writes `entries` to `path`, each newline terminated.
fn write_component(path: &Path, entries: &[&[u8]], mode: u32) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(Error::file(path))?;
    // an existing file keeps its old mode on open
    set_permissions(&file, mode).map_err(Error::file(path))?;
    for entry in entries {
        write_with_newline(&mut file, entry).map_err(|e| e.with_path(path))?;
    }
    debug!(path = %path.display(), "wrote component");
    Ok(())
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let ident = read_identity(config.file.as_deref())?;
    fs::create_dir_all(&config.dir).map_err(Error::file(&config.dir))?;

    let ssh_cas: Vec<&[u8]> = ident.ca_certs.ssh.iter().map(Vec::as_slice).collect();
    let tls_cas: Vec<&[u8]> = ident.ca_certs.tls.iter().map(Vec::as_slice).collect();
    let components: [(&str, &[&[u8]], u32); 5] = [
        (KEY_FILE, &[ident.private_key.as_slice()], IDENTITY_FILE_PERMISSIONS),
        (SSH_CERT_FILE, &[ident.certs.ssh.as_slice()], PUBLIC_FILE_PERMISSIONS),
        (TLS_CERT_FILE, &[ident.certs.tls.as_slice()], PUBLIC_FILE_PERMISSIONS),
        (SSH_CA_FILE, &ssh_cas, PUBLIC_FILE_PERMISSIONS),
        (TLS_CA_FILE, &tls_cas, PUBLIC_FILE_PERMISSIONS),
    ];
    for (name, entries, mode) in components {
        if entries.iter().all(|entry| entry.is_empty()) {
            continue;
        }
        let path = config.dir.join(name);
        write_component(&path, entries, mode)?;
        println!("{}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_component_terminates_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SSH_CA_FILE);
        let entries: [&[u8]; 2] = [b"@cert-authority a", b"@cert-authority b\n"];
        write_component(&path, &entries, PUBLIC_FILE_PERMISSIONS).unwrap();
        assert_eq!(
            fs::read(&path).unwrap(),
            b"@cert-authority a\n@cert-authority b\n".to_vec()
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_write_component_narrows_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(KEY_FILE);
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_component(&path, &[b"secret".as_slice()], IDENTITY_FILE_PERMISSIONS).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert_eq!(fs::read(&path).unwrap(), b"secret\n".to_vec());
    }
}

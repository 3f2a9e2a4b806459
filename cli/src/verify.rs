use std::path::PathBuf;

use clap::Args;
use idfile::IdentityFile;
use tracing::debug;

use crate::error::{Error, Result};
use crate::utils::read_identity;

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the identity file
    file: PathBuf,

    /// Check the TLS client configuration
    #[arg(long)]
    tls: bool,

    /// Check the SSH client configuration
    #[arg(long)]
    ssh: bool,
}

impl Config {
    /// Without flags both configurations are checked.
    fn checks(&self) -> (bool, bool) {
        if !self.tls && !self.ssh {
            (true, true)
        } else {
            (self.tls, self.ssh)
        }
    }
}

type Check = fn(&IdentityFile) -> idfile::Result<String>;

fn verify_tls(ident: &IdentityFile) -> idfile::Result<String> {
    ident.tls_config()?;
    Ok(format!("ok ({} trusted CAs)", ident.ca_certs.tls.len()))
}

fn verify_ssh(ident: &IdentityFile) -> idfile::Result<String> {
    let config = ident.ssh_client_config()?;
    Ok(format!(
        "ok (user {}, {} host CAs)",
        config.user(),
        config.cert_authorities().len()
    ))
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let ident = read_identity(Some(&config.file))?;
    let (tls, ssh) = config.checks();

    let mut failed = Vec::new();
    let checks: [(&str, bool, Check); 2] = [("TLS", tls, verify_tls), ("SSH", ssh, verify_ssh)];
    for (name, enabled, check) in checks {
        if !enabled {
            continue;
        }
        debug!(check = name, "verifying identity file");
        match check(&ident) {
            Ok(status) => println!("{}: {}", name, status),
            Err(e) => {
                println!("{}: FAILED: {}", name, e);
                failed.push(name);
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(Error::VerificationFailed(failed.join(", ")))
    }
}

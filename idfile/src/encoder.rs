//! Identity file encoding.
//!
//! Components are written in the order the decoder expects them: private
//! key, SSH certificate, TLS certificate, SSH CAs, TLS CAs. Each non-empty
//! component ends with exactly one newline.

use std::io::Write;

use crate::error::{Error, Result};
use crate::identity::IdentityFile;

/// Encoder trait for converting from type `T` to type `E`.
///
/// The mirror image of [`crate::decoder::Decoder`].
pub trait Encoder<T, E: EncodableTo<T>> {
    type Error;

    fn encode(&self) -> std::result::Result<E, Self::Error>;
}

/// Marker trait indicating that type `E` can be encoded from type `T`.
pub trait EncodableTo<T> {}

impl EncodableTo<IdentityFile> for Vec<u8> {}

impl Encoder<IdentityFile, Vec<u8>> for IdentityFile {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        encode_identity_file(&mut buf, self)?;
        Ok(buf)
    }
}

/// Combines the components of an identity file into its file format.
///
/// # Errors
///
/// [`Error::WriteFault`] if `writer` fails; whatever was written before the
/// fault must be discarded by the caller.
pub fn encode_identity_file<W: Write>(mut writer: W, ident: &IdentityFile) -> Result<()> {
    write_with_newline(&mut writer, &ident.private_key)?;
    write_with_newline(&mut writer, &ident.certs.ssh)?;
    write_with_newline(&mut writer, &ident.certs.tls)?;
    for ca in &ident.ca_certs.ssh {
        write_with_newline(&mut writer, ca)?;
    }
    for ca in &ident.ca_certs.tls {
        write_with_newline(&mut writer, ca)?;
    }
    writer.flush().map_err(Error::write_fault)
}

/// Writes `data` followed by `\n` unless it already ends with one.
/// Empty `data` writes nothing.
pub fn write_with_newline<W: Write>(writer: &mut W, data: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    writer.write_all(data).map_err(Error::write_fault)?;
    if !data.ends_with(b"\n") {
        writer.write_all(b"\n").map_err(Error::write_fault)?;
    }
    Ok(())
}

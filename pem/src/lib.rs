//! Minimal RFC 7468 reader used to turn PEM text found in identity files
//! into labelled DER.
//!
//! The identity file decoder never looks inside PEM blocks. This crate is
//! only consulted afterwards, when a block has to be handed to a TLS or SSH
//! stack that wants DER plus a key type.

pub mod error;

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
    sync::LazyLock,
};

use base64::{Engine, engine::general_purpose::STANDARD};
use error::Error;
use regex::Regex;

const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";
const ENCRYPTED_PRIVATE_KEY_LABEL: &str = "ENCRYPTED PRIVATE KEY";
const RSA_PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";
const EC_PRIVATE_KEY_LABEL: &str = "EC PRIVATE KEY";
const OPENSSH_PRIVATE_KEY_LABEL: &str = "OPENSSH PRIVATE KEY";
const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";
const RSA_PUBLIC_KEY_LABEL: &str = "RSA PUBLIC KEY";
const CERTIFICATE_LABEL: &str = "CERTIFICATE";

static BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-----(BEGIN|END) ([A-Z0-9 ]+)-----$").expect("boundary regex is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    /// PKCS#8 private key (non-encrypted)
    PrivateKey,
    /// PKCS#8 encrypted private key
    EncryptedPrivateKey,
    /// PKCS#1 RSA private key
    RSAPrivateKey,
    /// SEC1 EC private key
    ECPrivateKey,
    /// openssh-key-v1 private key
    OpenSSHPrivateKey,
    /// X.509 SubjectPublicKeyInfo
    PublicKey,
    /// PKCS#1 RSA public key
    RSAPublicKey,
    /// X.509 Certificate
    Certificate,
    Other(String),
}

impl Label {
    /// Returns true for every label that carries private key material.
    pub fn is_private_key(&self) -> bool {
        matches!(
            self,
            Label::PrivateKey
                | Label::EncryptedPrivateKey
                | Label::RSAPrivateKey
                | Label::ECPrivateKey
                | Label::OpenSSHPrivateKey
        )
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::PrivateKey => write!(f, "{}", PRIVATE_KEY_LABEL),
            Label::EncryptedPrivateKey => write!(f, "{}", ENCRYPTED_PRIVATE_KEY_LABEL),
            Label::RSAPrivateKey => write!(f, "{}", RSA_PRIVATE_KEY_LABEL),
            Label::ECPrivateKey => write!(f, "{}", EC_PRIVATE_KEY_LABEL),
            Label::OpenSSHPrivateKey => write!(f, "{}", OPENSSH_PRIVATE_KEY_LABEL),
            Label::PublicKey => write!(f, "{}", PUBLIC_KEY_LABEL),
            Label::RSAPublicKey => write!(f, "{}", RSA_PUBLIC_KEY_LABEL),
            Label::Certificate => write!(f, "{}", CERTIFICATE_LABEL),
            Label::Other(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            PRIVATE_KEY_LABEL => Label::PrivateKey,
            ENCRYPTED_PRIVATE_KEY_LABEL => Label::EncryptedPrivateKey,
            RSA_PRIVATE_KEY_LABEL => Label::RSAPrivateKey,
            EC_PRIVATE_KEY_LABEL => Label::ECPrivateKey,
            OPENSSH_PRIVATE_KEY_LABEL => Label::OpenSSHPrivateKey,
            PUBLIC_KEY_LABEL => Label::PublicKey,
            RSA_PUBLIC_KEY_LABEL => Label::RSAPublicKey,
            CERTIFICATE_LABEL => Label::Certificate,
            "" => return Err(Error::InvalidEncapsulationBoundary(s.to_string())),
            other => Label::Other(other.to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Begin,
    End,
}

fn boundary(line: &str) -> Result<Option<(Boundary, Label)>, Error> {
    if !line.starts_with("-----") {
        return Ok(None);
    }
    let captured = BOUNDARY
        .captures(line)
        .ok_or_else(|| Error::InvalidEncapsulationBoundary(line.to_string()))?;
    let kind = match &captured[1] {
        "BEGIN" => Boundary::Begin,
        _ => Boundary::End,
    };
    Ok(Some((kind, Label::from_str(&captured[2])?)))
}

/*
ref: https://www.rfc-editor.org/rfc/rfc7468.html#section-3
*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pem {
    label: Label,
    base64_data: String,
}

impl Pem {
    pub fn new(label: Label, base64_data: String) -> Self {
        Pem { label, base64_data }
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn data(&self) -> &str {
        &self.base64_data
    }

    /// Base64-decodes the body. The label is discarded.
    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        STANDARD.decode(&self.base64_data).map_err(Error::Base64Decode)
    }
}

/// Parse every PEM block in `input`.
///
/// Text outside blocks is ignored, as are RFC 1421 style headers
/// (`Proc-Type: ...`) inside a block. Fails if no block is present.
///
/// # Example
/// ```
/// use pem::parse_many;
///
/// let pem_data = b"-----BEGIN CERTIFICATE-----\nAAA=\n-----END CERTIFICATE-----\n-----BEGIN CERTIFICATE-----\nBBB=\n-----END CERTIFICATE-----";
/// let pems = parse_many(pem_data).unwrap();
/// assert_eq!(pems.len(), 2);
/// ```
pub fn parse_many(input: &[u8]) -> Result<Vec<Pem>, Error> {
    let text = String::from_utf8_lossy(input);

    let mut pems = Vec::new();
    let mut current: Option<(Label, String)> = None;

    for line in text.lines().map(str::trim) {
        match (boundary(line)?, current.take()) {
            (Some((Boundary::Begin, label)), None) => current = Some((label, String::new())),
            (Some((Boundary::Begin, _)), Some((open, _))) => {
                return Err(Error::MissingPostEncapsulationBoundary(open.to_string()));
            }
            (Some((Boundary::End, label)), Some((open, data))) => {
                if label != open {
                    return Err(Error::LabelMissMatch {
                        begin: open.to_string(),
                        end: label.to_string(),
                    });
                }
                if data.is_empty() {
                    return Err(Error::MissingData(open.to_string()));
                }
                pems.push(Pem::new(open, data));
            }
            (Some((Boundary::End, _)), None) => return Err(Error::MissingPreEncapsulationBoundary),
            (None, Some((label, mut data))) => {
                if !line.is_empty() && !line.contains(':') {
                    data.push_str(line);
                }
                current = Some((label, data));
            }
            // explanatory text outside of a block
            (None, None) => {}
        }
    }

    if let Some((label, _)) = current {
        return Err(Error::MissingPostEncapsulationBoundary(label.to_string()));
    }
    if pems.is_empty() {
        return Err(Error::MissingPreEncapsulationBoundary);
    }

    Ok(pems)
}

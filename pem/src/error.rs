use base64::DecodeError;
use thiserror::Error;

/// Errors that can occur when extracting PEM blocks from a buffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// No `-----BEGIN ...-----` line was found in the input
    #[error("missing a pre encapsulation boundary")]
    MissingPreEncapsulationBoundary,

    /// A block was opened but never closed
    #[error("missing a post encapsulation boundary for {0}")]
    MissingPostEncapsulationBoundary(String),

    /// The BEGIN and END labels do not match (e.g., BEGIN CERTIFICATE, END PRIVATE KEY)
    #[error("label doesn't match: BEGIN {begin}, END {end}")]
    LabelMissMatch { begin: String, end: String },

    /// Malformed boundary marker
    #[error("invalid encapsulation boundary: {0}")]
    InvalidEncapsulationBoundary(String),

    /// No data found between boundary markers
    #[error("missing PEM data for {0}")]
    MissingData(String),

    /// Failed to decode base64 data
    #[error("base64 decode: {0}")]
    Base64Decode(DecodeError),
}

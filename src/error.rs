//! Error types for the docsign library.

use thiserror::Error;

/// The main error type for docsign operations.
#[derive(Error, Debug)]
pub enum SignError {
    /// Key generation could not complete (e.g. no usable randomness).
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// The private key is malformed or the algorithm/digest pairing is unsupported.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// The signature bytes are structurally malformed for the algorithm.
    ///
    /// A well-formed signature that simply does not match is not an error;
    /// verification reports it as `false`.
    #[error("Verification failed: {0}")]
    Verification(String),

    /// Input that should be hexadecimal is not.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// An operation was attempted out of order or with missing input.
    #[error("{0}")]
    Precondition(String),

    /// Invalid key format, length or family.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Error reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error with base64 encoding/decoding in key files.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Result type alias for docsign operations.
pub type Result<T> = std::result::Result<T, SignError>;

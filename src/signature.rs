//! Signature bytes and their hex persistence format.

use crate::encoding::{decode_hex, encode_hex};
use crate::error::Result;
use std::fs;
use std::path::Path;

/// Signature bytes produced over a digest.
///
/// The encoding depends on the key family: 64 raw bytes for Ed25519, and
/// `r || s` for DSA with each scalar left-padded to the subgroup order width
/// (40 bytes for DSA-1024/160).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Get the raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode the signature as an uppercase hex string.
    pub fn to_hex(&self) -> String {
        encode_hex(&self.0)
    }

    /// Decode a signature from a hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self(decode_hex(s)?))
    }

    /// Write the signature to a file as a single uppercase hex string.
    pub fn save_hex<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_hex())?;
        Ok(())
    }

    /// Load a signature written by [`Signature::save_hex`].
    ///
    /// Surrounding whitespace, including a trailing newline, is ignored.
    pub fn load_hex<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_hex(content.trim())
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

//! Algorithm and key-strength configuration.
//!
//! The default profile is SHA-256 digests with Ed25519 signatures. The legacy
//! profile reproduces the historical SHA-1 / DSA-1024 parameters so existing
//! signatures can still be checked.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Hash function used to compute document digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DigestAlgorithm {
    /// 160-bit SHA-1. Legacy only.
    Sha1,
    /// 256-bit SHA-256.
    #[default]
    Sha256,
    /// 256-bit BLAKE3.
    Blake3,
}

impl DigestAlgorithm {
    /// Length of the digest output in bytes.
    pub const fn output_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 | DigestAlgorithm::Blake3 => 32,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "sha1",
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Asymmetric signature family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureAlgorithm {
    #[default]
    Ed25519,
    Dsa,
}

impl SignatureAlgorithm {
    pub const fn name(self) -> &'static str {
        match self {
            SignatureAlgorithm::Ed25519 => "ed25519",
            SignatureAlgorithm::Dsa => "dsa",
        }
    }

    /// Parse the tag written into key files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ed25519" => Some(SignatureAlgorithm::Ed25519),
            "dsa" => Some(SignatureAlgorithm::Dsa),
            _ => None,
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// DSA domain parameter sizes as (L, N): modulus bits and subgroup order bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DsaKeySize {
    /// 1024-bit modulus with a 160-bit subgroup. Legacy only.
    #[serde(rename = "1024-160")]
    Dsa1024_160,
    #[serde(rename = "2048-224")]
    Dsa2048_224,
    #[default]
    #[serde(rename = "2048-256")]
    Dsa2048_256,
    #[serde(rename = "3072-256")]
    Dsa3072_256,
}

impl DsaKeySize {
    /// Modulus length `L` in bits.
    pub const fn modulus_bits(self) -> usize {
        match self {
            DsaKeySize::Dsa1024_160 => 1024,
            DsaKeySize::Dsa2048_224 | DsaKeySize::Dsa2048_256 => 2048,
            DsaKeySize::Dsa3072_256 => 3072,
        }
    }

    /// Subgroup order length `N` in bits.
    pub const fn order_bits(self) -> usize {
        match self {
            DsaKeySize::Dsa1024_160 => 160,
            DsaKeySize::Dsa2048_224 => 224,
            DsaKeySize::Dsa2048_256 | DsaKeySize::Dsa3072_256 => 256,
        }
    }

    #[allow(deprecated)]
    pub(crate) fn to_dsa(self) -> dsa::KeySize {
        match self {
            DsaKeySize::Dsa1024_160 => dsa::KeySize::DSA_1024_160,
            DsaKeySize::Dsa2048_224 => dsa::KeySize::DSA_2048_224,
            DsaKeySize::Dsa2048_256 => dsa::KeySize::DSA_2048_256,
            DsaKeySize::Dsa3072_256 => dsa::KeySize::DSA_3072_256,
        }
    }
}

impl fmt::Display for DsaKeySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.modulus_bits(), self.order_bits())
    }
}

/// Algorithm selection for key generation, hashing and signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Hash applied to the document text.
    pub digest: DigestAlgorithm,
    /// Signature family for new key pairs and for signing.
    pub algorithm: SignatureAlgorithm,
    /// Domain parameter size for DSA key generation.
    pub dsa_key_size: DsaKeySize,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            digest: DigestAlgorithm::Sha256,
            algorithm: SignatureAlgorithm::Ed25519,
            dsa_key_size: DsaKeySize::Dsa2048_256,
        }
    }
}

impl SigningConfig {
    /// SHA-1 digests signed with DSA-1024/160.
    pub fn legacy() -> Self {
        Self {
            digest: DigestAlgorithm::Sha1,
            algorithm: SignatureAlgorithm::Dsa,
            dsa_key_size: DsaKeySize::Dsa1024_160,
        }
    }

    pub fn with_digest(mut self, digest: DigestAlgorithm) -> Self {
        self.digest = digest;
        self
    }

    pub fn with_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_dsa_key_size(mut self, size: DsaKeySize) -> Self {
        self.dsa_key_size = size;
        self
    }

    /// Parse a configuration from TOML. Missing keys take their defaults.
    ///
    /// ```toml
    /// digest = "sha1"
    /// algorithm = "dsa"
    /// dsa_key_size = "1024-160"
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

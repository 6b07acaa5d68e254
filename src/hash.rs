//! Document digests over normalized text.

use crate::config::DigestAlgorithm;
use crate::encoding::{decode_hex, encode_hex};
use crate::error::{Result, SignError};
use sha2::Digest as _;

/// A fixed-length hash of document text, tagged with the algorithm that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: DigestAlgorithm,
    bytes: Vec<u8>,
}

impl Digest {
    /// Wrap raw digest bytes, checking the length against the algorithm.
    pub fn from_bytes(algorithm: DigestAlgorithm, bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() != algorithm.output_len() {
            return Err(SignError::InvalidFormat(format!(
                "Invalid {} digest length: expected {}, got {}",
                algorithm,
                algorithm.output_len(),
                bytes.len()
            )));
        }
        Ok(Self { algorithm, bytes })
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Get the raw bytes of the digest.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encode the digest as an uppercase hex string.
    pub fn to_hex(&self) -> String {
        encode_hex(&self.bytes)
    }

    /// Decode a digest from a hex string.
    pub fn from_hex(algorithm: DigestAlgorithm, s: &str) -> Result<Self> {
        Self::from_bytes(algorithm, decode_hex(s)?)
    }
}

/// Trim surrounding whitespace the way the text extractor hands text over.
pub fn normalize_text(text: &str) -> &str {
    text.trim()
}

/// Hash a byte slice with the given algorithm.
pub fn hash_bytes(data: &[u8], algorithm: DigestAlgorithm) -> Digest {
    let bytes = match algorithm {
        DigestAlgorithm::Sha1 => sha1::Sha1::digest(data).to_vec(),
        DigestAlgorithm::Sha256 => sha2::Sha256::digest(data).to_vec(),
        DigestAlgorithm::Blake3 => blake3::hash(data).as_bytes().to_vec(),
    };
    Digest { algorithm, bytes }
}

/// Hash the UTF-8 bytes of already-normalized document text.
pub fn compute_digest(text: &str, algorithm: DigestAlgorithm) -> Digest {
    hash_bytes(text.as_bytes(), algorithm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_deterministic() {
        let text = "Hello, World!";
        let digest = compute_digest(text, DigestAlgorithm::Sha256);

        // Verify digest is consistent
        let digest2 = compute_digest(text, DigestAlgorithm::Sha256);
        assert_eq!(digest, digest2);

        // Different text should produce different digest
        let digest3 = compute_digest("Different text", DigestAlgorithm::Sha256);
        assert_ne!(digest, digest3);
    }

    #[test]
    fn test_sha1_known_vectors() {
        assert_eq!(
            compute_digest("", DigestAlgorithm::Sha1).to_hex(),
            "DA39A3EE5E6B4B0D3255BFEF95601890AFD80709"
        );
        assert_eq!(
            compute_digest("Hello world", DigestAlgorithm::Sha1).to_hex(),
            "7B502C3A1F48C8609AE212CDFB639DEE39673F5E"
        );
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            compute_digest("hello", DigestAlgorithm::Sha256).to_hex(),
            "2CF24DBA5FB0A30E26E83B2AC5B9E29E1B161E5C1FA7425E73043362938B9824"
        );
    }

    #[test]
    fn test_output_lengths() {
        for alg in [
            DigestAlgorithm::Sha1,
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Blake3,
        ] {
            let digest = compute_digest("Test", alg);
            assert_eq!(digest.as_bytes().len(), alg.output_len());
            assert_eq!(digest.to_hex().len(), alg.output_len() * 2);
        }
    }

    #[test]
    fn test_algorithms_disagree() {
        let sha = compute_digest("Test", DigestAlgorithm::Sha256);
        let blake = compute_digest("Test", DigestAlgorithm::Blake3);
        assert_ne!(sha, blake);
    }

    #[test]
    fn test_hex_roundtrip() {
        let digest = compute_digest("Test data for hashing", DigestAlgorithm::Blake3);
        let restored = Digest::from_hex(DigestAlgorithm::Blake3, &digest.to_hex()).unwrap();
        assert_eq!(digest, restored);
    }

    #[test]
    fn test_from_hex_wrong_length() {
        let result = Digest::from_hex(DigestAlgorithm::Sha1, "ABCD");
        assert!(matches!(result, Err(SignError::InvalidFormat(_))));
    }

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize_text("  Hello world\r\n"), "Hello world");
        assert_eq!(
            compute_digest(normalize_text("\tHello world "), DigestAlgorithm::Sha1),
            compute_digest("Hello world", DigestAlgorithm::Sha1)
        );
    }
}

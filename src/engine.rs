//! Digest signing and verification.

use crate::config::{DigestAlgorithm, SigningConfig};
use crate::error::{Result, SignError};
use crate::hash::{compute_digest, Digest};
use crate::keys::{KeyPair, PublicKey};
use crate::signature::Signature;

/// Signs and verifies document digests under a fixed configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureEngine {
    config: SigningConfig,
}

impl SignatureEngine {
    pub fn new(config: SigningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SigningConfig {
        &self.config
    }

    pub fn digest_algorithm(&self) -> DigestAlgorithm {
        self.config.digest
    }

    /// Hash already-normalized document text with the configured algorithm.
    pub fn compute_digest(&self, text: &str) -> Digest {
        compute_digest(text, self.config.digest)
    }

    /// Sign a digest with the private half of `keypair`.
    ///
    /// DSA keys refuse digests narrower than their subgroup order, e.g. SHA-1
    /// under DSA-2048/256.
    pub fn sign(&self, digest: &Digest, keypair: &KeyPair) -> Result<Signature> {
        if let Some(order_bits) = keypair.dsa_order_bits() {
            check_dsa_pairing(digest, order_bits)?;
        }

        let bytes = keypair.sign_prehash(digest.as_bytes())?;
        tracing::debug!(
            algorithm = %keypair.algorithm(),
            digest_algorithm = %digest.algorithm(),
            digest = %digest.to_hex(),
            signature_len = bytes.len(),
            "signed digest"
        );
        Ok(Signature::from_bytes(bytes))
    }

    /// Check `signature` over `digest` against `public_key`.
    ///
    /// Returns `Ok(false)` when the signature does not match. Errors only on
    /// signatures that are structurally malformed for the key's algorithm.
    pub fn verify(
        &self,
        digest: &Digest,
        signature: &Signature,
        public_key: &PublicKey,
    ) -> Result<bool> {
        let valid = public_key.verify_prehash(digest.as_bytes(), signature.as_bytes())?;
        tracing::debug!(
            algorithm = %public_key.algorithm(),
            digest = %digest.to_hex(),
            valid,
            "verified signature"
        );
        Ok(valid)
    }
}

fn check_dsa_pairing(digest: &Digest, order_bits: usize) -> Result<()> {
    let digest_bits = digest.as_bytes().len() * 8;
    if digest_bits < order_bits {
        return Err(SignError::Signing(format!(
            "{}-bit {} digest is too short for a DSA key with a {}-bit subgroup",
            digest_bits,
            digest.algorithm(),
            order_bits
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let engine = SignatureEngine::default();
        let keypair = KeyPair::generate().unwrap();

        let digest = engine.compute_digest("Test document content");
        let signature = engine.sign(&digest, &keypair).unwrap();

        assert!(engine.verify(&digest, &signature, &keypair.public_key()).unwrap());
    }

    #[test]
    fn test_different_text_is_false() {
        let engine = SignatureEngine::default();
        let keypair = KeyPair::generate().unwrap();

        let signature = engine
            .sign(&engine.compute_digest("Original content"), &keypair)
            .unwrap();
        let tampered = engine.compute_digest("Tampered content");

        assert!(!engine.verify(&tampered, &signature, &keypair.public_key()).unwrap());
    }

    #[test]
    fn test_cross_key_rejected() {
        let engine = SignatureEngine::default();
        let alice = KeyPair::generate().unwrap();
        let bob = KeyPair::generate().unwrap();

        let digest = engine.compute_digest("Contract");
        let signature = engine.sign(&digest, &alice).unwrap();

        assert!(!engine.verify(&digest, &signature, &bob.public_key()).unwrap());
    }

    #[test]
    fn test_malformed_signature_is_error() {
        let engine = SignatureEngine::default();
        let keypair = KeyPair::generate().unwrap();
        let digest = engine.compute_digest("Test");

        let short = Signature::from_bytes(vec![0u8; 63]);
        let result = engine.verify(&digest, &short, &keypair.public_key());
        assert!(matches!(result, Err(SignError::Verification(_))));
    }

    #[test]
    fn test_ed25519_signatures_are_deterministic() {
        let config = SigningConfig::default().with_digest(DigestAlgorithm::Sha1);
        let engine = SignatureEngine::new(config);
        let keypair = KeyPair::from_ed25519_bytes(&[9u8; 32]);
        let digest = engine.compute_digest("Hello world");

        let first = engine.sign(&digest, &keypair).unwrap();
        let second = engine.sign(&digest, &keypair).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_dsa_pairing_rule() {
        let sha1 = compute_digest("Hello world", DigestAlgorithm::Sha1);
        let sha256 = compute_digest("Hello world", DigestAlgorithm::Sha256);

        assert!(check_dsa_pairing(&sha1, 160).is_ok());
        assert!(check_dsa_pairing(&sha256, 160).is_ok());
        assert!(check_dsa_pairing(&sha256, 256).is_ok());
        assert!(matches!(
            check_dsa_pairing(&sha1, 256),
            Err(SignError::Signing(_))
        ));
    }
}

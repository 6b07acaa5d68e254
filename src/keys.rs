//! Key generation and management for Ed25519 and DSA signing.

use crate::config::{DsaKeySize, SignatureAlgorithm, SigningConfig};
use crate::error::{Result, SignError};
use base64::Engine;
use ed25519_dalek::{Signer as DalekSigner, SigningKey, VerifyingKey};
use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use signature::hazmat::{PrehashSigner, PrehashVerifier};
use std::fmt;
use std::fs;
use std::path::Path;

const PRIVATE_KEY_HEADER: &str = "DOCSIGN PRIVATE KEY";
const PUBLIC_KEY_HEADER: &str = "DOCSIGN PUBLIC KEY";

/// Ed25519 signature length in bytes.
pub const ED25519_SIGNATURE_SIZE: usize = 64;

enum SecretKey {
    Ed25519(SigningKey),
    Dsa(dsa::SigningKey),
}

#[derive(Clone)]
enum VerifyKey {
    Ed25519(VerifyingKey),
    Dsa(dsa::VerifyingKey),
}

/// A private/public key pair for signing documents.
///
/// Both halves always belong to the same algorithm family and strength.
pub struct KeyPair {
    secret: SecretKey,
}

/// Produces fresh key pairs for the configured algorithm and strength.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyPairProvider {
    config: SigningConfig,
}

impl KeyPairProvider {
    pub fn new(config: SigningConfig) -> Self {
        Self { config }
    }

    /// Generate a new random key pair.
    ///
    /// Fails with [`SignError::KeyGeneration`] only when the operating system
    /// randomness source cannot be read.
    pub fn generate_key_pair(&self) -> Result<KeyPair> {
        let mut rng = seeded_rng()?;
        let keypair = match self.config.algorithm {
            SignatureAlgorithm::Ed25519 => KeyPair {
                secret: SecretKey::Ed25519(SigningKey::generate(&mut rng)),
            },
            SignatureAlgorithm::Dsa => KeyPair::generate_dsa(&mut rng, self.config.dsa_key_size),
        };
        tracing::debug!(algorithm = %keypair.algorithm(), "generated key pair");
        Ok(keypair)
    }
}

fn seeded_rng() -> Result<StdRng> {
    let mut seed = <StdRng as SeedableRng>::Seed::default();
    OsRng.try_fill_bytes(&mut seed).map_err(|e| {
        SignError::KeyGeneration(format!("randomness source unavailable: {e}"))
    })?;
    Ok(StdRng::from_seed(seed))
}

impl KeyPair {
    /// Generate a key pair with the default configuration.
    pub fn generate() -> Result<Self> {
        KeyPairProvider::default().generate_key_pair()
    }

    fn generate_dsa(rng: &mut StdRng, size: DsaKeySize) -> Self {
        let components = dsa::Components::generate(rng, size.to_dsa());
        let signing_key = dsa::SigningKey::generate(rng, components);
        Self {
            secret: SecretKey::Dsa(signing_key),
        }
    }

    /// Create an Ed25519 keypair from raw secret key bytes (32 bytes).
    pub fn from_ed25519_bytes(secret_bytes: &[u8; 32]) -> Self {
        Self {
            secret: SecretKey::Ed25519(SigningKey::from_bytes(secret_bytes)),
        }
    }

    /// Restore a key pair from its serialized secret.
    ///
    /// Ed25519 secrets are the raw 32-byte seed; DSA secrets are PKCS#8 DER.
    pub fn from_secret_bytes(algorithm: SignatureAlgorithm, bytes: &[u8]) -> Result<Self> {
        match algorithm {
            SignatureAlgorithm::Ed25519 => {
                let arr: [u8; 32] = bytes.try_into().map_err(|_| {
                    SignError::InvalidKey(format!(
                        "Invalid secret key length: expected 32, got {}",
                        bytes.len()
                    ))
                })?;
                Ok(Self::from_ed25519_bytes(&arr))
            }
            SignatureAlgorithm::Dsa => {
                let signing_key = dsa::SigningKey::from_pkcs8_der(bytes)
                    .map_err(|e| SignError::InvalidKey(format!("Invalid DSA private key: {e}")))?;
                Ok(Self {
                    secret: SecretKey::Dsa(signing_key),
                })
            }
        }
    }

    /// Serialize the secret half. Never log the result.
    pub fn secret_bytes(&self) -> Result<Vec<u8>> {
        match &self.secret {
            SecretKey::Ed25519(key) => Ok(key.to_bytes().to_vec()),
            SecretKey::Dsa(key) => key
                .to_pkcs8_der()
                .map(|doc| doc.as_bytes().to_vec())
                .map_err(|e| SignError::InvalidKey(format!("Cannot encode DSA private key: {e}"))),
        }
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self.secret {
            SecretKey::Ed25519(_) => SignatureAlgorithm::Ed25519,
            SecretKey::Dsa(_) => SignatureAlgorithm::Dsa,
        }
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        let inner = match &self.secret {
            SecretKey::Ed25519(key) => VerifyKey::Ed25519(key.verifying_key()),
            SecretKey::Dsa(key) => VerifyKey::Dsa(key.verifying_key().clone()),
        };
        PublicKey { inner }
    }

    /// Bit length of the DSA subgroup order, or `None` for Ed25519.
    pub(crate) fn dsa_order_bits(&self) -> Option<usize> {
        match &self.secret {
            SecretKey::Ed25519(_) => None,
            SecretKey::Dsa(key) => Some(key.verifying_key().components().q().bits() as usize),
        }
    }

    /// Sign a precomputed digest and return the encoded signature bytes.
    pub(crate) fn sign_prehash(&self, digest: &[u8]) -> Result<Vec<u8>> {
        match &self.secret {
            SecretKey::Ed25519(key) => Ok(key.sign(digest).to_bytes().to_vec()),
            SecretKey::Dsa(key) => {
                let sig: dsa::Signature = key
                    .sign_prehash(digest)
                    .map_err(|e| SignError::Signing(format!("DSA signing failed: {e}")))?;
                Ok(encode_dsa_signature(&sig, dsa_scalar_len(key.verifying_key())))
            }
        }
    }

    /// Save the keypair to a file.
    ///
    /// The file format is:
    /// - Line 1: "DOCSIGN PRIVATE KEY"
    /// - Line 2: algorithm tag (`ed25519` or `dsa`)
    /// - Line 3: Base64-encoded secret key
    /// - Line 4: Base64-encoded public key
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let engine = base64::engine::general_purpose::STANDARD;

        let secret_b64 = engine.encode(self.secret_bytes()?);
        let public_b64 = engine.encode(self.public_key().to_bytes()?);

        let content = format!(
            "{}\n{}\n{}\n{}\n",
            PRIVATE_KEY_HEADER,
            self.algorithm(),
            secret_b64,
            public_b64
        );

        fs::write(path, content)?;
        Ok(())
    }

    /// Load a keypair from a file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let engine = base64::engine::general_purpose::STANDARD;

        let content = fs::read_to_string(path)?;
        let lines: Vec<&str> = content.lines().collect();

        if lines.len() < 4 || lines[0] != PRIVATE_KEY_HEADER {
            return Err(SignError::InvalidKey("Invalid key file format".to_string()));
        }

        let algorithm = parse_algorithm(lines[1])?;
        let secret_bytes = engine.decode(lines[2])?;
        let keypair = Self::from_secret_bytes(algorithm, &secret_bytes)?;

        let stored_public = engine.decode(lines[3])?;
        if stored_public != keypair.public_key().to_bytes()? {
            return Err(SignError::InvalidKey(
                "Public key in key file does not match its secret key".to_string(),
            ));
        }
        Ok(keypair)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &self.algorithm())
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Byte width of one DSA signature scalar, `ceil(|q| / 8)`.
fn dsa_scalar_len(key: &dsa::VerifyingKey) -> usize {
    (key.components().q().bits() as usize).div_ceil(8)
}

/// DSA signatures are stored as `r || s`, each left-padded to the scalar
/// width (IEEE P1363), so DSA-1024/160 signatures are always 40 bytes.
fn encode_dsa_signature(sig: &dsa::Signature, scalar_len: usize) -> Vec<u8> {
    let mut out = vec![0u8; scalar_len * 2];
    for (half, scalar) in out.chunks_mut(scalar_len).zip([sig.r(), sig.s()]) {
        let bytes = scalar.to_bytes_be();
        half[scalar_len - bytes.len()..].copy_from_slice(&bytes);
    }
    out
}

fn decode_dsa_signature(bytes: &[u8], scalar_len: usize) -> Result<dsa::Signature> {
    if bytes.len() != scalar_len * 2 {
        return Err(SignError::Verification(format!(
            "Invalid DSA signature length: expected {}, got {}",
            scalar_len * 2,
            bytes.len()
        )));
    }
    let (r, s) = bytes.split_at(scalar_len);
    dsa::Signature::from_components(
        dsa::BigUint::from_bytes_be(r),
        dsa::BigUint::from_bytes_be(s),
    )
    .map_err(|_| SignError::Verification("DSA signature scalars out of range".to_string()))
}

fn parse_algorithm(tag: &str) -> Result<SignatureAlgorithm> {
    SignatureAlgorithm::from_name(tag.trim())
        .ok_or_else(|| SignError::InvalidKey(format!("Unknown key algorithm: {tag}")))
}

/// A public key for verifying signatures.
#[derive(Clone)]
pub struct PublicKey {
    inner: VerifyKey,
}

impl PublicKey {
    /// Create a public key from its serialized form.
    ///
    /// Ed25519 keys are 32 raw bytes; DSA keys are SPKI DER.
    pub fn from_bytes(algorithm: SignatureAlgorithm, bytes: &[u8]) -> Result<Self> {
        let inner = match algorithm {
            SignatureAlgorithm::Ed25519 => {
                let arr: [u8; 32] = bytes.try_into().map_err(|_| {
                    SignError::InvalidKey(format!(
                        "Invalid public key length: expected 32, got {}",
                        bytes.len()
                    ))
                })?;
                let key = VerifyingKey::from_bytes(&arr)
                    .map_err(|e| SignError::InvalidKey(e.to_string()))?;
                VerifyKey::Ed25519(key)
            }
            SignatureAlgorithm::Dsa => {
                let key = dsa::VerifyingKey::from_public_key_der(bytes)
                    .map_err(|e| SignError::InvalidKey(format!("Invalid DSA public key: {e}")))?;
                VerifyKey::Dsa(key)
            }
        };
        Ok(Self { inner })
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self.inner {
            VerifyKey::Ed25519(_) => SignatureAlgorithm::Ed25519,
            VerifyKey::Dsa(_) => SignatureAlgorithm::Dsa,
        }
    }

    /// Get the serialized public key.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match &self.inner {
            VerifyKey::Ed25519(key) => Ok(key.to_bytes().to_vec()),
            VerifyKey::Dsa(key) => key
                .to_public_key_der()
                .map(|doc| doc.as_bytes().to_vec())
                .map_err(|e| SignError::InvalidKey(format!("Cannot encode DSA public key: {e}"))),
        }
    }

    /// Encode the public key as base64.
    pub fn to_base64(&self) -> Result<String> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.to_bytes()?))
    }

    /// Decode a public key from base64.
    pub fn from_base64(algorithm: SignatureAlgorithm, s: &str) -> Result<Self> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(s)?;
        Self::from_bytes(algorithm, &bytes)
    }

    /// Check a signature over a precomputed digest.
    ///
    /// A well-formed signature that does not match yields `Ok(false)`;
    /// structurally malformed signature bytes yield [`SignError::Verification`].
    pub(crate) fn verify_prehash(&self, digest: &[u8], signature: &[u8]) -> Result<bool> {
        match &self.inner {
            VerifyKey::Ed25519(key) => {
                let arr: [u8; ED25519_SIGNATURE_SIZE] = signature.try_into().map_err(|_| {
                    SignError::Verification(format!(
                        "Invalid Ed25519 signature length: expected {}, got {}",
                        ED25519_SIGNATURE_SIZE,
                        signature.len()
                    ))
                })?;
                let sig = ed25519_dalek::Signature::from_bytes(&arr);
                Ok(key.verify_strict(digest, &sig).is_ok())
            }
            VerifyKey::Dsa(key) => {
                let sig = decode_dsa_signature(signature, dsa_scalar_len(key))?;
                Ok(key.verify_prehash(digest, &sig).is_ok())
            }
        }
    }

    /// Save the public key to a file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = format!(
            "{}\n{}\n{}\n",
            PUBLIC_KEY_HEADER,
            self.algorithm(),
            self.to_base64()?
        );

        fs::write(path, content)?;
        Ok(())
    }

    /// Load a public key from a file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let lines: Vec<&str> = content.lines().collect();

        if lines.len() < 3 || lines[0] != PUBLIC_KEY_HEADER {
            return Err(SignError::InvalidKey(
                "Invalid public key file format".to_string(),
            ));
        }

        let algorithm = parse_algorithm(lines[1])?;
        Self::from_base64(algorithm, lines[2])
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = self.to_base64().unwrap_or_else(|_| "<unencodable>".to_string());
        f.debug_struct("PublicKey")
            .field("algorithm", &self.algorithm())
            .field("key", &encoded)
            .finish()
    }
}

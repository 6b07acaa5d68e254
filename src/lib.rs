//! # docsign
//!
//! Sign text documents and detect tampering.
//!
//! ## Features
//!
//! - **Configurable digests**: SHA-256 (default), BLAKE3, or legacy SHA-1
//! - **Ed25519 or DSA signatures**, with DSA-1024/SHA-1 kept as a legacy profile
//! - **Uppercase hex** for displaying and storing digests and signatures
//! - **Sessions** that remember what was signed and report whether a
//!   candidate document is unchanged, modified, or carries an invalid signature
//!
//! ## Quick Start
//!
//! ### Generate a Keypair
//!
//! ```rust
//! use docsign::{KeyPairProvider, SigningConfig};
//!
//! let keypair = KeyPairProvider::new(SigningConfig::default())
//!     .generate_key_pair()
//!     .unwrap();
//! // Save to file (optional)
//! // keypair.save_to_file("my_key.pem").unwrap();
//! ```
//!
//! ### Sign and Verify a Digest
//!
//! ```rust
//! use docsign::{KeyPair, SignatureEngine};
//!
//! let keypair = KeyPair::generate().unwrap();
//! let engine = SignatureEngine::default();
//!
//! let digest = engine.compute_digest("Important document content");
//! let signature = engine.sign(&digest, &keypair).unwrap();
//!
//! assert!(engine.verify(&digest, &signature, &keypair.public_key()).unwrap());
//! println!("digest {} signature {}", digest.to_hex(), signature.to_hex());
//! ```
//!
//! ### Detect Tampering
//!
//! ```rust
//! use docsign::{KeyPair, SignatureEngine, SigningSession, VerifyOutcome};
//!
//! let mut session = SigningSession::new(KeyPair::generate().unwrap(), SignatureEngine::default());
//! let signed = session.sign("Hello world").unwrap();
//!
//! let outcome = session.verify("Hello world", &signed.signature_hex).unwrap();
//! assert_eq!(outcome, VerifyOutcome::ValidUnchanged);
//!
//! let outcome = session.verify("Hello World", &signed.signature_hex).unwrap();
//! assert_eq!(outcome, VerifyOutcome::SignatureInvalid);
//! ```

pub mod config;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod hash;
pub mod keys;
pub mod session;
pub mod signature;

// Re-export main types for convenience
pub use config::{DigestAlgorithm, DsaKeySize, SignatureAlgorithm, SigningConfig};
pub use encoding::{decode_hex, encode_hex};
pub use engine::SignatureEngine;
pub use error::{Result, SignError};
pub use hash::{compute_digest, hash_bytes, normalize_text, Digest};
pub use keys::{KeyPair, KeyPairProvider, PublicKey};
pub use session::{
    SessionState, SharedSession, SignResult, SigningSession, VerificationRecord, VerifyOutcome,
    VerifyReport,
};
pub use signature::Signature;

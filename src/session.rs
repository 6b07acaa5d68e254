//! Sign-then-verify sessions with tamper detection.
//!
//! A [`SigningSession`] starts out unsigned. Signing a document caches the
//! signed text and its signature; every later verification compares a
//! candidate text and an independently supplied signature against that cache.
//! Verification never changes the session state, and signing again simply
//! replaces the cached record.
//!
//! Outcomes are decided in two steps. The candidate signature is first checked
//! against the digest of the *candidate* text; if that fails the outcome is
//! [`VerifyOutcome::SignatureInvalid`] no matter what the text says. Only a
//! valid signature leads to the plain-text comparison with the cached original.
//! Because the signature is bound to the candidate's own digest,
//! [`VerifyOutcome::ValidButModified`] is only reached when the supplied
//! signature was produced over the candidate text by the same key but is not
//! the signature cached by the latest sign operation (for example a signature
//! kept from an earlier sign in the same session).

use crate::engine::SignatureEngine;
use crate::error::{Result, SignError};
use crate::hash::{compute_digest, Digest};
use crate::keys::{KeyPair, PublicKey};
use crate::signature::Signature;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

const NOT_SIGNED_MESSAGE: &str = "Load a document and sign it before checking a signature.";
const NO_SIGNATURE_MESSAGE: &str = "Supply a signature to check before verifying.";

/// What was signed most recently in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRecord {
    /// The exact text that was digested and signed.
    pub original_text: String,
    /// Digest of `original_text`.
    pub original_digest: Digest,
    /// Signature over `original_digest`.
    pub original_signature: Signature,
}

/// Lifecycle of a session: `Unsigned` until the first sign, then `Signed`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unsigned,
    Signed(VerificationRecord),
}

/// Display values produced by a sign operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignResult {
    pub algorithm: String,
    pub digest_algorithm: String,
    /// Uppercase hex of the document digest.
    pub digest_hex: String,
    /// Uppercase hex of the signature, suitable for storage.
    pub signature_hex: String,
}

/// Result of checking a candidate text and signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerifyOutcome {
    /// The signature does not match the candidate text under the session key.
    SignatureInvalid,
    /// The signature matches and the text equals the signed original.
    ValidUnchanged,
    /// The signature matches but the text differs from the signed original.
    ValidButModified,
}

impl VerifyOutcome {
    pub fn is_valid(self) -> bool {
        !matches!(self, VerifyOutcome::SignatureInvalid)
    }

    /// Message shown to the user for this outcome.
    pub fn message(self) -> &'static str {
        match self {
            VerifyOutcome::SignatureInvalid => "Signature is invalid",
            VerifyOutcome::ValidUnchanged => "Signature is valid; the document is unchanged",
            VerifyOutcome::ValidButModified => "Signature is valid; the document has been modified",
        }
    }
}

impl fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Verification outcome together with the candidate digest for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub outcome: VerifyOutcome,
    /// Uppercase hex of the candidate text's digest.
    pub candidate_digest_hex: String,
}

/// One signer's sign/verify workflow over a fixed key pair.
#[derive(Debug)]
pub struct SigningSession {
    engine: SignatureEngine,
    keypair: KeyPair,
    state: SessionState,
}

impl SigningSession {
    pub fn new(keypair: KeyPair, engine: SignatureEngine) -> Self {
        Self {
            engine,
            keypair,
            state: SessionState::Unsigned,
        }
    }

    pub fn engine(&self) -> &SignatureEngine {
        &self.engine
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_signed(&self) -> bool {
        matches!(self.state, SessionState::Signed(_))
    }

    /// The cached record from the latest sign, if any.
    pub fn record(&self) -> Option<&VerificationRecord> {
        match &self.state {
            SessionState::Unsigned => None,
            SessionState::Signed(record) => Some(record),
        }
    }

    /// Hex form of the latest signature, or `None` if nothing has been signed.
    pub fn signature_hex(&self) -> Option<String> {
        self.record().map(|r| r.original_signature.to_hex())
    }

    /// Replace the engine used by later sign operations.
    ///
    /// The cached record is kept, and candidates are still digested with the
    /// algorithm that produced it.
    pub fn set_engine(&mut self, engine: SignatureEngine) {
        self.engine = engine;
    }

    /// Digest and sign `text`, replacing any previously cached record.
    ///
    /// `text` must already be normalized by the caller's text extraction.
    /// The session is left untouched if signing fails.
    pub fn sign(&mut self, text: &str) -> Result<SignResult> {
        let digest = self.engine.compute_digest(text);
        let signature = self.engine.sign(&digest, &self.keypair)?;

        let result = SignResult {
            algorithm: self.keypair.algorithm().to_string(),
            digest_algorithm: digest.algorithm().to_string(),
            digest_hex: digest.to_hex(),
            signature_hex: signature.to_hex(),
        };

        let replaced = self.is_signed();
        self.state = SessionState::Signed(VerificationRecord {
            original_text: text.to_owned(),
            original_digest: digest,
            original_signature: signature,
        });
        tracing::info!(text_len = text.len(), replaced, "document signed");
        Ok(result)
    }

    /// Check `candidate_text` against `candidate_signature_hex`.
    pub fn verify(
        &self,
        candidate_text: &str,
        candidate_signature_hex: &str,
    ) -> Result<VerifyOutcome> {
        self.verify_report(candidate_text, candidate_signature_hex)
            .map(|report| report.outcome)
    }

    /// Like [`SigningSession::verify`], also returning the candidate digest.
    ///
    /// Fails with [`SignError::Precondition`] before the first sign or when the
    /// signature text is blank, and with [`SignError::InvalidFormat`] when it is
    /// not hex. Surrounding whitespace in the signature text is ignored.
    pub fn verify_report(
        &self,
        candidate_text: &str,
        candidate_signature_hex: &str,
    ) -> Result<VerifyReport> {
        let record = self
            .record()
            .ok_or_else(|| SignError::Precondition(NOT_SIGNED_MESSAGE.to_string()))?;

        let signature_hex = candidate_signature_hex.trim();
        if signature_hex.is_empty() {
            return Err(SignError::Precondition(NO_SIGNATURE_MESSAGE.to_string()));
        }

        let candidate_digest =
            compute_digest(candidate_text, record.original_digest.algorithm());
        let signature = Signature::from_hex(signature_hex)?;

        let public_key = self.keypair.public_key();
        let signature_valid = self
            .engine
            .verify(&candidate_digest, &signature, &public_key)?;

        let outcome = if !signature_valid {
            VerifyOutcome::SignatureInvalid
        } else if candidate_text == record.original_text {
            VerifyOutcome::ValidUnchanged
        } else {
            VerifyOutcome::ValidButModified
        };

        tracing::info!(?outcome, text_len = candidate_text.len(), "signature checked");
        Ok(VerifyReport {
            outcome,
            candidate_digest_hex: candidate_digest.to_hex(),
        })
    }
}

/// A [`SigningSession`] that can be shared between threads.
///
/// Sign and verify calls on one shared session are serialized; distinct
/// sessions never contend.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<SigningSession>>,
}

impl SharedSession {
    pub fn new(session: SigningSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn sign(&self, text: &str) -> Result<SignResult> {
        self.inner.lock().sign(text)
    }

    pub fn verify(
        &self,
        candidate_text: &str,
        candidate_signature_hex: &str,
    ) -> Result<VerifyOutcome> {
        self.inner.lock().verify(candidate_text, candidate_signature_hex)
    }

    pub fn is_signed(&self) -> bool {
        self.inner.lock().is_signed()
    }

    pub fn signature_hex(&self) -> Option<String> {
        self.inner.lock().signature_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DigestAlgorithm, SigningConfig};

    fn session() -> SigningSession {
        SigningSession::new(KeyPair::generate().unwrap(), SignatureEngine::default())
    }

    #[test]
    fn test_unchanged_text() {
        let mut session = session();
        let signed = session.sign("Hello world").unwrap();

        let outcome = session.verify("Hello world", &signed.signature_hex).unwrap();
        assert_eq!(outcome, VerifyOutcome::ValidUnchanged);
    }

    #[test]
    fn test_case_change_invalidates_signature() {
        let mut session = session();
        let signed = session.sign("Hello world").unwrap();

        let outcome = session.verify("Hello World", &signed.signature_hex).unwrap();
        assert_eq!(outcome, VerifyOutcome::SignatureInvalid);
    }

    #[test]
    fn test_verify_before_sign() {
        let session = session();
        let result = session.verify("Hello world", "ABCD");
        assert!(matches!(result, Err(SignError::Precondition(_))));
    }

    #[test]
    fn test_blank_signature_text() {
        let mut session = session();
        session.sign("Hello world").unwrap();

        let result = session.verify("Hello world", "  \n");
        assert!(matches!(result, Err(SignError::Precondition(_))));
    }

    #[test]
    fn test_non_hex_signature() {
        let mut session = session();
        session.sign("Hello world").unwrap();

        let result = session.verify("Hello world", "1Z");
        assert!(matches!(result, Err(SignError::InvalidFormat(_))));
    }

    #[test]
    fn test_wrong_length_signature() {
        let mut session = session();
        session.sign("Hello world").unwrap();

        let result = session.verify("Hello world", "ABCD");
        assert!(matches!(result, Err(SignError::Verification(_))));
    }

    #[test]
    fn test_signature_whitespace_ignored() {
        let mut session = session();
        let signed = session.sign("Hello world").unwrap();

        let padded = format!("  {}\r\n", signed.signature_hex);
        assert_eq!(
            session.verify("Hello world", &padded).unwrap(),
            VerifyOutcome::ValidUnchanged
        );
    }

    #[test]
    fn test_verify_is_repeatable() {
        let mut session = session();
        let signed = session.sign("Hello world").unwrap();

        for _ in 0..3 {
            assert_eq!(
                session.verify("Hello world", &signed.signature_hex).unwrap(),
                VerifyOutcome::ValidUnchanged
            );
        }
        assert!(session.is_signed());
    }

    #[test]
    fn test_earlier_signature_reports_modified() {
        let mut session = session();
        let first = session.sign("Draft one").unwrap();
        session.sign("Draft two").unwrap();

        // The first signature still matches its own text, which is no longer the cached original.
        let outcome = session.verify("Draft one", &first.signature_hex).unwrap();
        assert_eq!(outcome, VerifyOutcome::ValidButModified);
    }

    #[test]
    fn test_signature_hex_before_and_after_sign() {
        let mut session = session();
        assert!(session.signature_hex().is_none());

        let signed = session.sign("Hello world").unwrap();
        assert_eq!(session.signature_hex(), Some(signed.signature_hex));
    }

    #[test]
    fn test_engine_swap_keeps_record_digest() {
        let mut session = session();
        let signed = session.sign("Hello world").unwrap();

        session.set_engine(SignatureEngine::new(
            SigningConfig::default().with_digest(DigestAlgorithm::Blake3),
        ));
        let report = session.verify_report("Hello world", &signed.signature_hex).unwrap();
        assert_eq!(report.outcome, VerifyOutcome::ValidUnchanged);
        assert_eq!(report.candidate_digest_hex, signed.digest_hex);
    }

    #[test]
    fn test_shared_session_across_threads() {
        let shared = SharedSession::new(session());
        let signed = shared.sign("Shared text").unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                let sig = signed.signature_hex.clone();
                std::thread::spawn(move || shared.verify("Shared text", &sig).unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), VerifyOutcome::ValidUnchanged);
        }
    }

    #[test]
    fn test_outcome_serializes_screaming_case() {
        let json = serde_json::to_string(&VerifyOutcome::ValidButModified).unwrap();
        assert_eq!(json, "\"VALID_BUT_MODIFIED\"");
    }
}

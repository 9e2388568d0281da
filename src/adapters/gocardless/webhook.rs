//! Webhook signature verification.
//!
//! The gateway signs each webhook body with HMAC-SHA256 over the raw
//! bytes, hex-encoded into the `Webhook-Signature` header. Verification
//! recomputes the MAC with the shared secret and compares in constant
//! time; the parsed JSON is never touched until the signature passes.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Signature check failures. Both map to the same caller-visible
/// rejection; the split exists for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// Header present but the MAC does not match the body.
    #[error("webhook signature does not match the request body")]
    InvalidSignature,

    /// Header is not valid hex of the right length.
    #[error("webhook signature header is malformed")]
    MalformedSignature,
}

/// Verifies gateway webhook signatures with the shared webhook secret.
pub struct WebhookSignatureVerifier {
    secret: SecretString,
}

impl WebhookSignatureVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Checks `signature` (hex) against `body`.
    pub fn verify(&self, body: &[u8], signature: &str) -> Result<(), SignatureError> {
        let provided = hex::decode(signature).map_err(|_| SignatureError::MalformedSignature)?;

        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(body);
        let expected = mac.finalize().into_bytes();

        if expected.ct_eq(provided.as_slice()).into() {
            Ok(())
        } else {
            Err(SignatureError::InvalidSignature)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    fn verifier() -> WebhookSignatureVerifier {
        WebhookSignatureVerifier::new(SecretString::new("test-webhook-secret".to_string()))
    }

    #[test]
    fn accepts_a_correctly_signed_body() {
        let body = br#"{"events":[]}"#;
        let signature = sign("test-webhook-secret", body);
        assert!(verifier().verify(body, &signature).is_ok());
    }

    #[test]
    fn rejects_a_tampered_body() {
        let signature = sign("test-webhook-secret", br#"{"events":[]}"#);
        let err = verifier()
            .verify(br#"{"events":[{}]}"#, &signature)
            .unwrap_err();
        assert_eq!(err, SignatureError::InvalidSignature);
    }

    #[test]
    fn rejects_a_signature_made_with_the_wrong_secret() {
        let body = br#"{"events":[]}"#;
        let signature = sign("other-secret", body);
        assert_eq!(
            verifier().verify(body, &signature),
            Err(SignatureError::InvalidSignature)
        );
    }

    #[test]
    fn rejects_non_hex_headers() {
        assert_eq!(
            verifier().verify(b"{}", "not-hex!"),
            Err(SignatureError::MalformedSignature)
        );
    }
}

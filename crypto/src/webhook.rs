//! HMAC-SHA256 webhook signatures.
//!
//! The vendor signs the exact bytes of the request body. Verification must run
//! on those same bytes, never on a re-serialized body, and compares in constant
//! time via [`Mac::verify_slice`].

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Algorithm tag prefixed to every signature in the header.
pub const SIGNATURE_SCHEME: &str = "sha256";

/// Errors arising from webhook signature checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("no webhook secret configured")]
    SecretNotConfigured,

    #[error("signature header missing")]
    MissingSignature,

    #[error("malformed signature header: {0}")]
    MalformedHeader(String),

    #[error("unsupported signature scheme: {0}")]
    UnsupportedScheme(String),

    #[error("signature mismatch")]
    Mismatch,
}

/// Shared secret used to authenticate vendor webhooks.
///
/// `Debug` never prints the key material.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookSecret(Vec<u8>);

impl WebhookSecret {
    /// Returns `None` for an empty secret.
    pub fn new(secret: impl AsRef<[u8]>) -> Option<Self> {
        let bytes = secret.as_ref();
        if bytes.is_empty() {
            None
        } else {
            Some(Self(bytes.to_vec()))
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.0).expect("HMAC accepts any key length")
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WebhookSecret(<{} bytes>)", self.0.len())
    }
}

/// Compute the header value the vendor would send for `body`.
pub fn sign_webhook_payload(secret: &WebhookSecret, body: &[u8]) -> String {
    let mut mac = secret.mac();
    mac.update(body);
    let digest = mac.finalize().into_bytes();
    format!("{SIGNATURE_SCHEME}={}", hex::encode(digest))
}

/// Parse a signature header into the raw digests it carries.
///
/// Accepts `sha256=<hex>` entries separated by commas. Any entry with a
/// different algorithm tag fails the whole header.
pub fn parse_signature_header(value: &str) -> Result<Vec<Vec<u8>>, SignatureError> {
    let mut digests = Vec::new();
    for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (scheme, encoded) = entry
            .split_once('=')
            .ok_or_else(|| SignatureError::MalformedHeader(entry.to_string()))?;
        if !scheme.trim().eq_ignore_ascii_case(SIGNATURE_SCHEME) {
            return Err(SignatureError::UnsupportedScheme(scheme.trim().to_string()));
        }
        let digest = hex::decode(encoded.trim())
            .map_err(|e| SignatureError::MalformedHeader(e.to_string()))?;
        digests.push(digest);
    }
    if digests.is_empty() {
        return Err(SignatureError::MalformedHeader("no signatures present".into()));
    }
    Ok(digests)
}

/// Verify a webhook signature header against the raw request body.
///
/// Succeeds if any digest in the header matches.
pub fn verify_webhook_signature(
    secret: Option<&WebhookSecret>,
    body: &[u8],
    header: Option<&str>,
) -> Result<(), SignatureError> {
    let secret = secret.ok_or(SignatureError::SecretNotConfigured)?;
    let header = header.ok_or(SignatureError::MissingSignature)?;
    let digests = parse_signature_header(header)?;

    let mut mac = secret.mac();
    mac.update(body);
    let matched = digests
        .iter()
        .any(|digest| mac.clone().verify_slice(digest).is_ok());

    if matched {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> WebhookSecret {
        WebhookSecret::new("wbhsec_test").unwrap()
    }

    #[test]
    fn sign_and_verify() {
        let body = br#"{"type":"inquiry.completed"}"#;
        let header = sign_webhook_payload(&secret(), body);
        assert!(header.starts_with("sha256="));
        assert_eq!(
            verify_webhook_signature(Some(&secret()), body, Some(&header)),
            Ok(())
        );
    }

    #[test]
    fn known_vector() {
        // RFC 4231 test case 2.
        let key = WebhookSecret::new("Jefe").unwrap();
        let header = sign_webhook_payload(&key, b"what do ya want for nothing?");
        assert_eq!(
            header,
            "sha256=5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn reformatted_body_fails() {
        let body = br#"{"type":"inquiry.completed"}"#;
        let header = sign_webhook_payload(&secret(), body);
        let reserialized = br#"{ "type": "inquiry.completed" }"#;
        assert_eq!(
            verify_webhook_signature(Some(&secret()), reserialized, Some(&header)),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn wrong_secret_fails() {
        let body = b"payload";
        let other = WebhookSecret::new("another").unwrap();
        let header = sign_webhook_payload(&other, body);
        assert_eq!(
            verify_webhook_signature(Some(&secret()), body, Some(&header)),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn missing_header_and_secret() {
        assert_eq!(
            verify_webhook_signature(Some(&secret()), b"x", None),
            Err(SignatureError::MissingSignature)
        );
        let header = sign_webhook_payload(&secret(), b"x");
        assert_eq!(
            verify_webhook_signature(None, b"x", Some(&header)),
            Err(SignatureError::SecretNotConfigured)
        );
        assert!(WebhookSecret::new("").is_none());
    }

    #[test]
    fn header_parsing() {
        assert!(matches!(
            parse_signature_header("deadbeef"),
            Err(SignatureError::MalformedHeader(_))
        ));
        assert!(matches!(
            parse_signature_header("sha1=deadbeef"),
            Err(SignatureError::UnsupportedScheme(s)) if s == "sha1"
        ));
        assert!(matches!(
            parse_signature_header("sha256=not-hex"),
            Err(SignatureError::MalformedHeader(_))
        ));
        assert!(parse_signature_header("").is_err());
        let parsed = parse_signature_header("sha256=00ff, SHA256=10").unwrap();
        assert_eq!(parsed, vec![vec![0x00, 0xff], vec![0x10]]);
    }

    #[test]
    fn any_rotated_signature_matches() {
        let body = b"rotating";
        let old = WebhookSecret::new("old-secret").unwrap();
        let header = format!(
            "{}, {}",
            sign_webhook_payload(&old, body),
            sign_webhook_payload(&secret(), body)
        );
        assert_eq!(
            verify_webhook_signature(Some(&secret()), body, Some(&header)),
            Ok(())
        );
    }

    #[test]
    fn truncated_digest_fails() {
        let body = b"payload";
        let header = sign_webhook_payload(&secret(), body);
        let truncated = &header[..header.len() - 2];
        assert_eq!(
            verify_webhook_signature(Some(&secret()), body, Some(truncated)),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn debug_hides_key() {
        let rendered = format!("{:?}", secret());
        assert!(!rendered.contains("wbhsec_test"));
    }
}

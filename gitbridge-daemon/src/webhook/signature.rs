//! Delivery authentication for both hosts.
//!
//! GitHub signs the raw body: `X-Hub-Signature-256: sha256=<hex HMAC-SHA256>`.
//! GitLab echoes the shared secret verbatim in `X-Gitlab-Token`. Both
//! comparisons are constant-time.

use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::error::WebhookError;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

/// Verify a GitHub `X-Hub-Signature-256` header against `body`.
pub fn verify_github_signature(
    secret: &[u8],
    header: Option<&str>,
    body: &[u8],
) -> Result<(), WebhookError> {
    let header = header.ok_or(WebhookError::MissingSignature)?;
    let hex_digest = header
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or_else(|| WebhookError::InvalidSignatureFormat(header.to_string()))?;
    let expected = hex::decode(hex_digest)
        .map_err(|_| WebhookError::InvalidSignatureFormat(header.to_string()))?;

    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| WebhookError::InvalidSignature)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| WebhookError::InvalidSignature)
}

/// Verify a GitLab `X-Gitlab-Token` header.
pub fn verify_gitlab_token(secret: &[u8], header: Option<&str>) -> Result<(), WebhookError> {
    let token = header.ok_or(WebhookError::MissingSignature)?;
    if constant_time_eq(token.as_bytes(), secret) {
        Ok(())
    } else {
        Err(WebhookError::InvalidSignature)
    }
}

/// `sha256=<hex>` for `body`; what a sender puts in `X-Hub-Signature-256`.
pub fn sign(secret: &[u8], body: &[u8]) -> String {
    // HMAC accepts keys of any length, so construction cannot fail.
    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(body);
    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"It's a Secret to Everybody";

    #[test]
    fn known_github_vector_verifies() {
        // Example delivery from GitHub's webhook validation guide.
        let body = b"Hello, World!";
        let header = "sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17";
        assert_eq!(sign(SECRET, body), header);
        verify_github_signature(SECRET, Some(header), body).unwrap();
    }

    #[test]
    fn tampered_body_is_rejected() {
        let header = sign(SECRET, b"original");
        let err = verify_github_signature(SECRET, Some(&header), b"tampered").unwrap_err();
        assert!(matches!(err, WebhookError::InvalidSignature));
    }

    #[test]
    fn missing_and_malformed_headers() {
        assert!(matches!(
            verify_github_signature(SECRET, None, b"x"),
            Err(WebhookError::MissingSignature)
        ));
        assert!(matches!(
            verify_github_signature(SECRET, Some("sha1=abcd"), b"x"),
            Err(WebhookError::InvalidSignatureFormat(_))
        ));
        assert!(matches!(
            verify_github_signature(SECRET, Some("sha256=zz"), b"x"),
            Err(WebhookError::InvalidSignatureFormat(_))
        ));
    }

    #[test]
    fn gitlab_token_must_match_exactly() {
        verify_gitlab_token(b"s3cr3t", Some("s3cr3t")).unwrap();
        assert!(verify_gitlab_token(b"s3cr3t", Some("s3cr3")).is_err());
        assert!(verify_gitlab_token(b"s3cr3t", Some("S3CR3T")).is_err());
        assert!(verify_gitlab_token(b"s3cr3t", Some("s3cr3t-and-more")).is_err());
        assert!(verify_gitlab_token(b"s3cr3t", Some("")).is_err());
        assert!(matches!(
            verify_gitlab_token(b"s3cr3t", None),
            Err(WebhookError::MissingSignature)
        ));
    }
}

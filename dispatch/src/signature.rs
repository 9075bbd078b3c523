//! Webhook payload signing.
//!
//! Each delivery is signed with HMAC-SHA256 over the raw body bytes using
//! the subscription's secret, and the hex digest travels in the
//! `X-Webhook-Signature` header. Receivers recompute the digest over the
//! bytes they received and compare in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex HMAC-SHA256 signature.
pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

/// Sign `body` with `secret`, returning the lowercase hex digest.
#[must_use]
#[allow(clippy::expect_used)]
pub fn sign(secret: &[u8], body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a received hex signature against `body` and `secret`.
///
/// Comparison happens in constant time via [`Mac::verify_slice`].
#[must_use]
pub fn verify(secret: &[u8], body: &[u8], signature_hex: &str) -> bool {
    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"whsec_c2VjcmV0LXZhbHVl";
    const BODY: &[u8] = br#"{"id":"1","event":"status.changed","payload":{}}"#;

    #[test]
    fn signing_is_deterministic() {
        assert_eq!(sign(SECRET, BODY), sign(SECRET, BODY));
    }

    #[test]
    fn receiver_with_the_same_secret_verifies() {
        let signature = sign(SECRET, BODY);
        assert!(verify(SECRET, BODY, &signature));
    }

    #[test]
    fn any_changed_body_byte_changes_the_signature() {
        let signature = sign(SECRET, BODY);
        for index in 0..BODY.len() {
            let mut tampered = BODY.to_vec();
            tampered[index] ^= 0x01;
            assert_ne!(sign(SECRET, &tampered), signature, "byte {index}");
            assert!(!verify(SECRET, &tampered, &signature), "byte {index}");
        }
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let signature = sign(SECRET, BODY);
        assert!(!verify(b"other-secret", BODY, &signature));
    }

    #[test]
    fn malformed_hex_fails_verification() {
        assert!(!verify(SECRET, BODY, "not-hex"));
        assert!(!verify(SECRET, BODY, ""));
    }
}

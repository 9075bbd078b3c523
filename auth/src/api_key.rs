//! API key records and credential handling.
//!
//! The raw credential is shown to the organization exactly once, at
//! creation. Only its SHA-256 hash is ever stored; a presented credential
//! is hashed and looked up by that hash, never compared in the clear.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use trellis_core::scope::{has_scope, Scope};
use uuid::Uuid;

/// Prefix identifying a Trellis API credential.
///
/// Presented credentials without this prefix are rejected before any
/// store lookup happens.
pub const CREDENTIAL_PREFIX: &str = "trellis_";

/// Number of random bytes behind a generated credential.
const CREDENTIAL_BYTES: usize = 32;

/// A stored API key. The raw secret never appears here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    /// Key identifier.
    pub id: Uuid,
    /// Organization the key belongs to.
    pub organization_id: Uuid,
    /// SHA-256 hex digest of the raw credential.
    pub key_hash: String,
    /// Scopes granted to this key.
    pub scopes: Vec<Scope>,
    /// Whether the key is currently usable.
    pub is_active: bool,
    /// Optional expiry; `None` means the key does not expire.
    pub expires_at: Option<DateTime<Utc>>,
    /// Last successful authentication with this key (best-effort).
    pub last_used_at: Option<DateTime<Utc>>,
    /// When the key was issued.
    pub created_at: DateTime<Utc>,
}

impl ApiKey {
    /// Issue a new key for `organization_id`.
    ///
    /// Returns the stored record and the raw credential. The raw credential
    /// is the only copy; callers must hand it to the organization and drop it.
    #[must_use]
    pub fn issue(
        organization_id: Uuid,
        scopes: Vec<Scope>,
        expires_at: Option<DateTime<Utc>>,
    ) -> (Self, String) {
        let credential = generate_credential();
        let key = Self {
            id: Uuid::new_v4(),
            organization_id,
            key_hash: hash_credential(&credential),
            scopes,
            is_active: true,
            expires_at,
            last_used_at: None,
            created_at: Utc::now(),
        };
        (key, credential)
    }
}

/// The authorization context a successful authentication resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthContext {
    /// Organization the caller acts for.
    pub organization_id: Uuid,
    /// Scopes granted to the presented key.
    pub scopes: Vec<Scope>,
}

impl AuthContext {
    /// Whether this context satisfies `required`, honoring the scope lattice.
    #[must_use]
    pub fn has_scope(&self, required: Scope) -> bool {
        has_scope(&self.scopes, required)
    }
}

/// Generate a fresh raw credential: prefix plus 32 random bytes, base64url.
#[must_use]
pub fn generate_credential() -> String {
    let mut bytes = [0u8; CREDENTIAL_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{CREDENTIAL_PREFIX}{}", URL_SAFE_NO_PAD.encode(bytes))
}

/// One-way, deterministic hash of a presented credential.
#[must_use]
pub fn hash_credential(credential: &str) -> String {
    let digest = Sha256::digest(credential.as_bytes());
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_credentials_carry_the_prefix_and_differ() {
        let a = generate_credential();
        let b = generate_credential();
        assert!(a.starts_with(CREDENTIAL_PREFIX));
        assert!(b.starts_with(CREDENTIAL_PREFIX));
        assert_ne!(a, b);
    }

    #[test]
    fn hashing_is_deterministic_and_one_way() {
        let credential = "trellis_test-credential";
        let first = hash_credential(credential);
        let second = hash_credential(credential);
        assert_eq!(first, second);
        // 32-byte digest, hex encoded
        assert_eq!(first.len(), 64);
        assert!(!first.contains("test-credential"));
    }

    #[test]
    fn issued_key_stores_only_the_hash() {
        let (key, credential) = ApiKey::issue(Uuid::new_v4(), vec![Scope::Read], None);
        assert_eq!(key.key_hash, hash_credential(&credential));
        assert_ne!(key.key_hash, credential);
        assert!(key.is_active);
        assert!(key.last_used_at.is_none());
    }

    #[test]
    fn context_scope_check_uses_the_lattice() {
        let context = AuthContext {
            organization_id: Uuid::new_v4(),
            scopes: vec![Scope::Write],
        };
        assert!(context.has_scope(Scope::Read));
        assert!(context.has_scope(Scope::Write));
        assert!(!context.has_scope(Scope::Admin));
    }
}

// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Salted hashing for payloads and fingerprints.

use sha2::{Digest, Sha256};
use trustgate_core::SaltSource;

/// Hex SHA-256 of `salt || 0x00 || data`.
///
/// Stable for a given salt, so audit records for one user correlate, but not
/// reversible without the salt mapping.
pub fn salted_hash(salt: &[u8], data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update([0u8]);
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Salt source that derives each user's salt from a gateway secret.
///
/// Stands in for an external salt store: anyone holding the secret can
/// recompute salts, so the secret belongs in a vault, not in the audit store.
pub struct DerivedSalt {
    secret: Vec<u8>,
}

impl DerivedSalt {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// A salt source with a random per-process secret. Hashes are stable only
    /// for the lifetime of the process.
    pub fn ephemeral() -> Self {
        let secret: [u8; 32] = rand::random();
        tracing::warn!("no transform.salt_secret configured; payload hashes will not survive restarts");
        Self::new(secret)
    }
}

impl SaltSource for DerivedSalt {
    fn salt_for(&self, user_id: &str) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(user_id.as_bytes());
        hasher.finalize().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_for_same_salt() {
        assert_eq!(salted_hash(b"s", b"payload"), salted_hash(b"s", b"payload"));
        assert_eq!(salted_hash(b"s", b"payload").len(), 64);
    }

    #[test]
    fn hash_differs_across_salts() {
        assert_ne!(salted_hash(b"s1", b"payload"), salted_hash(b"s2", b"payload"));
    }

    #[test]
    fn salt_and_data_are_separated() {
        // Without the separator these would collide.
        assert_ne!(salted_hash(b"ab", b"c"), salted_hash(b"a", b"bc"));
    }

    #[test]
    fn derived_salt_is_per_user() {
        let salts = DerivedSalt::new("secret");
        assert_eq!(salts.salt_for("alice"), salts.salt_for("alice"));
        assert_ne!(salts.salt_for("alice"), salts.salt_for("bob"));
    }
}

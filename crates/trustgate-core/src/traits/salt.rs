// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user salt lookup for payload and fingerprint hashing.

/// Source of per-user salts.
///
/// The salt mapping lives in an external secure store; without it, hashes in
/// the audit trail cannot be correlated back to plaintext.
pub trait SaltSource: Send + Sync + 'static {
    fn salt_for(&self, user_id: &str) -> Vec<u8>;
}

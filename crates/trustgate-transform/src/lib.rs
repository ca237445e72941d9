// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Privacy-preserving prompt transformation.
//!
//! The [`PromptTransformKernel`] rewrites a raw payload according to a
//! [`TransformStrength`](trustgate_core::TransformStrength) and reports what it
//! did as metadata that never contains payload text. Strengths are cumulative:
//!
//! - **light**: redact direct identifiers (emails, phones, cards, IPs, URLs, handles, own ids)
//! - **standard**: light + generalize names, dates, and numbers
//! - **heavy**: standard + truncate and split into bounded segments

pub mod hashing;
pub mod kernel;
pub mod leakage;
pub mod rules;
pub mod segment;

pub use hashing::{salted_hash, DerivedSalt};
pub use kernel::PromptTransformKernel;
pub use leakage::longest_leaked_substring;

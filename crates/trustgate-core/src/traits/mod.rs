// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits for the collaborators the gateway core depends on.
//!
//! Async traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod provider;
pub mod salt;
pub mod store;

pub use provider::ProviderBackend;
pub use salt::SaltSource;
pub use store::AuditStore;

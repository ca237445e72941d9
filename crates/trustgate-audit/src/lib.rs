// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit logging for the Trustgate gateway.
//!
//! One append-only [`AuditRecord`](trustgate_core::AuditRecord) per interaction,
//! carrying billing, a routing trace trimmed to the tier's log detail, and
//! heuristic complexity/quality signals. A trust-ledger delta is written
//! alongside on a best-effort basis.

pub mod detail;
pub mod heuristics;
pub mod logger;
pub mod memory;

pub use logger::{AuditEvent, AuditLogger, AuditResult, LedgerStatus, LogReceipt};
pub use memory::MemoryAuditStore;

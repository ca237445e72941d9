// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the audit and ledger tables.

pub mod audit;
pub mod ledger;

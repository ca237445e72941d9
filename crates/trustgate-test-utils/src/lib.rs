// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Trustgate integration tests.
//!
//! Provides mock collaborators and a harness for fast, deterministic tests
//! without external services.
//!
//! # Components
//!
//! - [`MockBackend`] - provider backend with scripted probe and generate behavior
//! - [`FailingStore`] - audit store whose writes error or hang
//! - [`TestHarness`] - a full gateway wired to mock backends

pub mod failing_store;
pub mod harness;
pub mod mock_backend;

pub use failing_store::{FailingStore, FailureMode};
pub use harness::{mock_registry, request, TestHarness, TestHarnessBuilder};
pub use mock_backend::{GenerateBehavior, MockBackend, ProbeBehavior};

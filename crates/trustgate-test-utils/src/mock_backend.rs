// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted provider backend for deterministic routing tests.
//!
//! `MockBackend` implements `ProviderBackend` with behavior that tests can
//! change between calls: healthy or failing probes, canned or failing
//! completions, hangs for timeout tests, and panics for failsafe tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use trustgate_core::types::{GenerateOptions, GenerateOutput};
use trustgate_core::{GatewayError, ProviderBackend};

/// How the next probes answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeBehavior {
    Healthy,
    Unhealthy,
    /// Never completes. The registry's probe timeout decides.
    Hang,
}

/// How the next generate calls answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateBehavior {
    /// `"[{model}] {payload}"`, like the echo backend.
    Echo,
    Reply(String),
    Fail(String),
    /// Fails with an error message that quotes the payload back.
    FailQuoting,
    /// Never completes. The router's dispatch timeout decides.
    Hang,
    Panic(String),
}

/// A provider backend whose answers are scripted by the test.
pub struct MockBackend {
    model_name: String,
    probe: Mutex<ProbeBehavior>,
    generate: Mutex<GenerateBehavior>,
    probe_calls: AtomicUsize,
    generate_calls: AtomicUsize,
    last_payload: Mutex<Option<String>>,
}

impl MockBackend {
    /// A healthy backend that echoes its input.
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            probe: Mutex::new(ProbeBehavior::Healthy),
            generate: Mutex::new(GenerateBehavior::Echo),
            probe_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
            last_payload: Mutex::new(None),
        }
    }

    pub fn with_probe(self, behavior: ProbeBehavior) -> Self {
        self.set_probe(behavior);
        self
    }

    pub fn with_generate(self, behavior: GenerateBehavior) -> Self {
        self.set_generate(behavior);
        self
    }

    pub fn set_probe(&self, behavior: ProbeBehavior) {
        *self.probe.lock().unwrap_or_else(|e| e.into_inner()) = behavior;
    }

    pub fn set_generate(&self, behavior: GenerateBehavior) {
        *self.generate.lock().unwrap_or_else(|e| e.into_inner()) = behavior;
    }

    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    /// The payload of the most recent generate call, exactly as the router sent it.
    pub fn last_payload(&self) -> Option<String> {
        self.last_payload.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn output(&self, payload: &str, text: String) -> GenerateOutput {
        GenerateOutput {
            units_in: payload.split_whitespace().count() as u32,
            units_out: text.split_whitespace().count() as u32,
            output_text: text,
            model_name: Some(self.model_name.clone()),
        }
    }
}

#[async_trait]
impl ProviderBackend for MockBackend {
    async fn probe(&self) -> bool {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.probe.lock().unwrap_or_else(|e| e.into_inner()).clone();
        match behavior {
            ProbeBehavior::Healthy => true,
            ProbeBehavior::Unhealthy => false,
            ProbeBehavior::Hang => std::future::pending().await,
        }
    }

    async fn generate(
        &self,
        payload: &str,
        _options: &GenerateOptions,
    ) -> Result<GenerateOutput, GatewayError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap_or_else(|e| e.into_inner()) = Some(payload.to_string());
        let behavior = self.generate.lock().unwrap_or_else(|e| e.into_inner()).clone();
        match behavior {
            GenerateBehavior::Echo => Ok(self.output(payload, format!("[{}] {payload}", self.model_name))),
            GenerateBehavior::Reply(text) => Ok(self.output(payload, text)),
            GenerateBehavior::Fail(message) => Err(GatewayError::ProviderUnavailable {
                provider: self.model_name.clone(),
                message,
                status: None,
            }),
            GenerateBehavior::FailQuoting => Err(GatewayError::ProviderUnavailable {
                provider: self.model_name.clone(),
                message: format!("cannot serve prompt `{payload}`"),
                status: Some(422),
            }),
            GenerateBehavior::Hang => std::future::pending().await,
            GenerateBehavior::Panic(message) => panic!("{message}"),
        }
    }
}

// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trimming of retained detail according to [`LogDetail`].

use trustgate_core::types::{DispatchAttempt, RoutingTrace, TransformMetadata};
use trustgate_core::LogDetail;

/// Drop attempt detail the record's log level does not retain.
///
/// - `summary`: provider used only, no attempts
/// - `detailed`: attempts with provider and success flag
/// - `full`: attempts with latency and error text
pub fn trim_trace(mut trace: RoutingTrace, detail: LogDetail) -> RoutingTrace {
    match detail {
        LogDetail::Summary => trace.attempts.clear(),
        LogDetail::Detailed => {
            trace.attempts = trace
                .attempts
                .into_iter()
                .map(|a| DispatchAttempt {
                    latency_ms: 0,
                    error: None,
                    ..a
                })
                .collect();
        }
        LogDetail::Full => {}
    }
    trace
}

/// Only `full` keeps the list of transformations that fired.
pub fn trim_transform(mut metadata: TransformMetadata, detail: LogDetail) -> TransformMetadata {
    if detail < LogDetail::Full {
        metadata.transformations_applied.clear();
    }
    metadata
}

//! Delivery sinks.
//!
//! The real backends (spreadsheet append, relational insert) live out of
//! tree behind [`SubmissionSink`]; the pipeline only knows about delivery,
//! timeouts and the two failure classes.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::types::FormSubmission;

/// Default per-delivery timeout.
///
/// The upstream clients historically ran without one; a hung append then
/// hangs the submission. Timeout surfaces as a transient failure.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure classes a sink can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// Transient upstream failure (timeout, 429/5xx from the API).
    #[error("sink unavailable: {0}")]
    Unavailable(String),

    /// Credentials or permissions broken (e.g. 403 from the API).
    #[error("sink misconfigured: {0}")]
    Configuration(String),
}

/// One delivery destination for accepted submissions.
#[async_trait]
pub trait SubmissionSink: Send + Sync + std::fmt::Debug {
    /// Destination name for logs.
    fn name(&self) -> &'static str;

    /// Delivers one submission.
    async fn deliver(&self, submission: &FormSubmission) -> Result<(), SinkError>;
}

/// Runs one delivery under an explicit timeout.
///
/// # Errors
/// The sink's own error, or [`SinkError::Unavailable`] when the deadline
/// passes first.
pub async fn deliver_with_timeout(
    sink: &dyn SubmissionSink,
    submission: &FormSubmission,
    timeout: Duration,
) -> Result<(), SinkError> {
    match tokio::time::timeout(timeout, sink.deliver(submission)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(sink = sink.name(), ?timeout, "Sink delivery timed out");
            Err(SinkError::Unavailable(format!(
                "{} did not answer within {}s",
                sink.name(),
                timeout.as_secs()
            )))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use std::collections::BTreeMap;

    use googletest::prelude::*;

    use super::*;
    use crate::forms::types::FormType;

    /// Sink that sleeps longer than any sane timeout.
    #[derive(Debug)]
    struct StuckSink;

    #[async_trait]
    impl SubmissionSink for StuckSink {
        fn name(&self) -> &'static str {
            "stuck"
        }

        async fn deliver(&self, _submission: &FormSubmission) -> Result<(), SinkError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    /// Sink that answers immediately.
    #[derive(Debug)]
    struct OkSink;

    #[async_trait]
    impl SubmissionSink for OkSink {
        fn name(&self) -> &'static str {
            "ok"
        }

        async fn deliver(&self, _submission: &FormSubmission) -> Result<(), SinkError> {
            Ok(())
        }
    }

    /// Minimal valid submission.
    fn submission() -> FormSubmission {
        FormSubmission::new(FormType::Contact, BTreeMap::new(), 1)
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_maps_to_unavailable() {
        let result =
            deliver_with_timeout(&StuckSink, &submission(), DELIVERY_TIMEOUT).await;

        let Err(SinkError::Unavailable(detail)) = result else {
            panic!("expected unavailable");
        };
        assert_that!(detail, contains_substring("stuck"));
    }

    #[tokio::test]
    async fn fast_delivery_passes_through() {
        let result = deliver_with_timeout(&OkSink, &submission(), DELIVERY_TIMEOUT).await;

        assert_that!(result, ok(anything()));
    }
}

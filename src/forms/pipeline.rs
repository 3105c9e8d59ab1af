//! Submission pipeline state machine.
//!
//! `Received → Validated → RateLimitChecked → Persisted → SheetSynced`.
//! Fail fast on validation, best effort on side effects: a mirror failure
//! after successful persistence never turns the submission into a reported
//! failure.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::error::{
    FieldError,
    FormError,
};
use super::rate_limit::{
    CounterStore,
    RateDecision,
};
use super::sink::{
    DELIVERY_TIMEOUT,
    SinkError,
    SubmissionSink,
    deliver_with_timeout,
};
use super::types::{
    FormSubmission,
    FormType,
};
use super::validate::validate;

/// Stages a submission passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SubmissionState {
    /// Raw request accepted.
    Received,
    /// Field validation passed.
    Validated,
    /// Rate limiter admitted the attempt.
    RateLimitChecked,
    /// Primary store write succeeded.
    Persisted,
    /// Spreadsheet mirror append succeeded.
    SheetSynced,
}

/// Wire shape of the success response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// Always true on this type.
    pub success: bool,
    /// User-facing confirmation.
    pub message: String,
    /// Generated submission id.
    pub id: String,
    /// RFC 3339 submission time.
    pub timestamp: String,
    /// How far the side effects got (mirror is best effort).
    #[serde(skip)]
    pub final_state: SubmissionState,
}

/// Milliseconds since the Unix epoch.
fn system_now_millis() -> u64 {
    use std::time::{
        SystemTime,
        UNIX_EPOCH,
    };
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

/// Orchestrates one submission end to end.
#[derive(Debug, Clone)]
pub struct FormPipeline {
    /// Rate-limit counter store.
    counter: Arc<dyn CounterStore>,
    /// Primary persistence sink.
    store: Arc<dyn SubmissionSink>,
    /// Best-effort spreadsheet mirror.
    mirror: Option<Arc<dyn SubmissionSink>>,
    /// Per-delivery deadline.
    delivery_timeout: Duration,
    /// Clock hook, replaceable in tests for deterministic ids.
    now_millis: fn() -> u64,
}

impl FormPipeline {
    /// Builds a pipeline with the default timeout and system clock.
    #[must_use]
    pub fn new(counter: Arc<dyn CounterStore>, store: Arc<dyn SubmissionSink>) -> Self {
        Self {
            counter,
            store,
            mirror: None,
            delivery_timeout: DELIVERY_TIMEOUT,
            now_millis: system_now_millis,
        }
    }

    /// Adds the best-effort spreadsheet mirror.
    #[must_use]
    pub fn with_mirror(mut self, mirror: Arc<dyn SubmissionSink>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    /// Overrides the per-delivery deadline.
    #[must_use]
    pub const fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Overrides the clock (tests).
    #[must_use]
    pub const fn with_clock(mut self, now_millis: fn() -> u64) -> Self {
        self.now_millis = now_millis;
        self
    }

    /// Runs one submission through the full state machine.
    ///
    /// `identifier` is the rate-limit key: the client IP, or the submitted
    /// email as a fallback.
    ///
    /// # Errors
    /// [`FormError`] at whichever stage failed; side-effect stages after a
    /// successful persist never fail the submission.
    pub async fn submit(
        &self,
        form_type: &str,
        data: BTreeMap<String, String>,
        identifier: &str,
    ) -> Result<SubmissionReceipt, FormError> {
        let Some(form_type) = FormType::from_wire(form_type) else {
            return Err(FormError::Validation(vec![FieldError::new(
                "formType",
                "Invalid form type",
            )]));
        };

        let now = (self.now_millis)();
        let submission = FormSubmission::new(form_type, data, now);
        tracing::debug!(id = submission.id, state = ?SubmissionState::Received, "Submission received");

        validate(&submission)?;
        tracing::debug!(id = submission.id, state = ?SubmissionState::Validated, "Validation passed");

        if let RateDecision::Limited { retry_after_seconds } =
            self.counter.check_and_increment(identifier, now).await
        {
            return Err(FormError::RateLimitExceeded { retry_after_seconds });
        }
        tracing::debug!(id = submission.id, state = ?SubmissionState::RateLimitChecked, "Rate limit passed");

        deliver_with_timeout(self.store.as_ref(), &submission, self.delivery_timeout)
            .await
            .map_err(FormError::from)?;
        tracing::debug!(id = submission.id, state = ?SubmissionState::Persisted, "Persisted");

        let final_state = match &self.mirror {
            Some(mirror) => {
                match deliver_with_timeout(mirror.as_ref(), &submission, self.delivery_timeout)
                    .await
                {
                    Ok(()) => SubmissionState::SheetSynced,
                    Err(error) => {
                        // Best effort: the user is not told their
                        // submission failed because a secondary mirror did.
                        tracing::warn!(
                            id = submission.id,
                            %error,
                            "Sheet mirror failed after successful persistence"
                        );
                        SubmissionState::Persisted
                    }
                }
            }
            None => SubmissionState::Persisted,
        };

        Ok(SubmissionReceipt {
            success: true,
            message: "Submission received".to_string(),
            id: submission.id.clone(),
            timestamp: submission.timestamp(),
            final_state,
        })
    }
}

impl From<SinkError> for FormError {
    fn from(error: SinkError) -> Self {
        match error {
            SinkError::Unavailable(detail) => Self::ServiceUnavailable(detail),
            SinkError::Configuration(detail) => Self::Configuration(detail),
        }
    }
}

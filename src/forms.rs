//! Lead form submission pipeline.
//!
//! Request-scoped and stateless except for the rate limiter's shared
//! counter store. The HTTP endpoint fronting this pipeline lives out of
//! tree; this module provides the semantics, the response body shapes and
//! the error-to-status mapping.

/// Error taxonomy and wire error bodies
pub mod error;
/// Submission pipeline state machine
pub mod pipeline;
/// Sliding-window rate limiting
pub mod rate_limit;
/// Delivery sinks (store + spreadsheet mirror)
pub mod sink;
/// Form types and submission records
pub mod types;
/// Field validation
pub mod validate;

pub use error::{
    FieldError,
    FormError,
};
pub use pipeline::{
    FormPipeline,
    SubmissionReceipt,
    SubmissionState,
};
pub use rate_limit::{
    CounterStore,
    InMemoryCounterStore,
    RateDecision,
};
pub use sink::{
    SinkError,
    SubmissionSink,
};
pub use types::{
    FormSubmission,
    FormType,
};

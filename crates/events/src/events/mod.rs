use serde::{Deserialize, Serialize};

use crate::{EventLevel, EventSource};
use lastore_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error defines one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod general;
pub mod job;

pub use general::*;
pub use job::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Operation lifecycle
    General(GeneralEvent),

    /// Job lifecycle and published property changes
    Job(JobEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Job(_) => EventSource::JOB,
        }
    }

    /// Identifier used to stitch related events together
    #[must_use]
    pub fn correlation_id(&self) -> Option<String> {
        match self {
            Self::Job(event) => Some(event.job_id().to_string()),
            Self::General(_) => None,
        }
    }

    /// Severity used for event metadata and log records
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::General(GeneralEvent::OperationFailed { failure, .. })
            | Self::Job(JobEvent::DispatchFailed { failure, .. }) => {
                if failure.retryable {
                    EventLevel::Warn
                } else {
                    EventLevel::Error
                }
            }
            Self::General(GeneralEvent::OperationCompleted { success: false, .. }) => {
                EventLevel::Warn
            }
            Self::Job(JobEvent::PropertiesChanged { .. }) => EventLevel::Trace,
            Self::General(
                GeneralEvent::OperationStarted { .. }
                | GeneralEvent::OperationCompleted { success: true, .. },
            )
            | Self::Job(
                JobEvent::Added { .. } | JobEvent::PhasePromoted { .. } | JobEvent::Removed { .. },
            ) => EventLevel::Info,
        }
    }
}

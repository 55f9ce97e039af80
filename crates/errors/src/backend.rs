//! Package backend error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BackendError {
    #[error("backend rejected {operation} for job {job_id}: {message}")]
    DispatchFailed {
        operation: String,
        job_id: String,
        message: String,
    },

    #[error("backend unavailable: {message}")]
    Unavailable { message: String },
}

impl UserFacingError for BackendError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Unavailable { .. } => Some("Check that the package backend is running."),
            Self::DispatchFailed { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::DispatchFailed { .. } => "backend.dispatch_failed",
            Self::Unavailable { .. } => "backend.unavailable",
        };
        Some(code)
    }
}

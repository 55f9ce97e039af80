#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the lastore job service
//!
//! This crate provides fine-grained error types organized by domain.
//! All error types implement Clone so they can travel inside events.

use std::borrow::Cow;

use thiserror::Error;

pub mod backend;
pub mod config;
pub mod job;

// Re-export all error types at the root
pub use backend::BackendError;
pub use config::ConfigError;
pub use job::JobError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("job error: {0}")]
    Job(#[from] JobError),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Whether this error is a job lookup miss
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Job(JobError::NotFound { .. } | JobError::UnknownJobType { .. })
        )
    }

    /// Whether this error is an admission conflict
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Job(JobError::DuplicateJob { .. }))
    }
}

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for display to a caller.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Job(err) => err.user_message(),
            Error::Backend(err) => err.user_message(),
            Error::Config(err) => err.user_message(),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Job(err) => err.user_hint(),
            Error::Backend(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Backend(err) => err.is_retryable(),
            Error::Job(_) | Error::Config(_) => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Job(err) => err.user_code(),
            Error::Backend(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
        }
    }
}

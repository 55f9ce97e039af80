//! Job bookkeeping error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum JobError {
    #[error("job already exists: {job_type} {package}")]
    DuplicateJob { job_type: String, package: String },

    #[error("job id already in use: {id}")]
    IdInUse { id: String },

    #[error("job not found: {id}")]
    NotFound { id: String },

    #[error("unknown job type: {name}")]
    UnknownJobType { name: String },

    #[error("cannot swap job {current} with job {next}: identities differ")]
    IdentityMismatch { current: String, next: String },
}

impl UserFacingError for JobError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::DuplicateJob { .. } => {
                Some("The operation is already in flight; track the existing job instead.")
            }
            Self::IdInUse { .. } => Some("Allocate job ids from a single allocator."),
            Self::NotFound { .. } => Some("List the current jobs to find a valid job id."),
            Self::UnknownJobType { .. } => Some("Use one of: download, install, remove."),
            Self::IdentityMismatch { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::DuplicateJob { .. } => "job.duplicate",
            Self::IdInUse { .. } => "job.id_in_use",
            Self::NotFound { .. } | Self::UnknownJobType { .. } => "job.not_found",
            Self::IdentityMismatch { .. } => "job.identity_mismatch",
        };
        Some(code)
    }
}

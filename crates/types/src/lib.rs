#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the lastore job service
//!
//! This crate provides the vocabulary shared between the job core, the
//! event system and package backends: identifiers, job types, reported
//! statuses, progress reports and the published job snapshot.

pub mod job;
pub mod package;
pub mod progress;

// Re-export commonly used types
pub use job::{JobId, JobInfo, JobOptions, JobProperty, JobStatus, JobType, REGION_OPTION};
pub use package::PackageId;
pub use progress::{wire_progress, Progress, ProgressReport};

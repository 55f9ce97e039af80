//! Job-related type definitions

use lastore_errors::JobError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Option key carrying the mirror region hint for downloads
pub const REGION_OPTION: &str = "region";

/// Dispatch-time options of a job phase
pub type JobOptions = BTreeMap<String, String>;

/// Unique identifier of a job
///
/// Assigned once at creation and kept across phase promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(u64);

impl JobId {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(Self)
            .map_err(|_| JobError::NotFound { id: s.to_string() })
    }
}

/// Kind of package operation a job performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Download,
    Install,
    Remove,
}

impl JobType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Install => "install",
            Self::Remove => "remove",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "download" => Ok(Self::Download),
            "install" => Ok(Self::Install),
            "remove" => Ok(Self::Remove),
            _ => Err(JobError::UnknownJobType {
                name: s.to_string(),
            }),
        }
    }
}

/// Status string as last reported by the backend
///
/// Only [`JobStatus::READY`] is assigned locally; everything else is mirrored
/// verbatim from backend reports, so backends may use their own sub-phases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobStatus(Cow<'static, str>);

impl JobStatus {
    pub const READY: Self = Self::const_str("ready");
    pub const RUNNING: Self = Self::const_str("running");
    pub const SUCCEED: Self = Self::const_str("succeed");
    pub const FAILED: Self = Self::const_str("failed");

    const fn const_str(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    /// Wrap a status string reported by a backend
    #[must_use]
    pub fn from_reported(value: impl Into<String>) -> Self {
        Self(Cow::Owned(value.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `succeed` and `failed` are terminal
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        *self == Self::SUCCEED || *self == Self::FAILED
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::READY
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for JobStatus {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

/// Published property of a job object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobProperty {
    Id,
    PackageId,
    Type,
    Status,
    Progress,
    Description,
    CreateTime,
}

impl JobProperty {
    /// Property name as seen by remote observers
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "Id",
            Self::PackageId => "PackageId",
            Self::Type => "Type",
            Self::Status => "Status",
            Self::Progress => "Progress",
            Self::Description => "Description",
            Self::CreateTime => "CreateTime",
        }
    }
}

impl fmt::Display for JobProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Published state of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    pub id: JobId,
    pub package_id: crate::PackageId,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub status: JobStatus,
    pub progress: f64,
    pub description: String,
    /// Creation time in nanoseconds since the Unix epoch
    pub create_time: i64,
    /// Stable object name the job is addressed by
    pub object_path: String,
}

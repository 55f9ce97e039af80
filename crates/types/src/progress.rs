//! Progress reports delivered by package backends

use crate::{JobId, JobStatus};
use serde::{Deserialize, Deserializer, Serialize};

/// Fractional progress in `[0.0, 1.0]`
pub type Progress = f64;

/// Snapshot of a job as reported by the backend
///
/// `progress` is `None` when the backend has no new progress value; such a
/// report must leave the stored progress alone. Deserialized reports treat
/// the `-1` sentinel, any negative value and NaN as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub job_id: JobId,
    pub description: String,
    pub status: JobStatus,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_progress"
    )]
    pub progress: Option<Progress>,
}

impl ProgressReport {
    /// Wire value some backends use for "progress unchanged"
    pub const NO_UPDATE: f64 = -1.0;

    /// Create a report with only a status
    pub fn new(job_id: JobId, status: impl Into<JobStatus>) -> Self {
        Self {
            job_id,
            description: String::new(),
            status: status.into(),
            progress: None,
        }
    }

    /// Build a report from a raw backend tuple, translating the `-1` sentinel
    #[must_use]
    pub fn from_wire(job_id: JobId, description: String, status: JobStatus, progress: f64) -> Self {
        Self {
            job_id,
            description,
            status,
            progress: wire_progress(progress),
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Map a raw backend progress value, `None` meaning "unchanged"
#[must_use]
pub fn wire_progress(raw: f64) -> Option<Progress> {
    if raw.is_nan() || raw < 0.0 {
        None
    } else {
        Some(raw.min(1.0))
    }
}

fn deserialize_progress<'de, D>(deserializer: D) -> Result<Option<Progress>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.and_then(wire_progress))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire_sentinel() {
        let report = ProgressReport::from_wire(
            JobId::new(1),
            String::new(),
            JobStatus::RUNNING,
            ProgressReport::NO_UPDATE,
        );
        assert_eq!(report.progress, None);
    }

    #[test]
    fn test_from_wire_clamps() {
        let report =
            ProgressReport::from_wire(JobId::new(1), String::new(), JobStatus::RUNNING, 1.5);
        assert_eq!(report.progress, Some(1.0));
    }

    #[test]
    fn test_deserialized_sentinel_is_no_update() {
        let report: ProgressReport = serde_json::from_str(
            r#"{"job_id":1,"description":"","status":"running","progress":-1}"#,
        )
        .unwrap();
        assert_eq!(report.progress, None);

        let report: ProgressReport =
            serde_json::from_str(r#"{"job_id":1,"description":"","status":"running"}"#).unwrap();
        assert_eq!(report.progress, None);

        let report: ProgressReport = serde_json::from_str(
            r#"{"job_id":1,"description":"","status":"running","progress":0.25}"#,
        )
        .unwrap();
        assert_eq!(report.progress, Some(0.25));
    }
}

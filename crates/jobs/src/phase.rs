//! Operation a job performs in its current or pending phase

use lastore_types::{JobOptions, JobType, REGION_OPTION};
use serde::{Deserialize, Serialize};

/// One phase of a job, carrying the parameters its backend call needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JobPhase {
    Download { region: String },
    Install,
    Remove,
}

impl JobPhase {
    /// Build the phase for a job type
    ///
    /// `region` is only kept for downloads.
    #[must_use]
    pub fn for_type(job_type: JobType, region: &str) -> Self {
        match job_type {
            JobType::Download => Self::Download {
                region: region.to_string(),
            },
            JobType::Install => Self::Install,
            JobType::Remove => Self::Remove,
        }
    }

    #[must_use]
    pub fn job_type(&self) -> JobType {
        match self {
            Self::Download { .. } => JobType::Download,
            Self::Install => JobType::Install,
            Self::Remove => JobType::Remove,
        }
    }

    #[must_use]
    pub fn region(&self) -> Option<&str> {
        match self {
            Self::Download { region } => Some(region),
            Self::Install | Self::Remove => None,
        }
    }

    /// Dispatch options as a string map
    #[must_use]
    pub fn options(&self) -> JobOptions {
        let mut options = JobOptions::new();
        if let Some(region) = self.region() {
            options.insert(REGION_OPTION.to_string(), region.to_string());
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_options_carry_region() {
        let phase = JobPhase::for_type(JobType::Download, "cn");
        assert_eq!(phase.job_type(), JobType::Download);
        assert_eq!(
            phase.options().get(REGION_OPTION).map(String::as_str),
            Some("cn")
        );
    }

    #[test]
    fn test_other_phases_have_no_options() {
        assert!(JobPhase::for_type(JobType::Install, "cn").options().is_empty());
        assert!(JobPhase::Remove.options().is_empty());
        assert_eq!(JobPhase::Remove.region(), None);
    }
}

use lastore_types::{JobId, JobInfo, JobProperty, JobStatus, JobType};
use serde::{Deserialize, Serialize};

use super::FailureContext;

/// New value of a single published job property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "property", content = "value")]
pub enum PropertyValue {
    Type(JobType),
    Status(JobStatus),
    Progress(f64),
    Description(String),
}

impl PropertyValue {
    #[must_use]
    pub fn property(&self) -> JobProperty {
        match self {
            Self::Type(_) => JobProperty::Type,
            Self::Status(_) => JobProperty::Status,
            Self::Progress(_) => JobProperty::Progress,
            Self::Description(_) => JobProperty::Description,
        }
    }
}

/// Lifecycle and property-change notifications for job objects
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JobEvent {
    /// A job was admitted to the queue
    Added { job: JobInfo },

    /// Some published properties of a job changed
    PropertiesChanged {
        job_id: JobId,
        object_path: String,
        changes: Vec<PropertyValue>,
    },

    /// A composite job moved on to its next phase under the same id
    PhasePromoted {
        job_id: JobId,
        from: JobType,
        to: JobType,
    },

    /// The backend refused to start a job
    DispatchFailed {
        job_id: JobId,
        job_type: JobType,
        failure: FailureContext,
    },

    /// A job was removed from the queue
    Removed { job_id: JobId },
}

impl JobEvent {
    /// Job this event is about
    #[must_use]
    pub fn job_id(&self) -> JobId {
        match self {
            Self::Added { job } => job.id,
            Self::PropertiesChanged { job_id, .. }
            | Self::PhasePromoted { job_id, .. }
            | Self::DispatchFailed { job_id, .. }
            | Self::Removed { job_id } => *job_id,
        }
    }

    /// Names of the properties carried by a `PropertiesChanged` event
    #[must_use]
    pub fn changed_properties(&self) -> Vec<JobProperty> {
        match self {
            Self::PropertiesChanged { changes, .. } => {
                changes.iter().map(PropertyValue::property).collect()
            }
            _ => Vec::new(),
        }
    }
}

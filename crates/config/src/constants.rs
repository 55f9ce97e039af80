//! Fixed, non-configurable bus names for published job objects
//!
//! Remote callers address jobs by these names, so they are not exposed via
//! TOML configuration.

use lastore_types::JobId;

pub const SERVICE_NAME: &str = "org.deepin.lastore";

pub const JOB_INTERFACE: &str = "org.deepin.lastore.Job";

pub const JOB_OBJECT_PATH_PREFIX: &str = "/org/deepin/lastore/Job";

/// Object path a job is published under
#[must_use]
pub fn job_object_path(id: JobId) -> String {
    format!("{JOB_OBJECT_PATH_PREFIX}{id}")
}

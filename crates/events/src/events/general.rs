use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Lifecycle of long-running operations such as the progress pump
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    OperationStarted {
        operation: String,
    },

    /// `success` is false when any step failed along the way
    OperationCompleted {
        operation: String,
        success: bool,
    },

    OperationFailed {
        operation: String,
        failure: FailureContext,
    },
}

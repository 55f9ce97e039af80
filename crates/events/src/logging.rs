//! Structured logging integration for events
//!
//! Converts event messages into tracing records with structured fields so
//! that any subscriber (fmt, json, journald) sees the same job timeline that
//! remote observers receive.

use crate::{AppEvent, EventMessage, GeneralEvent, JobEvent};
use tracing::{error, info, trace, warn};

/// Log an event message using the tracing infrastructure
pub fn log_event_with_tracing(message: &EventMessage) {
    let event = &message.event;
    let meta = &message.meta;
    match event {
        AppEvent::Job(job_event) => match job_event {
            JobEvent::Added { job } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    job_id = %job.id,
                    package = %job.package_id,
                    job_type = %job.job_type,
                    object_path = %job.object_path,
                    "Job added"
                );
            }
            JobEvent::PropertiesChanged {
                job_id,
                object_path,
                changes,
            } => {
                trace!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    job_id = %job_id,
                    object_path = %object_path,
                    changes = ?changes,
                    "Job properties changed"
                );
            }
            JobEvent::PhasePromoted { job_id, from, to } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    job_id = %job_id,
                    from = %from,
                    to = %to,
                    "Job promoted to next phase"
                );
            }
            JobEvent::DispatchFailed {
                job_id,
                job_type,
                failure,
            } => {
                if failure.retryable {
                    warn!(
                        source = meta.source.as_str(),
                        event_id = %meta.event_id,
                        job_id = %job_id,
                        job_type = %job_type,
                        code = ?failure.code,
                        message = %failure.message,
                        hint = ?failure.hint,
                        "Job dispatch failed"
                    );
                } else {
                    error!(
                        source = meta.source.as_str(),
                        event_id = %meta.event_id,
                        job_id = %job_id,
                        job_type = %job_type,
                        code = ?failure.code,
                        message = %failure.message,
                        hint = ?failure.hint,
                        "Job dispatch failed"
                    );
                }
            }
            JobEvent::Removed { job_id } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    job_id = %job_id,
                    "Job removed"
                );
            }
        },

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::OperationStarted { operation } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    operation = %operation,
                    "Operation started"
                );
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                if *success {
                    info!(
                        source = meta.source.as_str(),
                        event_id = %meta.event_id,
                        operation = %operation,
                        "Operation completed successfully"
                    );
                } else {
                    warn!(
                        source = meta.source.as_str(),
                        event_id = %meta.event_id,
                        operation = %operation,
                        "Operation completed with issues"
                    );
                }
            }
            GeneralEvent::OperationFailed { operation, failure } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    operation = %operation,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Operation failed"
                );
            }
        },
    }
}

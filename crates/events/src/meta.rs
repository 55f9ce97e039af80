use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppEvent;

/// Metadata captured when an event is emitted
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    pub event_id: Uuid,
    /// Job id for job events
    pub correlation_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub level: EventLevel,
    pub source: EventSource,
    /// Emitter-specific labels, see [`crate::EventEmitter::enrich_event_meta`]
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl EventMeta {
    /// Fresh metadata whose level, source and correlation come from `event`
    #[must_use]
    pub fn for_event(event: &AppEvent) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            correlation_id: event.correlation_id(),
            timestamp: Utc::now(),
            level: event.level(),
            source: event.event_source(),
            labels: BTreeMap::new(),
        }
    }
}

/// Severity of an event
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Trace,
    Info,
    Warn,
    Error,
}

/// Domain that produced an event
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EventSource(Cow<'static, str>);

impl EventSource {
    pub const GENERAL: Self = Self(Cow::Borrowed("general"));
    pub const JOB: Self = Self(Cow::Borrowed("job"));

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

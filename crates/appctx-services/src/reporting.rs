//! Timing, interaction, and error reporting
//!
//! Provides [`ReportingService`]. It is built with the [`FlagsService`] it
//! depends on, so every recorded event can be tagged with the experiments
//! that were active when it happened.

use crate::config::ReportingConfig;
use crate::flags::FlagsService;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Name of the event recorded by [`ReportingService::app_started`]
pub const APP_STARTED: &str = "app-started";

/// Kind of recorded event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Application lifecycle milestone
    Lifecycle,
    /// Completed timer
    Timing,
    /// User interaction
    Interaction,
    /// Reported error
    Error,
}

/// One recorded event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEvent {
    /// Event kind
    pub kind: EventKind,
    /// Event name
    pub name: String,
    /// Milliseconds since the service was created
    pub at_ms: u64,
    /// Measured duration, for timings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Free-form details
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub details: Value,
    /// Experiments enabled when the event was recorded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub experiments: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    events: VecDeque<ReportEvent>,
    timers: HashMap<String, Instant>,
    dropped: u64,
}

/// Reporting service
#[derive(Debug)]
pub struct ReportingService {
    flags: Arc<FlagsService>,
    config: ReportingConfig,
    created: Instant,
    state: Mutex<State>,
}

impl ReportingService {
    /// Create service reporting against `flags`
    #[must_use]
    pub fn new(flags: Arc<FlagsService>, config: ReportingConfig) -> Self {
        Self {
            flags,
            config,
            created: Instant::now(),
            state: Mutex::new(State::default()),
        }
    }

    /// Flags service this reporter tags events with
    #[inline]
    #[must_use]
    pub fn flags(&self) -> &Arc<FlagsService> {
        &self.flags
    }

    /// Record application start
    pub fn app_started(&self) {
        tracing::info!(
            experiments = ?self.flags.enabled_experiments(),
            "application started"
        );
        self.record(EventKind::Lifecycle, APP_STARTED, None, Value::Null);
    }

    /// Start (or restart) a named timer
    pub fn time(&self, name: impl Into<String>) {
        self.state.lock().timers.insert(name.into(), Instant::now());
    }

    /// Stop a named timer and record its duration
    ///
    /// Returns `None` if no timer with that name was running.
    pub fn time_end(&self, name: &str) -> Option<Duration> {
        let started = self.state.lock().timers.remove(name)?;
        let elapsed = started.elapsed();
        tracing::debug!(timer = name, elapsed_ms = millis(elapsed), "timer finished");
        self.record(EventKind::Timing, name, Some(millis(elapsed)), Value::Null);
        Some(elapsed)
    }

    /// Check if a named timer is running
    #[must_use]
    pub fn is_timing(&self, name: &str) -> bool {
        self.state.lock().timers.contains_key(name)
    }

    /// Record a user interaction
    pub fn report_interaction(&self, name: impl Into<String>, details: Value) {
        let name = name.into();
        tracing::debug!(interaction = %name, "interaction reported");
        self.record(EventKind::Interaction, &name, None, details);
    }

    /// Record an error
    pub fn report_error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(error = %message, "error reported");
        self.record(EventKind::Error, "error", None, Value::String(message));
    }

    /// Recorded events, oldest first
    #[must_use]
    pub fn events(&self) -> Vec<ReportEvent> {
        self.state.lock().events.iter().cloned().collect()
    }

    /// Recorded events of one kind
    #[must_use]
    pub fn events_of(&self, kind: EventKind) -> Vec<ReportEvent> {
        self.state
            .lock()
            .events
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    /// Events discarded because the buffer was full
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.state.lock().dropped
    }

    /// Export recorded events as a JSON array
    ///
    /// # Errors
    /// Returns the serializer error if an event cannot be rendered.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.events())
    }

    fn record(&self, kind: EventKind, name: &str, duration_ms: Option<u64>, details: Value) {
        let experiments = if self.config.tag_experiments {
            self.flags
                .enabled_experiments()
                .into_iter()
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };
        let event = ReportEvent {
            kind,
            name: name.to_string(),
            at_ms: millis(self.created.elapsed()),
            duration_ms,
            details,
            experiments,
        };

        let mut state = self.state.lock();
        if self.config.max_events == 0 {
            state.dropped += 1;
            return;
        }
        while state.events.len() >= self.config.max_events {
            state.events.pop_front();
            state.dropped += 1;
        }
        state.events.push_back(event);
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reporter(experiments: &[&str], config: ReportingConfig) -> ReportingService {
        ReportingService::new(Arc::new(FlagsService::new(experiments)), config)
    }

    #[test]
    fn app_started_recorded() {
        let reporting = reporter(&["new-diff-view"], ReportingConfig::default());
        reporting.app_started();

        let events = reporting.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Lifecycle);
        assert_eq!(events[0].name, APP_STARTED);
        assert_eq!(events[0].experiments, vec!["new-diff-view".to_string()]);
    }

    #[test]
    fn timer_round_trip() {
        let reporting = reporter(&[], ReportingConfig::default());
        reporting.time("load-change");
        assert!(reporting.is_timing("load-change"));

        let elapsed = reporting.time_end("load-change");
        assert!(elapsed.is_some());
        assert!(!reporting.is_timing("load-change"));

        let timings = reporting.events_of(EventKind::Timing);
        assert_eq!(timings.len(), 1);
        assert!(timings[0].duration_ms.is_some());
    }

    #[test]
    fn time_end_without_start() {
        let reporting = reporter(&[], ReportingConfig::default());
        assert!(reporting.time_end("never-started").is_none());
        assert!(reporting.events().is_empty());
    }

    #[test]
    fn interaction_details_kept() {
        let reporting = reporter(&[], ReportingConfig::default());
        reporting.report_interaction("rename-group", json!({ "group": "admins" }));

        let events = reporting.events_of(EventKind::Interaction);
        assert_eq!(events[0].details["group"], "admins");
        assert!(events[0].experiments.is_empty());
    }

    #[test]
    fn tagging_can_be_disabled() {
        let config = ReportingConfig::default().with_tag_experiments(false);
        let reporting = reporter(&["x"], config);
        reporting.report_error("oops");
        assert!(reporting.events()[0].experiments.is_empty());
    }

    #[test]
    fn buffer_drops_oldest() {
        let config = ReportingConfig::default().with_max_events(2);
        let reporting = reporter(&[], config);
        for i in 0..5 {
            reporting.report_interaction(format!("click-{i}"), Value::Null);
        }

        let names: Vec<String> = reporting.events().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["click-3", "click-4"]);
        assert_eq!(reporting.dropped_events(), 3);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let reporting = reporter(&[], ReportingConfig::default().with_max_events(0));
        reporting.app_started();
        assert!(reporting.events().is_empty());
        assert_eq!(reporting.dropped_events(), 1);
    }

    #[test]
    fn json_export() {
        let reporting = reporter(&["x"], ReportingConfig::default());
        reporting.report_error("broken");

        let exported: Vec<ReportEvent> = serde_json::from_str(&reporting.to_json().unwrap()).unwrap();
        assert_eq!(exported, reporting.events());
        assert!(reporting.to_json().unwrap().contains("\"kind\":\"error\""));
    }
}

// crates/conformance-core/src/runtime/events.rs
// ============================================================================
// Module: Harness Events
// Description: Structured lifecycle events and their sinks.
// Purpose: Emit JSON-lines progress records without a logging framework.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The verifier reports progress as [`HarnessEvent`]s written to a
//! [`HarnessEventSink`]. Sinks serialize each event as one JSON line so runs
//! can be followed live on stderr, persisted to a file, captured in memory
//! for tests, or dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Lifecycle event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HarnessEventKind {
    /// A case began.
    CaseStarted,
    /// A step began.
    StepStarted,
    /// A step passed.
    StepPassed,
    /// A step failed.
    StepFailed,
    /// An expected-error step saw a matching error.
    ExpectedErrorMatched,
    /// An import round-trip matched applied state.
    ImportVerified,
    /// A remote object was deleted out-of-band.
    RemoteDeleted,
    /// The post-destroy check finished.
    DestroyChecked,
    /// Teardown or the destroy check reported a problem.
    CleanupFailed,
    /// A case finished.
    CaseFinished,
}

impl HarnessEventKind {
    /// Returns the stable event label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CaseStarted => "case_started",
            Self::StepStarted => "step_started",
            Self::StepPassed => "step_passed",
            Self::StepFailed => "step_failed",
            Self::ExpectedErrorMatched => "expected_error_matched",
            Self::ImportVerified => "import_verified",
            Self::RemoteDeleted => "remote_deleted",
            Self::DestroyChecked => "destroy_checked",
            Self::CleanupFailed => "cleanup_failed",
            Self::CaseFinished => "case_finished",
        }
    }
}

/// Harness event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarnessEvent {
    /// Event kind.
    pub event: HarnessEventKind,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Case name.
    pub case: String,
    /// Step index when the event belongs to a step.
    pub step: Option<usize>,
    /// Free-form detail.
    pub detail: Option<String>,
}

impl HarnessEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(
        event: HarnessEventKind,
        case: &str,
        step: Option<usize>,
        detail: Option<String>,
    ) -> Self {
        Self {
            event,
            timestamp_ms: now_millis(),
            case: case.to_string(),
            step,
            detail,
        }
    }
}

/// Returns milliseconds since the Unix epoch, or zero if the clock is earlier.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0)
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Sink for harness events.
pub trait HarnessEventSink: Send + Sync {
    /// Records one event.
    fn record(&self, event: &HarnessEvent);
}

/// Event sink writing JSON lines to stderr.
pub struct StderrEventSink;

impl HarnessEventSink for StderrEventSink {
    fn record(&self, event: &HarnessEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Event sink appending JSON lines to a file.
pub struct FileEventSink {
    /// Output file guarded for concurrent cases.
    file: Mutex<std::fs::File>,
}

impl FileEventSink {
    /// Opens (or creates) the event log for appending.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] when the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl HarnessEventSink for FileEventSink {
    fn record(&self, event: &HarnessEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
        }
    }
}

/// Event sink that drops every event.
pub struct NoopEventSink;

impl HarnessEventSink for NoopEventSink {
    fn record(&self, _event: &HarnessEvent) {}
}

/// Event sink keeping events in memory.
#[derive(Default)]
pub struct MemoryEventSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<HarnessEvent>>,
}

impl MemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HarnessEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns the recorded event kinds in arrival order.
    #[must_use]
    pub fn kinds(&self) -> Vec<HarnessEventKind> {
        self.events().iter().map(|event| event.event).collect()
    }
}

impl HarnessEventSink for MemoryEventSink {
    fn record(&self, event: &HarnessEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event.clone());
    }
}

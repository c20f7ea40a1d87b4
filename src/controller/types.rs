use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Classification of a finished check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Warn,
}

impl Outcome {
    pub fn classify(exit_code: i32, warn_only: bool) -> Self {
        match (exit_code, warn_only) {
            (0, _) => Outcome::Pass,
            (_, true) => Outcome::Warn,
            (_, false) => Outcome::Fail,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Pass => "pass",
            Outcome::Fail => "fail",
            Outcome::Warn => "warn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub exit_code: i32,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub log: String,
}

/// Aggregate of one `run_checks` pass. `overall_ok` is authoritative;
/// `exit_code_sum` only counts checks that are not warn-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub results: Vec<CheckResult>,
    pub overall_ok: bool,
    pub exit_code_sum: i64,
    pub elapsed_ms: u64,
}

impl CheckReport {
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }
}

/// Result of a single exec. `log` is empty unless output was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub log: String,
}

/// Lifecycle of one controller instance. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    NotChecked,
    Resolving,
    /// The orchestration tool could not be invoked to query the registry.
    Unavailable,
    /// Queried without starting, and nothing was running.
    Stopped,
    Starting,
    Running,
    StartFailed,
    Executing,
    Executed,
    TearingDown,
    TornDown,
    TeardownFailed,
}

/// Emitted on every state transition and for every check.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    StateChanged {
        from: ControllerState,
        to: ControllerState,
    },
    CheckStarted {
        name: String,
    },
    CheckFinished(CheckResult),
    ChecksCompleted(CheckReport),
}

/// Receives controller events, typically to render them.
pub trait Reporter {
    fn report(&mut self, event: &ControllerEvent);
}

impl Reporter for Vec<ControllerEvent> {
    fn report(&mut self, event: &ControllerEvent) {
        self.push(event.clone());
    }
}

impl<P: Reporter + ?Sized> Reporter for &mut P {
    fn report(&mut self, event: &ControllerEvent) {
        (**self).report(event);
    }
}

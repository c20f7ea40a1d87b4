use std::time::Instant;

use tracing::{debug, warn};

use crate::config::Check;
use crate::docker::{CaptureMode, Compose, Container, ExecMode, ExecRequest, ProcessRunner};

use super::error::{ControllerError, Result, describe_exit};
use super::types::{
    CheckReport, CheckResult, ControllerEvent, ControllerState, ExecOutput, Outcome, Reporter,
};

/// Drives one compose environment: resolve or start a service, exec into it,
/// run checks and tear it down. Every operation blocks until the underlying
/// process exits. The container registry is re-queried on every resolve.
pub struct EnvironmentController<R, P> {
    compose: Compose<R>,
    workdir: String,
    capture: CaptureMode,
    reporter: P,
    state: ControllerState,
}

impl<R: ProcessRunner, P: Reporter> EnvironmentController<R, P> {
    /// `workdir` is the directory checks run in inside the container;
    /// `capture` applies to start, teardown and check output.
    pub fn new(
        compose: Compose<R>,
        workdir: impl Into<String>,
        capture: CaptureMode,
        reporter: P,
    ) -> Self {
        Self {
            compose,
            workdir: workdir.into(),
            capture,
            reporter,
            state: ControllerState::NotChecked,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn reporter_mut(&mut self) -> &mut P {
        &mut self.reporter
    }

    pub fn into_reporter(self) -> P {
        self.reporter
    }

    /// Query for a running container of `service` without starting anything.
    pub fn resolve(&mut self, service: &str) -> Result<Option<Container>> {
        self.transition(ControllerState::Resolving);
        let found = self.query(service)?;
        self.transition(if found.is_some() {
            ControllerState::Running
        } else {
            ControllerState::Stopped
        });
        Ok(found)
    }

    /// Return the running container of `service`, building and starting the
    /// whole manifest first if none is running.
    pub fn resolve_or_start(&mut self, service: &str) -> Result<Container> {
        self.transition(ControllerState::Resolving);
        if let Some(container) = self.query(service)? {
            self.transition(ControllerState::Running);
            return Ok(container);
        }

        self.start()?;

        match self.query(service)? {
            Some(container) => {
                self.transition(ControllerState::Running);
                Ok(container)
            }
            None => {
                self.transition(ControllerState::StartFailed);
                Err(ControllerError::ServiceNotRunning {
                    service: service.to_string(),
                })
            }
        }
    }

    /// Build and start every service in the manifest.
    pub fn start(&mut self) -> Result<()> {
        self.transition(ControllerState::Starting);
        let output = match self.compose.up(self.capture) {
            Ok(output) => output,
            Err(e) => {
                self.transition(ControllerState::StartFailed);
                return Err(ControllerError::EnvironmentStartFailed {
                    reason: e.to_string(),
                    log: String::new(),
                });
            }
        };

        if !output.success() {
            self.transition(ControllerState::StartFailed);
            return Err(ControllerError::EnvironmentStartFailed {
                reason: describe_exit(&output),
                log: output.log(),
            });
        }
        Ok(())
    }

    /// Run a command inside `container` and return its exit code, which is
    /// not interpreted.
    pub fn exec(&mut self, container: &Container, request: &ExecRequest<'_>) -> Result<ExecOutput> {
        self.transition(ControllerState::Executing);
        let dispatch_failed = |reason: String| ControllerError::ExecDispatchFailed {
            container: container.to_string(),
            command: request.command.to_string(),
            reason,
        };

        let output = self
            .compose
            .exec(container, request)
            .map_err(|e| dispatch_failed(e.to_string()))?;
        let exit_code = output
            .exit_code
            .ok_or_else(|| dispatch_failed(describe_exit(&output)))?;

        self.transition(ControllerState::Executed);
        Ok(ExecOutput {
            exit_code,
            log: output.log(),
        })
    }

    /// Run every check in order, in batch mode, inside the configured
    /// working directory. A failing check never stops the ones after it.
    pub fn run_checks(&mut self, container: &Container, checks: &[Check]) -> Result<CheckReport> {
        let start = Instant::now();
        let mut report = CheckReport {
            results: Vec::with_capacity(checks.len()),
            overall_ok: true,
            exit_code_sum: 0,
            elapsed_ms: 0,
        };

        for check in checks {
            self.reporter.report(&ControllerEvent::CheckStarted {
                name: check.name.clone(),
            });

            let workdir = self.workdir.clone();
            let mode = ExecMode::Batch(self.capture);
            let request = ExecRequest::new(&check.command, &check.env, mode).workdir(&workdir);
            let output = self.exec(container, &request)?;

            let outcome = Outcome::classify(output.exit_code, check.warn_only);
            if !check.warn_only {
                report.exit_code_sum += i64::from(output.exit_code);
            }
            if outcome == Outcome::Fail {
                report.overall_ok = false;
            }
            debug!(
                check = %check.name,
                exit_code = output.exit_code,
                outcome = outcome.as_str(),
                "check finished"
            );

            let result = CheckResult {
                name: check.name.clone(),
                exit_code: output.exit_code,
                outcome,
                log: output.log,
            };
            self.reporter
                .report(&ControllerEvent::CheckFinished(result.clone()));
            report.results.push(result);
        }

        report.elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.reporter
            .report(&ControllerEvent::ChecksCompleted(report.clone()));
        Ok(report)
    }

    /// Stop and remove every container of the manifest.
    pub fn teardown(&mut self) -> Result<()> {
        self.transition(ControllerState::TearingDown);
        let result = match self.compose.down(self.capture) {
            Ok(output) if output.success() => Ok(()),
            Ok(output) => Err(ControllerError::TeardownFailed {
                reason: describe_exit(&output),
                log: output.log(),
            }),
            Err(e) => Err(ControllerError::TeardownFailed {
                reason: e.to_string(),
                log: String::new(),
            }),
        };

        self.transition(if result.is_ok() {
            ControllerState::TornDown
        } else {
            ControllerState::TeardownFailed
        });
        result
    }

    fn query(&mut self, service: &str) -> Result<Option<Container>> {
        let output = match self.compose.ps(service) {
            Ok(output) => output,
            Err(e) => {
                self.transition(ControllerState::Unavailable);
                return Err(ControllerError::Unavailable(e));
            }
        };
        if !output.success() {
            warn!(
                service,
                manifest = %self.compose.manifest().display(),
                exit = %describe_exit(&output),
                "container query failed, treating service as not running"
            );
            return Ok(None);
        }
        Ok(Container::from_ps_output(&output.stdout))
    }

    fn transition(&mut self, to: ControllerState) {
        let from = std::mem::replace(&mut self.state, to);
        debug!(?from, ?to, "controller state");
        self.reporter
            .report(&ControllerEvent::StateChanged { from, to });
    }
}

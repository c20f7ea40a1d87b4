//! The `run`, `attach`, `ci` and `shutdown` flows. Each returns the process
//! exit status to report.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::style::Color;

use crate::config::{CommandLine, Config};
use crate::controller::{ControllerError, EnvironmentController};
use crate::docker::{CaptureMode, Compose, ExecMode, ExecRequest, ProcessRunner};
use crate::report::{self, Console};

/// Everything a flow needs: config, project root and the process runner.
pub struct Environment<R> {
    pub config: Config,
    pub root: PathBuf,
    pub runner: R,
    /// Allocate a TTY for interactive sessions.
    pub tty: bool,
}

type Controller<'a, R, W> = EnvironmentController<&'a R, &'a mut Console<W>>;

impl<R: ProcessRunner> Environment<R> {
    fn controller<'a, W: Write>(
        &'a self,
        capture: CaptureMode,
        console: &'a mut Console<W>,
    ) -> Controller<'a, R, W> {
        let compose = Compose::new(
            &self.runner,
            self.config.docker.as_str(),
            self.config.manifest.as_path(),
            self.root.as_path(),
        )
        .with_tty(self.tty);
        EnvironmentController::new(compose, self.config.workdir.as_str(), capture, console)
    }

    /// Build and start the environment, then optionally install dependencies.
    pub fn run<W: Write>(
        &self,
        console: &mut Console<W>,
        install: bool,
        verbose: bool,
    ) -> Result<i32> {
        let project = &self.config.project;
        console.banner(
            &format!("Starting {project} development environment..."),
            Color::Green,
        );

        let mut ctl = self.controller(CaptureMode::from_verbose(verbose), console);
        if let Err(e) = ctl.start() {
            let console = ctl.reporter_mut();
            console.error(&format!(
                "🐳 ERROR! {project} development environment failed to start!"
            ));
            print_failure(console, &e, verbose);
            return Ok(1);
        }

        if install && let Some(step) = &self.config.install {
            ctl.reporter_mut().stage("Installing project dependencies...");
            let installed = match ctl.resolve(&self.config.service) {
                Ok(Some(container)) => {
                    let request = ExecRequest::new(
                        &step.command,
                        &step.env,
                        ExecMode::Batch(CaptureMode::from_verbose(verbose)),
                    )
                    .workdir(&self.config.workdir);
                    match ctl.exec(&container, &request) {
                        Ok(out) => out.exit_code == 0,
                        Err(e) => {
                            ctl.reporter_mut().error(&e.to_string());
                            false
                        }
                    }
                }
                Ok(None) => {
                    ctl.reporter_mut().error(
                        &ControllerError::ServiceNotRunning {
                            service: self.config.service.clone(),
                        }
                        .to_string(),
                    );
                    false
                }
                Err(e) => {
                    ctl.reporter_mut().error(&e.to_string());
                    false
                }
            };

            // A failed install leaves the environment usable.
            if installed {
                ctl.reporter_mut()
                    .success("Project dependencies successfully installed.");
            } else {
                ctl.reporter_mut().error(
                    "It seems that it is impossible to install project dependencies, \
                     try installing manually...",
                );
            }
        }

        let console = ctl.reporter_mut();
        console.rule();
        console.success(&format!(
            "🐳 SUCCESS! {project} development environment is up and running!"
        ));
        console.rule();
        Ok(0)
    }

    /// Attach to an already running service. Never starts anything.
    pub fn attach<W: Write>(
        &self,
        console: &mut Console<W>,
        service: Option<&str>,
        command: &str,
    ) -> Result<i32> {
        let service = service.unwrap_or(&self.config.service);
        let command =
            CommandLine::parse(command).with_context(|| format!("invalid command: {command}"))?;
        anyhow::ensure!(!command.is_empty(), "command to attach with must not be empty");

        console.warning(&format!(
            "Leaving host environment and attaching to service {service}..."
        ));

        let mut ctl = self.controller(CaptureMode::Inherited, console);
        let container = match ctl.resolve(service) {
            Ok(Some(container)) => container,
            Ok(None) => {
                ctl.reporter_mut().error(&format!(
                    "Service \"{service}\" is not running, have you even started it?"
                ));
                return Ok(1);
            }
            Err(e) => {
                ctl.reporter_mut().error(&e.to_string());
                return Ok(1);
            }
        };

        let env = Default::default();
        let request = ExecRequest::new(&command, &env, ExecMode::Interactive);
        match ctl.exec(&container, &request) {
            Ok(out) => Ok(out.exit_code),
            Err(e) => {
                ctl.reporter_mut().error(&e.to_string());
                Ok(1)
            }
        }
    }

    /// Resolve or start the service, run every check and aggregate.
    pub fn ci<W: Write>(&self, console: &mut Console<W>, opts: CiOptions<'_>) -> Result<i32> {
        let started = Instant::now();
        console.banner(
            &format!("Running CI for {}.", self.config.project),
            Color::Green,
        );

        let mut ctl = self.controller(CaptureMode::from_verbose(opts.verbose), console);

        let container = match ctl.resolve_or_start(&self.config.service) {
            Ok(container) => container,
            Err(e) => {
                let console = ctl.reporter_mut();
                console.error(start_failure_message(&e));
                print_failure(console, &e, opts.verbose);
                if opts.teardown {
                    teardown(&mut ctl, opts.verbose);
                }
                return Ok(1);
            }
        };

        let checks = self.config.ci_checks(opts.install);
        let report = match ctl.run_checks(&container, &checks) {
            Ok(report) => report,
            Err(e) => {
                ctl.reporter_mut().error(&e.to_string());
                if opts.teardown {
                    teardown(&mut ctl, opts.verbose);
                }
                return Ok(1);
            }
        };

        let written = match opts.report {
            Some(path) => match report::write_report(path, &report) {
                Ok(()) => true,
                Err(e) => {
                    ctl.reporter_mut().error(&format!("{e:#}"));
                    false
                }
            },
            None => true,
        };
        let ok = report.overall_ok && written;

        let elapsed = started.elapsed().as_secs_f64().round() as u64;
        let console = ctl.reporter_mut();
        if ok {
            console.rule();
            console.success(&format!(
                "SUCCESS! All checks pass, execution time was {elapsed} seconds."
            ));
            console.rule();
        } else if report.overall_ok {
            console.error(&format!(
                "ERROR! All checks pass but the report could not be written, \
                 execution time was {elapsed} seconds."
            ));
        } else {
            console.error(&format!(
                "ERROR! Not all checks passed, execution time was {elapsed} seconds."
            ));
        }

        if opts.teardown && !teardown(&mut ctl, opts.verbose) {
            return Ok(1);
        }
        Ok(if ok { 0 } else { 1 })
    }

    /// Stop and remove every container of the manifest.
    pub fn shutdown<W: Write>(&self, console: &mut Console<W>, verbose: bool) -> Result<i32> {
        let project = &self.config.project;
        console.banner(
            &format!("Tearing down {project} development environment..."),
            Color::Green,
        );

        let mut ctl = self.controller(CaptureMode::from_verbose(verbose), console);
        if let Err(e) = ctl.teardown() {
            let console = ctl.reporter_mut();
            console.error(&format!(
                "🐳 ERROR! Unable to teardown {project} development environment!"
            ));
            print_failure(console, &e, verbose);
            return Ok(1);
        }

        let console = ctl.reporter_mut();
        console.rule();
        console.success(&format!("{project} development environment destroyed."));
        console.rule();
        Ok(0)
    }
}

/// Flags of the `ci` flow.
#[derive(Debug, Clone, Copy, Default)]
pub struct CiOptions<'a> {
    pub verbose: bool,
    pub install: bool,
    pub teardown: bool,
    pub report: Option<&'a Path>,
}

fn start_failure_message(err: &ControllerError) -> &'static str {
    match err {
        ControllerError::EnvironmentStartFailed { .. } => {
            "It seems that it is impossible to start docker containers."
        }
        ControllerError::ServiceNotRunning { .. } => {
            "It seems that services are not running, have you even started them?"
        }
        _ => "It seems that docker is not reachable.",
    }
}

/// Print the error and, in silent mode, the output that was swallowed.
fn print_failure<W: Write>(console: &mut Console<W>, err: &ControllerError, verbose: bool) {
    console.error(&err.to_string());
    if !verbose && let Some(log) = err.log() {
        console.log(log);
    }
}

/// Returns false when teardown failed.
fn teardown<R: ProcessRunner, W: Write>(ctl: &mut Controller<'_, R, W>, verbose: bool) -> bool {
    match ctl.teardown() {
        Ok(()) => true,
        Err(e) => {
            let console = ctl.reporter_mut();
            console.error("Unable to teardown containers.");
            print_failure(console, &e, verbose);
            false
        }
    }
}

//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "devctl", version, about = "Manage the docker compose development environment")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Project root holding the compose manifest (defaults to the current directory)
    #[arg(long, global = true, env = "DEVCTL_PROJECT_DIR", value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Config file (defaults to `<project-dir>/.devctl.yaml`)
    #[arg(long, global = true, env = "DEVCTL_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Diagnostic log filter, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "warn", value_name = "LEVEL")]
    pub log_level: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build and start the environment, optionally installing dependencies
    Run {
        #[command(flatten)]
        install: InstallArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Attach to a running service container
    Attach {
        /// Service to attach to (defaults to the configured service)
        #[arg(long)]
        service: Option<String>,

        /// Command to execute when attaching
        #[arg(long, default_value = "/bin/bash")]
        command: String,
    },

    /// Run every CI check inside the service container
    Ci {
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        install: InstallArgs,
        #[command(flatten)]
        teardown: TeardownArgs,

        /// Write the check report as JSON
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Stop and remove every container of the environment
    Shutdown {
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, Clone, Copy, Args)]
pub struct OutputArgs {
    /// Show the output of every command
    #[arg(long, overrides_with = "silent")]
    verbose: bool,

    /// Hide command output (default)
    #[arg(long, overrides_with = "verbose")]
    silent: bool,
}

impl OutputArgs {
    pub fn verbose(&self) -> bool {
        self.verbose && !self.silent
    }
}

#[derive(Debug, Clone, Copy, Args)]
pub struct InstallArgs {
    /// Install project dependencies (default)
    #[arg(long, overrides_with = "no_install")]
    install: bool,

    /// Skip installing project dependencies
    #[arg(long, overrides_with = "install")]
    no_install: bool,
}

impl InstallArgs {
    pub fn install(&self) -> bool {
        !self.no_install
    }
}

#[derive(Debug, Clone, Copy, Args)]
pub struct TeardownArgs {
    /// Tear the environment down after the run, pass or fail
    #[arg(long, overrides_with = "no_teardown")]
    teardown: bool,

    /// Leave the environment running (default)
    #[arg(long, overrides_with = "teardown")]
    no_teardown: bool,
}

impl TeardownArgs {
    pub fn teardown(&self) -> bool {
        self.teardown && !self.no_teardown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("devctl").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ci_defaults() {
        match parse(&["ci"]).command {
            Command::Ci {
                output,
                install,
                teardown,
                report,
            } => {
                assert!(!output.verbose());
                assert!(install.install());
                assert!(!teardown.teardown());
                assert!(report.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn last_flag_of_a_pair_wins() {
        match parse(&["ci", "--verbose", "--silent", "--no-install", "--teardown"]).command {
            Command::Ci {
                output,
                install,
                teardown,
                ..
            } => {
                assert!(!output.verbose());
                assert!(!install.install());
                assert!(teardown.teardown());
            }
            other => panic!("unexpected command: {other:?}"),
        }

        match parse(&["run", "--no-install", "--install", "--silent", "--verbose"]).command {
            Command::Run { install, output } => {
                assert!(install.install());
                assert!(output.verbose());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn attach_defaults_to_bash() {
        match parse(&["attach"]).command {
            Command::Attach { service, command } => {
                assert!(service.is_none());
                assert_eq!(command, "/bin/bash");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = parse(&["shutdown", "--project-dir", "/tmp/p", "--log-level", "debug"]);
        assert_eq!(cli.project_dir, Some(PathBuf::from("/tmp/p")));
        assert_eq!(cli.log_level, "debug");
    }
}

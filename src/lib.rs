//! Orchestrates a docker compose development environment: start it, attach
//! to a service, run CI checks inside it and shut it down.
//!
//! The core is [`controller::EnvironmentController`], which resolves a
//! service's running container (starting the whole manifest when needed),
//! executes commands in it and aggregates check outcomes.

pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod docker;
pub mod logging;
pub mod report;

pub use commands::{CiOptions, Environment};
pub use config::{Check, CommandLine, Config};
pub use controller::{CheckReport, CheckResult, ControllerError, EnvironmentController, Outcome};

#[allow(clippy::module_inception)]
mod controller;
mod error;
mod types;

pub use controller::EnvironmentController;
pub use error::{ControllerError, Result};
pub use types::{
    CheckReport, CheckResult, ControllerEvent, ControllerState, ExecOutput, Outcome, Reporter,
};

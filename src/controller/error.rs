use std::io;

use thiserror::Error;

use crate::docker::ProcessOutput;

/// Failures of controller operations. None of them are retried.
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("unable to start the environment ({reason})")]
    EnvironmentStartFailed { reason: String, log: String },

    #[error("service \"{service}\" is not running")]
    ServiceNotRunning { service: String },

    #[error("unable to dispatch `{command}` to container {container} ({reason})")]
    ExecDispatchFailed {
        container: String,
        command: String,
        reason: String,
    },

    #[error("unable to tear down the environment ({reason})")]
    TeardownFailed { reason: String, log: String },

    #[error("unable to invoke the orchestration tool: {0}")]
    Unavailable(#[source] io::Error),
}

impl ControllerError {
    /// Output captured from the failing command, if any.
    pub fn log(&self) -> Option<&str> {
        match self {
            ControllerError::EnvironmentStartFailed { log, .. }
            | ControllerError::TeardownFailed { log, .. }
                if !log.is_empty() =>
            {
                Some(log.as_str())
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ControllerError>;

/// Human description of a non-successful process outcome.
pub(crate) fn describe_exit(output: &ProcessOutput) -> String {
    match output.exit_code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_exit_codes_and_signals() {
        assert_eq!(describe_exit(&ProcessOutput::exited(2)), "exit code 2");
        assert_eq!(
            describe_exit(&ProcessOutput::default()),
            "terminated by signal"
        );
    }

    #[test]
    fn log_only_for_failures_with_output() {
        let err = ControllerError::EnvironmentStartFailed {
            reason: "exit code 1".into(),
            log: "build failed".into(),
        };
        assert_eq!(err.log(), Some("build failed"));

        let err = ControllerError::TeardownFailed {
            reason: "exit code 1".into(),
            log: String::new(),
        };
        assert_eq!(err.log(), None);

        let err = ControllerError::ServiceNotRunning {
            service: "php.local".into(),
        };
        assert_eq!(err.log(), None);
        assert_eq!(err.to_string(), "service \"php.local\" is not running");
    }
}

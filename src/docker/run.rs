use std::io;
use std::process::{Command, Stdio};

use tracing::debug;

use super::types::{CaptureMode, Invocation, ProcessOutput};

/// Dispatches process invocations. Implemented by [`SystemRunner`] for real
/// processes and by scripted fakes in tests.
pub trait ProcessRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        (**self).run(invocation)
    }
}

/// Runs invocations as child processes and blocks until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        debug!(program = %invocation.program, args = ?invocation.args, "dispatching");

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }
        if !invocation.interactive {
            command.stdin(Stdio::null());
        }

        let output = match invocation.capture {
            CaptureMode::Captured => {
                let out = command
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .output()?;
                ProcessOutput {
                    exit_code: out.status.code(),
                    stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
                }
            }
            CaptureMode::Inherited => ProcessOutput {
                exit_code: command.status()?.code(),
                ..ProcessOutput::default()
            },
        };

        debug!(program = %invocation.program, exit_code = ?output.exit_code, "finished");
        Ok(output)
    }
}

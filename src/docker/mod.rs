// Docker orchestration: compose argument vectors, process dispatch.

pub mod compose;
pub mod engine;
pub mod run;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use compose::{Compose, ExecRequest};
pub use engine::{ensure_available, stdin_is_terminal};
pub use run::{ProcessRunner, SystemRunner};
pub use types::{CaptureMode, Container, ExecMode, Invocation, ProcessOutput};

use std::fmt;
use std::path::PathBuf;

/// Identifier of a running container. Never empty: the only constructors
/// are [`Container::new`] and [`Container::from_ps_output`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Container(String);

impl Container {
    /// Returns `None` for a blank identifier.
    pub fn new(id: impl AsRef<str>) -> Option<Self> {
        let id = id.as_ref().trim();
        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_string()))
        }
    }

    /// Parse `ps -q` output: the first non-blank line, if any.
    pub fn from_ps_output(stdout: &str) -> Option<Self> {
        stdout.lines().find_map(Self::new)
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a child's stdout/stderr go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Piped and returned in [`ProcessOutput`].
    Captured,
    /// Passed through to the caller's streams.
    Inherited,
}

impl CaptureMode {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            CaptureMode::Inherited
        } else {
            CaptureMode::Captured
        }
    }
}

/// How a command runs inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Attached to the caller's terminal, for human sessions.
    Interactive,
    /// No stdin, output handled per [`CaptureMode`].
    Batch(CaptureMode),
}

/// A single process invocation. `args` excludes the program itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub capture: CaptureMode,
    pub interactive: bool,
}

/// Outcome of an invocation. Output fields are empty unless captured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn exited(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Self::default()
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Captured stdout followed by stderr.
    pub fn log(&self) -> String {
        let mut log = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !log.is_empty() && !log.ends_with('\n') {
                log.push('\n');
            }
            log.push_str(&self.stderr);
        }
        log
    }
}

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::CommandLine;

use super::run::ProcessRunner;
use super::types::{CaptureMode, Container, ExecMode, Invocation, ProcessOutput};

/// A command to run inside a container.
#[derive(Debug, Clone, Copy)]
pub struct ExecRequest<'a> {
    pub command: &'a CommandLine,
    pub env: &'a BTreeMap<String, String>,
    pub workdir: Option<&'a str>,
    pub mode: ExecMode,
}

impl<'a> ExecRequest<'a> {
    pub fn new(
        command: &'a CommandLine,
        env: &'a BTreeMap<String, String>,
        mode: ExecMode,
    ) -> Self {
        Self {
            command,
            env,
            workdir: None,
            mode,
        }
    }

    pub fn workdir(mut self, workdir: &'a str) -> Self {
        self.workdir = Some(workdir);
        self
    }
}

/// `docker compose` bound to one manifest and project root.
pub struct Compose<R> {
    runner: R,
    docker: String,
    manifest: PathBuf,
    root: PathBuf,
    tty: bool,
}

impl<R: ProcessRunner> Compose<R> {
    pub fn new(
        runner: R,
        docker: impl Into<String>,
        manifest: impl Into<PathBuf>,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            docker: docker.into(),
            manifest: manifest.into(),
            root: root.into(),
            tty: false,
        }
    }

    /// Allocate a TTY for interactive execs.
    pub fn with_tty(mut self, tty: bool) -> Self {
        self.tty = tty;
        self
    }

    pub fn manifest(&self) -> &Path {
        &self.manifest
    }

    /// `docker compose ps -q <service>`, always captured.
    pub fn ps(&self, service: &str) -> io::Result<ProcessOutput> {
        self.dispatch(ps_args(&self.manifest, service), CaptureMode::Captured, false)
    }

    /// `docker compose up --build -d` for every service in the manifest.
    pub fn up(&self, capture: CaptureMode) -> io::Result<ProcessOutput> {
        self.dispatch(up_args(&self.manifest), capture, false)
    }

    /// `docker compose down` for every service in the manifest.
    pub fn down(&self, capture: CaptureMode) -> io::Result<ProcessOutput> {
        self.dispatch(down_args(&self.manifest), capture, false)
    }

    pub fn exec(
        &self,
        container: &Container,
        request: &ExecRequest<'_>,
    ) -> io::Result<ProcessOutput> {
        let (capture, interactive) = match request.mode {
            ExecMode::Interactive => (CaptureMode::Inherited, true),
            ExecMode::Batch(capture) => (capture, false),
        };
        let args = exec_args(container, request, interactive && self.tty);
        self.dispatch(args, capture, interactive)
    }

    fn dispatch(
        &self,
        args: Vec<String>,
        capture: CaptureMode,
        interactive: bool,
    ) -> io::Result<ProcessOutput> {
        self.runner.run(&Invocation {
            program: self.docker.clone(),
            args,
            cwd: Some(self.root.clone()),
            capture,
            interactive,
        })
    }
}

fn compose_args(manifest: &Path) -> Vec<String> {
    vec![
        "compose".into(),
        "-f".into(),
        manifest.display().to_string(),
    ]
}

pub fn ps_args(manifest: &Path, service: &str) -> Vec<String> {
    let mut args = compose_args(manifest);
    args.extend(["ps".into(), "-q".into(), service.to_string()]);
    args
}

pub fn up_args(manifest: &Path) -> Vec<String> {
    let mut args = compose_args(manifest);
    args.extend(["up".into(), "--build".into(), "-d".into()]);
    args
}

pub fn down_args(manifest: &Path) -> Vec<String> {
    let mut args = compose_args(manifest);
    args.push("down".into());
    args
}

/// Build `docker exec` arguments. The command is passed as discrete words
/// after the container id, never through a shell.
pub fn exec_args(container: &Container, request: &ExecRequest<'_>, tty: bool) -> Vec<String> {
    let mut args = vec!["exec".to_string()];
    if request.mode == ExecMode::Interactive {
        args.push("-i".into());
        if tty {
            args.push("-t".into());
        }
    }
    if let Some(dir) = request.workdir {
        args.extend(["-w".into(), dir.to_string()]);
    }
    for (key, value) in request.env {
        args.extend(["-e".into(), format!("{key}={value}")]);
    }
    args.push(container.id().to_string());
    args.extend(request.command.args().iter().cloned());
    args
}

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{self, Color, PrintStyledContent, Stylize};

use crate::controller::{ControllerEvent, ControllerState, Outcome, Reporter};

pub const WIDTH: usize = 80;

// Colours
const COLOR_PASS: Color = Color::Green;
const COLOR_FAIL: Color = Color::Red;
const COLOR_WARN: Color = Color::Yellow;
const COLOR_STAGE: Color = Color::Blue;

/// Renders controller events and status lines to a terminal stream.
pub struct Console<W: Write> {
    out: W,
}

impl Console<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Bold heading framed by rules.
    pub fn banner(&mut self, title: &str, color: Color) {
        self.rule();
        self.line(title, color, true);
        self.rule();
    }

    pub fn rule(&mut self) {
        self.line(&"─".repeat(WIDTH), Color::DarkGrey, false);
    }

    pub fn stage(&mut self, msg: &str) {
        self.line(msg, COLOR_STAGE, false);
    }

    pub fn success(&mut self, msg: &str) {
        self.line(msg, COLOR_PASS, false);
    }

    pub fn warning(&mut self, msg: &str) {
        self.line(msg, COLOR_WARN, false);
    }

    pub fn error(&mut self, msg: &str) {
        self.line(msg, COLOR_FAIL, false);
    }

    /// Captured process output, dimmed.
    pub fn log(&mut self, text: &str) {
        for l in text.lines() {
            self.line(l, Color::DarkGrey, false);
        }
    }

    fn line(&mut self, text: &str, color: Color, bold: bool) {
        let mut styled = style::style(text).with(color);
        if bold {
            styled = styled.bold();
        }
        // Output errors (closed pipe) are not worth aborting a run for.
        let _ = queue!(self.out, PrintStyledContent(styled));
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}

impl<W: Write> Reporter for Console<W> {
    fn report(&mut self, event: &ControllerEvent) {
        match event {
            ControllerEvent::StateChanged { to, .. } => match to {
                ControllerState::Starting => self.stage("Building and starting containers..."),
                ControllerState::TearingDown => self.stage("Tearing down containers..."),
                _ => {}
            },
            ControllerEvent::CheckStarted { name } => {
                self.stage(&format!("Running `{name}`..."));
            }
            ControllerEvent::CheckFinished(result) => match result.outcome {
                Outcome::Pass => self.success("Pass."),
                Outcome::Warn => self.warning("Warning."),
                Outcome::Fail => self.error("Failed."),
            },
            ControllerEvent::ChecksCompleted(_) => {}
        }
    }
}

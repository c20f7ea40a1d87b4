use std::cell::{Ref, RefCell};
use std::collections::VecDeque;
use std::io;

use super::run::ProcessRunner;
use super::types::{Invocation, ProcessOutput};

/// Replays queued responses in order and records every invocation.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: RefCell<VecDeque<io::Result<ProcessOutput>>>,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn respond(self, output: ProcessOutput) -> Self {
        self.responses.borrow_mut().push_back(Ok(output));
        self
    }

    pub fn fail(self, kind: io::ErrorKind) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Err(io::Error::new(kind, "scripted failure")));
        self
    }

    pub fn calls(&self) -> Ref<'_, Vec<Invocation>> {
        self.calls.borrow()
    }

    /// Number of invocations whose arguments contain `verb`.
    pub fn calls_with(&self, verb: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.args.iter().any(|a| a == verb))
            .count()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        self.calls.borrow_mut().push(invocation.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .expect("unexpected invocation")
    }
}

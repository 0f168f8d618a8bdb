#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bloat_core::cache::ToolCache;
use bloat_core::config::ToolConfig;
use bloat_core::model::{ClassifiedUnit, UnitId};
use bloat_core::classify::classify_dump;
use bloat_core::tools::{Invocation, ToolError, ToolRunner, Toolchain};

/// Serves canned tool output keyed by the invocation's input path and records
/// every command line it is asked to run.
#[derive(Default)]
pub struct FakeRunner {
    outputs: HashMap<PathBuf, String>,
    failures: HashMap<PathBuf, i32>,
    calls: RefCell<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, input: impl AsRef<Path>, output: &str) -> Self {
        self.outputs.insert(input.as_ref().to_path_buf(), output.to_string());
        self
    }

    pub fn with_failure(mut self, input: impl AsRef<Path>, code: i32) -> Self {
        self.failures.insert(input.as_ref().to_path_buf(), code);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl ToolRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> Result<String, ToolError> {
        self.calls.borrow_mut().push(invocation.signature());
        if let Some(code) = self.failures.get(&invocation.input) {
            return Err(ToolError::Failed {
                command: invocation.signature(),
                status: format!("exit status: {code}"),
                code: Some(*code),
                stdout: "partial output".to_string(),
                stderr: format!("cannot read {}", invocation.input.display()),
            });
        }
        self.outputs.get(&invocation.input).cloned().ok_or_else(|| ToolError::Failed {
            command: invocation.signature(),
            status: "exit status: 1".to_string(),
            code: Some(1),
            stdout: String::new(),
            stderr: "no canned output".to_string(),
        })
    }
}

pub fn toolchain(runner: FakeRunner) -> Toolchain<FakeRunner> {
    Toolchain::new(runner, ToolConfig::default(), ToolCache::in_memory())
}

/// Classify a unit straight from dump text.
pub fn unit(name: &str, dump: &str) -> ClassifiedUnit {
    let id = UnitId::new(name);
    let classification = classify_dump(&id, dump);
    ClassifiedUnit { id, classification }
}

//! External collaborators: the symbol-dump tool (`llvm-nm`) and the
//! size-report tool (`bloaty`).
//!
//! Every invocation goes through a [`Toolchain`], which owns the runner, the
//! tool configuration and the run-scoped output cache. The [`ToolRunner`] trait
//! is the seam tests use to serve canned output instead of spawning processes.

mod runner;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::cache::ToolCache;
use crate::config::ToolConfig;
use crate::BloatError;

pub use runner::CommandRunner;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "Command failed ({status}):\n{command}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}"
    )]
    Failed { command: String, status: String, code: Option<i32>, stdout: String, stderr: String },
}

impl ToolError {
    /// Exit code of the failed tool, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ToolError::Failed { code, .. } => *code,
            ToolError::Spawn { .. } => None,
        }
    }
}

/// A fully specified external tool command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// The file the tool reads; its contents guard persisted cache entries.
    pub input: PathBuf,
}

impl Invocation {
    /// `llvm-nm <unit>`
    pub fn symbol_dump(nm: &Path, unit: &Path) -> Self {
        Self { program: nm.to_path_buf(), args: vec![unit.into()], input: unit.to_path_buf() }
    }

    /// `bloaty -d symbols -n 0 --demangle=none --csv <artifact>`
    pub fn size_report(bloaty: &Path, artifact: &Path) -> Self {
        let mut args: Vec<OsString> = ["-d", "symbols", "-n", "0", "--demangle=none", "--csv"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(artifact.into());
        Self { program: bloaty.to_path_buf(), args, input: artifact.to_path_buf() }
    }

    /// The exact command line, used as the cache key and in error messages.
    pub fn signature(&self) -> String {
        let mut signature = self.program.display().to_string();
        for arg in &self.args {
            signature.push(' ');
            signature.push_str(&arg.to_string_lossy());
        }
        signature
    }
}

/// Runs one invocation and returns its captured standard output.
pub trait ToolRunner {
    fn run(&self, invocation: &Invocation) -> Result<String, ToolError>;
}

/// Issues tool invocations for one run, memoizing outputs by signature.
pub struct Toolchain<R: ToolRunner = CommandRunner> {
    runner: R,
    config: ToolConfig,
    cache: ToolCache,
}

impl<R: ToolRunner> Toolchain<R> {
    pub fn new(runner: R, config: ToolConfig, cache: ToolCache) -> Self {
        Self { runner, config, cache }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn cache(&self) -> &ToolCache {
        &self.cache
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Symbol listing of one analysis unit.
    pub fn symbol_dump(&mut self, unit: &Path) -> Result<String, BloatError> {
        let invocation = Invocation::symbol_dump(&self.config.nm, unit);
        self.invoke(&invocation)
    }

    /// Per-symbol size breakdown of the linked artifact.
    pub fn size_report(&mut self, artifact: &Path) -> Result<String, BloatError> {
        let invocation = Invocation::size_report(&self.config.bloaty, artifact);
        self.invoke(&invocation)
    }

    /// Run `invocation`, or return its output from the cache.
    pub fn invoke(&mut self, invocation: &Invocation) -> Result<String, BloatError> {
        if let Some(output) = self.cache.get(invocation)? {
            debug!(command = %invocation.signature(), "tool output cache hit");
            return Ok(output);
        }
        debug!(command = %invocation.signature(), "running tool");
        let output = self.runner.run(invocation)?;
        self.cache.put(invocation, &output)?;
        Ok(output)
    }
}

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use bloat_core::tools::ToolError;
use bloat_core::BloatError;
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber.
///
/// Warnings are always shown; `verbose` raises the level to debug. `RUST_LOG`
/// is honored either way.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Split positional arguments into analysis units and the trailing linked artifact.
pub fn split_inputs(paths: &[PathBuf]) -> Result<(&[PathBuf], &Path)> {
    match paths.split_last() {
        Some((artifact, units)) if !units.is_empty() => Ok((units, artifact.as_path())),
        _ => Err(anyhow!(
            "Expected at least one object/archive followed by the linked artifact, got {} path(s)",
            paths.len()
        )),
    }
}

/// Process exit code for a fatal error.
///
/// A failed external tool propagates its own exit code; everything else is 1.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| {
            cause.downcast_ref::<ToolError>().or_else(|| match cause.downcast_ref::<BloatError>() {
                Some(BloatError::Tool(tool)) => Some(tool),
                _ => None,
            })
        })
        .and_then(ToolError::exit_code)
        .filter(|code| *code != 0)
        .unwrap_or(1)
}

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use bloat_core::cache::{DiskCache, ToolCache};
use bloat_core::config::ToolConfig;
use bloat_core::report::render_report;
use bloat_core::tools::{CommandRunner, ToolRunner, Toolchain};

/// Analyze `units` against `artifact` and print the report to stdout.
pub fn report_command(units: &[PathBuf], artifact: &Path) -> Result<()> {
    let config = ToolConfig::from_env().context("Failed to load tool configuration")?;
    let mut toolchain = open_toolchain(CommandRunner, config)?;
    let report = build_report(&mut toolchain, units, artifact)?;
    print!("{report}");
    Ok(())
}

/// Build a toolchain whose cache is persisted when the config names a cache database.
pub fn open_toolchain<R: ToolRunner>(runner: R, config: ToolConfig) -> Result<Toolchain<R>> {
    let cache = match &config.cache_db {
        Some(path) => {
            let disk = DiskCache::open(path)
                .with_context(|| format!("Failed to open tool cache at {}", path.display()))?;
            ToolCache::with_disk(disk)
        }
        None => ToolCache::in_memory(),
    };
    Ok(Toolchain::new(runner, config, cache))
}

/// Run the full analysis and render the report text.
pub fn build_report<R: ToolRunner>(
    toolchain: &mut Toolchain<R>,
    units: &[PathBuf],
    artifact: &Path,
) -> Result<String> {
    for path in units.iter().map(PathBuf::as_path).chain(std::iter::once(artifact)) {
        if !path.is_file() {
            return Err(anyhow!("Input file does not exist: {}", path.display()));
        }
    }

    let report = bloat_core::analyze(toolchain, units, artifact).with_context(|| {
        format!("Failed to attribute sizes of {} to {} unit(s)", artifact.display(), units.len())
    })?;
    Ok(render_report(&report))
}

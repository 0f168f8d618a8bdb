use std::path::PathBuf;

use bloat_core::config::ToolConfig;
use bloat_core::tools::{CommandRunner, ToolError};
use bloat_core::BloatError;
use lib_bloat::{build_report, exit_code, open_toolchain, split_inputs};
use tempfile::tempdir;

#[test]
fn split_inputs_takes_the_last_path_as_the_artifact() {
    let paths: Vec<PathBuf> =
        ["liba.a", "libb.a", "app.wasm"].into_iter().map(PathBuf::from).collect();
    let (units, artifact) = split_inputs(&paths).unwrap();
    assert_eq!(units, &paths[..2]);
    assert_eq!(artifact, PathBuf::from("app.wasm").as_path());
}

#[test]
fn split_inputs_requires_a_unit_and_an_artifact() {
    let err = split_inputs(&[PathBuf::from("app.wasm")]).unwrap_err();
    assert!(err.to_string().contains("at least one object/archive"), "unexpected error: {err}");
    assert!(split_inputs(&[]).is_err());
}

#[test]
fn exit_code_propagates_tool_exit_status() {
    let tool = ToolError::Failed {
        command: "llvm-nm bad.o".into(),
        status: "exit status: 7".into(),
        code: Some(7),
        stdout: String::new(),
        stderr: "bad".into(),
    };
    let err = anyhow::Error::new(BloatError::from(tool)).context("Failed to attribute sizes");
    assert_eq!(exit_code(&err), 7);
}

#[test]
fn exit_code_defaults_to_one() {
    assert_eq!(exit_code(&anyhow::anyhow!("malformed table")), 1);

    let killed = ToolError::Failed {
        command: "bloaty app.wasm".into(),
        status: "signal: 9 (SIGKILL)".into(),
        code: None,
        stdout: String::new(),
        stderr: String::new(),
    };
    assert_eq!(exit_code(&anyhow::Error::new(killed)), 1);
}

#[test]
fn build_report_rejects_missing_inputs_before_running_tools() {
    let dir = tempdir().unwrap();
    let unit = dir.path().join("missing.a");
    let artifact = dir.path().join("app.wasm");
    std::fs::write(&artifact, b"wasm").unwrap();

    let mut toolchain = open_toolchain(CommandRunner, ToolConfig::default()).unwrap();
    let err = build_report(&mut toolchain, &[unit], &artifact).unwrap_err();
    assert!(err.to_string().contains("Input file does not exist"), "unexpected error: {err}");
    assert_eq!(toolchain.cache().len(), 0);
}

#[test]
fn open_toolchain_creates_the_configured_cache_database() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("tool-cache.db");
    let config = ToolConfig { cache_db: Some(db.clone()), ..ToolConfig::default() };
    let toolchain = open_toolchain(CommandRunner, config).unwrap();
    assert!(toolchain.cache().disk().is_some());
    assert!(db.exists());
}

#[test]
fn open_toolchain_reports_unopenable_cache() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("no-such-dir").join("tool-cache.db");
    let config = ToolConfig { cache_db: Some(db), ..ToolConfig::default() };
    let err = open_toolchain(CommandRunner, config).err().expect("cache open should fail");
    assert!(err.to_string().contains("Failed to open tool cache"), "unexpected error: {err}");
}

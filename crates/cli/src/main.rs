use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use lib_bloat::{exit_code, init_tracing, report_command, split_inputs};

/// Attribute the size of a linked binary to the libraries and objects that built it.
///
/// For reliable results the linked artifact needs a name section with mangled
/// names: link with `-g` or `--profiling-funcs`, and with `-Wl,--no-demangle`.
#[derive(Parser, Debug)]
#[command(
    name = "lib-bloat",
    version,
    about = "Attribute linked-binary size to contributing libraries",
    long_about = None
)]
struct Cli {
    /// Object files or archives to analyze, followed by the linked artifact.
    #[arg(value_name = "PATH", num_args = 2.., required = true)]
    paths: Vec<PathBuf>,

    /// Log tool invocations, cache hits and per-unit symbol counts to stderr.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(&cli) {
        eprintln!("Error: {err:?}");
        std::process::exit(exit_code(&err));
    }
}

fn run(cli: &Cli) -> Result<()> {
    let (units, artifact) = split_inputs(&cli.paths)?;
    report_command(units, artifact)
}

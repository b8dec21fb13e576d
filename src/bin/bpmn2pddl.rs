//! CLI entry point: parses a BPMN file and writes a PDDL domain plus
//! problem files to disk (§6).

use bpmn2pddl::translate;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Translate a BPMN 2.0 process diagram into PDDL planning files.
#[derive(Parser)]
#[command(name = "bpmn2pddl")]
#[command(about = "Translate a BPMN 2.0 diagram into a PDDL domain and problems")]
struct Cli {
    /// Path to the input BPMN XML file.
    input: PathBuf,

    /// Name of the generated PDDL domain (defaults to the input file's stem).
    #[arg(long)]
    domain_name: Option<String>,

    /// Raise log verbosity (equivalent to RUST_LOG=debug).
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut builder = pretty_env_logger::formatted_builder();
    builder.parse_default_env();
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    let domain_name = cli.domain_name.unwrap_or_else(|| {
        cli.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "domain".to_string())
    });

    match translate::translate(&cli.input, &domain_name) {
        Ok(output) => {
            println!("wrote PDDL domain to {}", output.domain_path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("bpmn2pddl: {err}");
            ExitCode::FAILURE
        }
    }
}

//! Heft CLI - Loot filter generation
//!
//! Reads the selected fragment folders, writes one filter file.
//! Prints a JSON summary to stdout; logs go to stderr.
//! Returns non-zero when input is malformed or the file cannot be written.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use heft_core::{CompilationPipeline, DirectorySource, Selection};

#[derive(Parser)]
#[command(name = "heft-cli")]
#[command(about = "Heft CLI - generation of a loot filter")]
struct Cli {
    /// Base directory holding configs/, strictness/, conditions/, themes/ and styles/
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Name of the configuration folder
    #[arg(long, default_value = "hestalon")]
    config: String,

    /// Name of the strictness folder
    #[arg(long, default_value = "regular")]
    strictness: String,

    /// Name of the condition folder
    #[arg(long, default_value = "hestalon")]
    condition: String,

    /// Name of the style file
    #[arg(long, default_value = "hestalon")]
    style: String,

    /// Name of the theme folder
    #[arg(long, default_value = "hestalon")]
    theme: String,

    /// Output folder, relative to the root
    #[arg(long, default_value = "dist")]
    output_dir: PathBuf,

    /// Output file name
    #[arg(long, default_value = "hestalon.filter")]
    output_name: String,

    /// Print the rendered filter to stdout instead of the JSON summary
    #[arg(long)]
    print: bool,
}

impl From<&Cli> for Selection {
    fn from(cli: &Cli) -> Self {
        Selection {
            root: cli.root.clone(),
            config: cli.config.clone(),
            strictness: cli.strictness.clone(),
            condition: cli.condition.clone(),
            style: cli.style.clone(),
            theme: cli.theme.clone(),
            output_dir: cli.output_dir.clone(),
            output_name: cli.output_name.clone(),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let selection = Selection::from(&cli);

    let compiled = match CompilationPipeline::run(&DirectorySource, &selection) {
        Ok(compiled) => compiled,
        Err(e) => {
            tracing::error!(error = %e, "run aborted, no file produced");
            return ExitCode::FAILURE;
        }
    };

    if cli.print {
        match std::fs::read_to_string(&compiled.path) {
            Ok(text) => print!("{}", text),
            Err(e) => tracing::warn!(error = %e, "could not read back the written filter"),
        }
        return ExitCode::SUCCESS;
    }

    match serde_json::to_string_pretty(&compiled) {
        Ok(summary) => println!("{}", summary),
        Err(e) => tracing::warn!(error = %e, "could not serialize run summary"),
    }
    ExitCode::SUCCESS
}

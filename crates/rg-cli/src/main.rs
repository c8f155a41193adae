use std::path::PathBuf;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};

use rg_cli::cmd_run::{self, RunArgs};
use rg_cli::cmd_validate::{self, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "rulegraph", about = "Declarative rule-graph engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Type-check every expression of a rule file without running it
    Validate {
        /// Path to the .yaml/.yml/.json rule file
        rule_file: Option<PathBuf>,

        /// Comma-separated list of TOML files declaring input types
        types: Option<String>,
    },

    /// Run a rule file against one set of inputs
    Run {
        /// Path to the .yaml/.yml/.json rule file
        rule_file: PathBuf,

        /// Inputs as a JSON object; each top-level key becomes a binding
        #[arg(short, long)]
        input: String,

        /// Run level by level with concurrent rule tasks
        #[arg(long)]
        concurrent: bool,

        /// Task limit per level (0 = available parallelism)
        #[arg(long)]
        max_concurrency: Option<usize>,

        /// Path to rulegraph.toml config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Exit code 2 is reserved for rule files that fail to parse.
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => EXIT_USAGE,
            };
            e.print()?;
            std::process::exit(code);
        }
    };

    match cli.command {
        Commands::Validate { rule_file, types } => {
            cmd_validate::run(rule_file, types);
        }

        Commands::Run {
            rule_file,
            input,
            concurrent,
            max_concurrency,
            config,
        } => {
            let code = cmd_run::run(RunArgs {
                rule_file,
                input,
                concurrent,
                max_concurrency,
                config,
            })?;
            if code != 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}

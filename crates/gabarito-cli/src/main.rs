//! gabarito CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "gabarito", version, about = "Grader for Gab answer-key exams")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a class against a Gab document
    Grade {
        /// Path to the .gab answer-key file
        #[arg(long)]
        gab: PathBuf,

        /// Class roster JSON
        #[arg(long)]
        roster: PathBuf,

        /// Exported response rows JSON
        #[arg(long)]
        responses: PathBuf,

        /// Addendum file(s), applied in order
        #[arg(long = "addendum")]
        addenda: Vec<PathBuf>,

        /// Penalty divisor override (0 disables the penalty)
        #[arg(long)]
        penalty: Option<i32>,

        /// Output directory for the grade sheet
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, markdown, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Inspect a Gab document: header, keys, and optionally every test
    Inspect {
        /// Path to the .gab answer-key file
        #[arg(long)]
        gab: PathBuf,

        /// Addendum file(s) to apply before showing the keys
        #[arg(long = "addendum")]
        addenda: Vec<PathBuf>,

        /// Also list every test in the document
        #[arg(long)]
        show_tests: bool,
    },

    /// Check that addendum files apply cleanly to a Gab document
    CheckAddendum {
        /// Path to the .gab answer-key file
        #[arg(long)]
        gab: PathBuf,

        /// Addendum file(s), applied in order
        #[arg(required = true)]
        addenda: Vec<PathBuf>,
    },

    /// Create a starter config and sample input files
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gabarito=info".parse().expect("static directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            gab,
            roster,
            responses,
            addenda,
            penalty,
            output,
            format,
            config,
        } => commands::grade::execute(
            gab, roster, responses, addenda, penalty, output, format, config,
        ),
        Commands::Inspect {
            gab,
            addenda,
            show_tests,
        } => commands::inspect::execute(gab, addenda, show_tests),
        Commands::CheckAddendum { gab, addenda } => {
            commands::check_addendum::execute(gab, addenda)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

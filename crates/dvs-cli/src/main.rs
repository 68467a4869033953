use std::process;

use clap::{ArgAction, Parser, Subcommand};

mod commands;

/// dvs: Development tool for DTM-prefixed records.
///
/// Inspect versioned records and produce DTM prefixes from the command line.
#[derive(Parser)]
#[command(name = "dvs", version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the DTM and payload of an encoded record.
    Inspect {
        /// Record bytes as hex. Whitespace is ignored.
        hex: Option<String>,

        /// Read the raw record from a file instead.
        #[arg(short, long, conflicts_with = "hex")]
        file: Option<String>,

        /// Number of DTMs the reading registry holds; larger DTMs are
        /// reported as unknown.
        #[arg(long)]
        known: Option<usize>,
    },

    /// Print the encoded prefix for a DTM as hex.
    EncodeDtm {
        /// The data type marker.
        #[arg(allow_negative_numbers = true)]
        dtm: i64,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Inspect { hex, file, known } => {
            commands::inspect(hex.as_deref(), file.as_deref(), known)
        }
        Commands::EncodeDtm { dtm } => commands::encode_dtm(dtm),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

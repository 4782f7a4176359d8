use clap::{Parser, Subcommand};
use exd_sheets::cli;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "exd-sheets")]
#[command(about = "Inspect spreadsheet files as groups and typed channels.")]
#[command(long_about = "exd-sheets - spreadsheet files as groups and typed channels

Every sheet is a group. The first row names the columns; the rows between
it and the first stable data row may carry units and descriptions.

COMMANDS:
  structure - Show groups, channels, types, units and descriptions
  values    - Dump typed values of selected channels

EXAMPLES:
  exd-sheets structure measurement.xlsx
  exd-sheets structure measurement.xlsx --json
  exd-sheets values measurement.xlsx --group 0 --channels 0,2 --start 10 --limit 5")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the group/channel hierarchy of a file
    Structure {
        /// Path or file:// URL of the spreadsheet
        file: PathBuf,

        /// Print JSON instead of the human-readable listing
        #[arg(long)]
        json: bool,
    },

    /// Print typed values of channels in one group
    Values {
        /// Path or file:// URL of the spreadsheet
        file: PathBuf,

        /// Group (sheet) index
        #[arg(short, long, default_value = "0")]
        group: i64,

        /// Channel (column) indices, comma-separated; all channels when omitted
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        channels: Vec<i64>,

        /// First data row to return
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        start: i64,

        /// Maximum number of rows to return
        #[arg(short, long, default_value = "1000", allow_negative_numbers = true)]
        limit: i64,

        /// Print JSON instead of the human-readable listing
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exd_sheets=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Structure { file, json } => cli::structure(file, json)?,

        Commands::Values {
            file,
            group,
            channels,
            start,
            limit,
            json,
        } => cli::values(file, group, channels, start, limit, json)?,
    }

    Ok(())
}

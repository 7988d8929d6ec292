use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jma-processor")]
#[command(about = "Daily temperature extractor for JMA historical station tables")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Configuration file [default: ./jma-processor.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one month of daily temperatures for a station
    Fetch {
        #[arg(short, long, help = "Station key or label (see `stations`)")]
        station: String,

        #[arg(short, long)]
        year: i32,

        #[arg(short, long)]
        month: u32,

        #[arg(long, default_value = "true", action = ArgAction::Set, help = "Classify rain/snow days")]
        precipitation: bool,

        #[arg(
            short,
            long,
            help = "Output file path [default: {output_dir}/{station}_temp_{year}_{month}.{format}]"
        )]
        output_file: Option<PathBuf>,

        #[arg(short, long, default_value = "csv", help = "csv, parquet or json")]
        format: String,

        #[arg(short, long, help = "Parquet compression [default: from config]")]
        compression: Option<String>,

        #[arg(long, default_value = "false")]
        validate_only: bool,
    },

    /// Fetch a range of months and combine them into one dataset
    Range {
        #[arg(short, long, help = "Station key or label (see `stations`)")]
        station: String,

        #[arg(long, help = "First month, YYYY-MM")]
        from: String,

        #[arg(long, help = "Last month, YYYY-MM")]
        to: String,

        #[arg(long, default_value = "true", action = ArgAction::Set, help = "Classify rain/snow days")]
        precipitation: bool,

        #[arg(long, help = "Requests in flight [default: from config]")]
        max_concurrent: Option<usize>,

        #[arg(
            short,
            long,
            help = "Output file path [default: {output_dir}/{station}_temp_{from}_{to}.{format}]"
        )]
        output_file: Option<PathBuf>,

        #[arg(short, long, default_value = "parquet", help = "csv, parquet or json")]
        format: String,

        #[arg(short, long, help = "Parquet compression [default: from config]")]
        compression: Option<String>,

        #[arg(long, default_value = "false")]
        validate_only: bool,
    },

    /// Extract records from a saved daily-table page without network access
    Extract {
        #[arg(short, long, help = "Saved HTML page")]
        input_html: PathBuf,

        #[arg(short, long, help = "Station key or label (see `stations`)")]
        station: String,

        #[arg(short, long)]
        year: i32,

        #[arg(short, long)]
        month: u32,

        #[arg(long, default_value = "true", action = ArgAction::Set, help = "Classify rain/snow days")]
        precipitation: bool,

        #[arg(short, long, help = "Output file path [default: print CSV to stdout]")]
        output_file: Option<PathBuf>,

        #[arg(short, long, default_value = "csv", help = "csv, parquet or json")]
        format: String,
    },

    /// List the known stations
    Stations,

    /// Display information about a Parquet file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}

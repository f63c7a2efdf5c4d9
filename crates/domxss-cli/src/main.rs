//! domxss CLI - Command-line interface for the domxss passive scanner
//!
//! Greps saved HTTP responses for inline scripts that pass browser-controlled
//! values to dangerous JavaScript calls.

mod commands;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;
use commands::Commands;
use logging::LogLevel;

#[derive(Parser, Debug)]
#[command(
    name = "domxss",
    author,
    version,
    about = "Passive DOM XSS detector for saved HTTP responses",
    long_about = "domxss greps HTML pages for DOM based cross site scripting risks.\n\n\
                  It reports inline scripts that hand document.URL, document.referrer,\n\
                  window.location and similar values to document.write, eval,\n\
                  window.open and other dangerous calls."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        value_enum,
        global = true,
        default_value = "warn",
        help = "Set the log level"
    )]
    pub log_level: LogLevel,

    #[arg(long, global = true, help = "Write logs to the specified file")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Output logs in JSON format")]
    pub log_json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init_logging(&cli);

    match cli.command {
        Commands::Check(args) => args.run(),
        Commands::Init(args) => args.run(),
        Commands::Patterns(args) => args.run(),
    }
}

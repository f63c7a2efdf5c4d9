//! CLI command implementations

pub mod check;
pub mod init;
pub mod patterns;

pub use check::CheckArgs;
pub use init::InitArgs;
pub use patterns::PatternsArgs;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Grep saved pages for DOM XSS risks
    Check(CheckArgs),

    /// Initialize domxss configuration in current directory
    Init(InitArgs),

    /// Show the sink and source patterns in effect
    Patterns(PatternsArgs),
}

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(name = "aze-price", version)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the ingestion loop, daily retention and the REST API (default)
    Serve,
    /// Delete observations past the retention horizon once, then exit
    Cleanup,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}

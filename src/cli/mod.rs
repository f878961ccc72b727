//! CLI module for autowire.
//!
//! Subcommands:
//! - `check`: Apply a wiring file to an empty injector and print the result

mod check;

use clap::{Parser, Subcommand};

pub use check::CheckCommand;

/// Autowire - inversion-of-control container
#[derive(Parser)]
#[command(name = "autowire")]
#[command(about = "Inversion-of-control container - wiring checker")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a wiring file and print the resulting configuration
    Check(CheckCommand),
}

impl App {
    /// Run the CLI application.
    pub fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Check(cmd) => cmd.run(),
        }
    }
}

use std::path::{Path, PathBuf};

mod config;
mod plan;
mod status;
mod terminal;

use clap::ArgAction;
use plan::Plan;
use status::Status;

/// Default location of the configuration file, relative to the working
/// directory.
const DEFAULT_CONFIG_PATH: &str = "opt-planner.toml";

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Plan(Plan::default()))
            .run(&self.config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Compute OPT filing windows and countdowns (default)
    ///
    /// Prompts for the graduation date when it is not given and the
    /// terminal is interactive.
    Plan(Plan),

    /// Check the status of a filed case
    ///
    /// Validates the receipt number and points to the official USCIS
    /// case-status website. No request is made to USCIS.
    Status(Status),

    /// Show or modify configuration settings
    Config(config::Command),
}

impl Command {
    fn run(self, config_path: &Path) -> anyhow::Result<()> {
        match self {
            Self::Plan(command) => command.run(config_path)?,
            Self::Status(command) => command.run()?,
            Self::Config(command) => command.run(config_path)?,
        }
        Ok(())
    }
}

use std::path::Path;

use opt_planner::{Config, StemDurationConvention};
use tracing::instrument;

use super::terminal::Colorize;

const KEYS: &str = "stem_duration\n  warning_days";

#[derive(Debug, clap::Parser)]
/// Show or modify configuration
///
/// Configuration is stored in opt-planner.toml (see --config).
///
/// Available configuration keys:
///   `stem_duration`  How STEM OPT duration is reported: extension (24 months,
///                    default) or total (36 months)
///   `warning_days`   Countdowns at or below this are highlighted (default: 30)
pub struct Command {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show all configuration values
    Show,

    /// Write a configuration file with default values
    Init,

    /// Get a specific configuration value
    Get {
        /// Configuration key to retrieve
        key: String,
    },

    /// Set a configuration value
    ///
    /// Examples:
    ///   opt config set `stem_duration` total
    ///   opt config set `warning_days` 14
    Set {
        /// Configuration key to set
        key: String,

        /// Value to set
        value: String,
    },
}

impl Command {
    #[instrument]
    pub fn run(self, config_path: &Path) -> anyhow::Result<()> {
        match self.command {
            ConfigCommand::Show => Self::show_config(config_path),
            ConfigCommand::Init => Self::init_config(config_path),
            ConfigCommand::Get { key } => Self::get_config(config_path, &key),
            ConfigCommand::Set { key, value } => Self::set_config(config_path, &key, &value),
        }
    }

    fn load(config_path: &Path) -> anyhow::Result<Config> {
        Config::load_or_default(config_path).map_err(|e| anyhow::anyhow!("{e}"))
    }

    fn show_config(config_path: &Path) -> anyhow::Result<()> {
        let config = Self::load(config_path)?;

        println!("Configuration:");
        println!(
            "  stem_duration: {} ({})",
            config.stem_duration,
            format!("{} months for STEM", config.stem_duration.months()).dim()
        );
        println!("  warning_days: {}", config.warning_days());
        if !config_path.exists() {
            println!(
                "{}",
                format!("(defaults; {} does not exist)", config_path.display()).dim()
            );
        }
        Ok(())
    }

    fn init_config(config_path: &Path) -> anyhow::Result<()> {
        if config_path.exists() {
            anyhow::bail!(
                "Configuration already exists at {}",
                config_path.display()
            );
        }

        Config::default()
            .save(config_path)
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        println!("{}", format!("Created {}", config_path.display()).success());
        Ok(())
    }

    fn get_config(config_path: &Path, key: &str) -> anyhow::Result<()> {
        let config = Self::load(config_path)?;

        match key {
            "stem_duration" => println!("{}", config.stem_duration),
            "warning_days" => println!("{}", config.warning_days()),
            _ => anyhow::bail!("Unknown configuration key: '{key}'\n\nAvailable keys:\n  {KEYS}"),
        }
        Ok(())
    }

    fn set_config(config_path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
        let mut config = Self::load(config_path)?;

        match key {
            "stem_duration" => {
                config.stem_duration = value
                    .parse::<StemDurationConvention>()
                    .map_err(|e| anyhow::anyhow!("{e}"))?;
            }
            "warning_days" => {
                let days = value
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| anyhow::anyhow!("Value must be a whole number of days"))?;
                config
                    .set_warning_days(days)
                    .map_err(|e| anyhow::anyhow!("{e}"))?;
            }
            _ => anyhow::bail!("Unknown configuration key: '{key}'\n\nAvailable keys:\n  {KEYS}"),
        }

        config
            .save(config_path)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        println!("{}", format!("Set {key} = {value}").success());
        Ok(())
    }
}

use clap::Parser;
use opt_planner::{
    CaseStatus, ReceiptNumber,
    domain::{ApiAvailability, CaseStatusHandoff},
};
use serde_json::json;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Point to the official case-status page for a receipt number")]
pub struct Status {
    /// USCIS receipt number, e.g. EAC9999103403 (dashes allowed)
    receipt: String,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Status {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let receipt: ReceiptNumber = match self.receipt.parse() {
            Ok(receipt) => receipt,
            Err(e) => {
                eprintln!("{}", e.to_string().danger());
                std::process::exit(1);
            }
        };

        let CaseStatusHandoff::Redirect { url, receipt } = CaseStatus::lookup(&receipt);
        let ApiAvailability::Unavailable { reason } = CaseStatus::api_availability();

        match self.output {
            OutputFormat::Json => {
                let output = json!({
                    "receipt": receipt,
                    "service_center": receipt.service_center(),
                    "url": url,
                    "api": CaseStatus::api_availability(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Pretty => {
                println!("Receipt number: {}", receipt.as_str().info());
                println!("Service center: {}", receipt.service_center());
                println!();
                println!("Check your case status at {}", url.success());
                println!("and enter the receipt number shown above.");
                println!("{}", format!("({reason})").dim());
            }
        }

        Ok(())
    }
}

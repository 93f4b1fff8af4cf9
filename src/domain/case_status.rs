use serde::Serialize;

use super::ReceiptNumber;

/// The official USCIS case-status website.
pub const CASE_STATUS_URL: &str = "https://egov.uscis.gov/";

/// Whether case status can be fetched programmatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ApiAvailability {
    /// No client-credential flow is available to this tool.
    Unavailable {
        /// Why the lookup cannot be performed here.
        reason: &'static str,
    },
}

/// What the user should do to see the status of their case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CaseStatusHandoff {
    /// Open the official website and enter the receipt number there.
    Redirect {
        /// Page to open.
        url: &'static str,
        /// Normalised receipt number to enter on that page.
        receipt: ReceiptNumber,
    },
}

/// Case-status lookups, delegated to the official website.
///
/// This type never contacts USCIS. Status lookups are handed off to the
/// official case-status page, where the user enters the receipt number.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseStatus;

impl CaseStatus {
    /// Reports that programmatic lookup is not available.
    #[must_use]
    pub const fn api_availability() -> ApiAvailability {
        ApiAvailability::Unavailable {
            reason: "USCIS offers no public client-credential API for case status",
        }
    }

    /// Produces the hand-off for checking `receipt`.
    #[must_use]
    pub fn lookup(receipt: &ReceiptNumber) -> CaseStatusHandoff {
        tracing::debug!(%receipt, "handing case-status lookup off to {CASE_STATUS_URL}");
        CaseStatusHandoff::Redirect {
            url: CASE_STATUS_URL,
            receipt: receipt.clone(),
        }
    }
}

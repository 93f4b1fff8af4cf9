use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Serialize, Serializer};

static RECEIPT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}[0-9]{10}$").expect("receipt pattern is valid"));

/// A USCIS receipt number.
///
/// Format: three letters identifying the service center followed by ten
/// digits, e.g. `EAC9999103403`. Parsing is case-insensitive and ignores
/// dashes, so `eac-99-991-03403` is accepted and normalised.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReceiptNumber(String);

impl ReceiptNumber {
    /// The normalised receipt number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The three-letter service center code, e.g. `EAC` or `LIN`.
    #[must_use]
    pub fn service_center(&self) -> &str {
        &self.0[..3]
    }

    /// The ten-digit case number following the service center code.
    #[must_use]
    pub fn case_number(&self) -> &str {
        &self.0[3..]
    }
}

/// Errors that can occur when parsing a receipt number.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// No receipt number was given.
    #[error("Receipt number is required")]
    Empty,

    /// The receipt number does not have the expected shape.
    #[error("Invalid receipt number '{0}': expected three letters followed by ten digits")]
    Format(String),
}

impl FromStr for ReceiptNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::Empty);
        }

        let normalised: String = trimmed
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if RECEIPT_PATTERN.is_match(&normalised) {
            Ok(Self(normalised))
        } else {
            Err(Error::Format(trimmed.to_string()))
        }
    }
}

impl TryFrom<&str> for ReceiptNumber {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl AsRef<str> for ReceiptNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ReceiptNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

//! Domain models for OPT deadline planning.
//!
//! This module contains the timeline calculator together with the types that
//! sit at its boundary: input parsing, countdown rendering, receipt numbers,
//! and configuration.

/// Filing window and countdown calculation.
pub mod timeline;
pub use timeline::{
    DateWindow, StemDurationConvention, TimelineInput, TimelineResult, compute_timeline,
};

/// Parsing and validation of user-supplied dates.
pub mod input;
pub use input::Error as InputError;

/// Countdown classification and phrasing.
pub mod countdown;
pub use countdown::Countdown;

/// USCIS receipt number parsing.
pub mod receipt;
pub use receipt::{Error as ReceiptError, ReceiptNumber};

/// Hand-off to the official case-status website.
pub mod case_status;
pub use case_status::{ApiAvailability, CaseStatus, CaseStatusHandoff};

mod config;
pub use config::Config;

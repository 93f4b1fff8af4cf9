//! OPT Filing Deadline Planning
//!
//! Derives the regulatory filing windows for Optional Practical Training and
//! the STEM extension from a program end date.

pub mod domain;
pub use domain::{
    CaseStatus, Config, Countdown, DateWindow, InputError, ReceiptNumber,
    StemDurationConvention, TimelineInput, TimelineResult, compute_timeline,
};

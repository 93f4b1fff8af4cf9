use std::fmt;

use serde::Serialize;

/// Remaining days at or below which a deadline is flagged as urgent.
pub const DEFAULT_WARNING_DAYS: i64 = 30;

const DAYS_PER_YEAR: i64 = 365;
const DAYS_PER_MONTH: i64 = 30;

/// How a day count relative to today should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Countdown {
    /// The date is still ahead.
    Upcoming {
        /// Days remaining.
        days: i64,
        /// Whether the date falls within the warning threshold.
        urgent: bool,
    },
    /// The date is today.
    Today,
    /// The date has passed.
    Elapsed {
        /// Days since the date.
        days: i64,
    },
}

impl Countdown {
    /// Classifies a signed day count, as produced by the timeline calculator.
    #[must_use]
    pub const fn from_days(days: i64, warning_days: i64) -> Self {
        match days {
            0 => Self::Today,
            d if d > 0 => Self::Upcoming {
                days: d,
                urgent: d <= warning_days,
            },
            d => Self::Elapsed {
                days: d.saturating_neg(),
            },
        }
    }

    /// Whether the date is still ahead and within the warning threshold.
    #[must_use]
    pub const fn is_urgent(&self) -> bool {
        matches!(self, Self::Upcoming { urgent: true, .. })
    }

    /// A short form suited to narrow displays.
    ///
    /// Elapsed spans longer than a month are broken into approximate years
    /// (365 days) or months (30 days) plus remaining days.
    ///
    /// ```
    /// use opt_planner::Countdown;
    ///
    /// assert_eq!(Countdown::from_days(-400, 30).compact(), "1y 35d ago");
    /// assert_eq!(Countdown::from_days(-45, 30).compact(), "1m 15d ago");
    /// assert_eq!(Countdown::from_days(-3, 30).compact(), "3d ago");
    /// assert_eq!(Countdown::from_days(12, 30).compact(), "12");
    /// ```
    #[must_use]
    pub fn compact(&self) -> String {
        match *self {
            Self::Upcoming { days, .. } => days.to_string(),
            Self::Today => "Today!".to_string(),
            Self::Elapsed { days } if days > DAYS_PER_YEAR => {
                format!("{}y {}d ago", days / DAYS_PER_YEAR, days % DAYS_PER_YEAR)
            }
            Self::Elapsed { days } if days > DAYS_PER_MONTH => {
                format!("{}m {}d ago", days / DAYS_PER_MONTH, days % DAYS_PER_MONTH)
            }
            Self::Elapsed { days } => format!("{days}d ago"),
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Upcoming { days, .. } => write!(f, "{days} {}", plural(days)),
            Self::Today => f.write_str("Today!"),
            Self::Elapsed { days } => write!(f, "{days} {} ago", plural(days)),
        }
    }
}

const fn plural(days: i64) -> &'static str {
    if days == 1 { "day" } else { "days" }
}

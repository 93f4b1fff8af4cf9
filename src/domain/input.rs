use chrono::{Months, NaiveDate, TimeDelta};

/// Errors raised while turning user input into a timeline request.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// No date was given.
    #[error("Please pick a date")]
    Empty,

    /// The text is neither an ISO date nor a day offset.
    #[error("Invalid date '{0}': expected YYYY-MM-DD or a day offset such as +90")]
    Malformed(String),

    /// The offset moves the date outside the supported calendar range.
    #[error("Date offset '{0}' is out of range")]
    OutOfRange(String),

    /// The OPT end date precedes the program end date.
    #[error("OPT end date {opt_end} is before the graduation date {graduation}")]
    OptEndBeforeGraduation {
        /// The rejected OPT end date.
        opt_end: NaiveDate,
        /// The program end date it was compared against.
        graduation: NaiveDate,
    },
}

/// Months ahead of today offered as the graduation date when none is given.
pub const SUGGESTED_GRADUATION_MONTHS: u32 = 3;

/// Parses a graduation date typed by the user.
///
/// Accepts either an ISO date (`2025-06-15`) or a signed day offset from
/// `today` (`+90`, `-30`, `+365d`). Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`Error::Empty`] for blank input, [`Error::Malformed`] when the
/// text is not a recognised date, and [`Error::OutOfRange`] when an offset
/// overflows the calendar.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use opt_planner::domain::input::parse_date;
///
/// let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
///
/// assert_eq!(
///     parse_date("2025-06-15", today).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
/// );
/// assert_eq!(
///     parse_date("+30", today).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
/// );
/// ```
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate, Error> {
    parse_anchored(input, today)
}

/// Parses an OPT end date typed by the user.
///
/// Same grammar as [`parse_date`], but day offsets count from `base`, the
/// graduation date, so `+365` means one year of OPT.
///
/// # Errors
///
/// As for [`parse_date`].
///
/// ```
/// use chrono::NaiveDate;
/// use opt_planner::domain::input::parse_offset_date;
///
/// let graduation = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
///
/// assert_eq!(
///     parse_offset_date("+365", graduation).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
/// );
/// ```
pub fn parse_offset_date(input: &str, base: NaiveDate) -> Result<NaiveDate, Error> {
    parse_anchored(input, base)
}

/// The graduation date to suggest when the user has not picked one: three
/// months from today, clamped to the end of a shorter month.
#[must_use]
pub fn suggested_graduation_date(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_months(Months::new(SUGGESTED_GRADUATION_MONTHS))
        .unwrap_or(NaiveDate::MAX)
}

fn parse_anchored(input: &str, anchor: NaiveDate) -> Result<NaiveDate, Error> {
    let text = input.trim();
    if text.is_empty() {
        return Err(Error::Empty);
    }

    if let Some(days) = parse_offset(text) {
        let days = days.map_err(|()| Error::Malformed(text.to_string()))?;
        return TimeDelta::try_days(days)
            .and_then(|delta| anchor.checked_add_signed(delta))
            .ok_or_else(|| Error::OutOfRange(text.to_string()));
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| Error::Malformed(text.to_string()))
}

/// Recognises `+N`, `-N` and `±Nd`.
///
/// Returns `None` when the text does not look like an offset at all, and
/// `Some(Err(()))` when it starts like one but the magnitude is unusable.
fn parse_offset(text: &str) -> Option<Result<i64, ()>> {
    let (sign, rest) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    let digits = rest.strip_suffix('d').unwrap_or(rest);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Some(Err(()));
    }
    Some(digits.parse::<i64>().map(|n| sign * n).map_err(|_| ()))
}

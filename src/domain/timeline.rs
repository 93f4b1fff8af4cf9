use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::input::Error as InputError;

/// Days before the program end date at which an OPT application may first be
/// filed.
pub const EARLIEST_FILING_OFFSET_DAYS: i64 = -90;

/// Days after the program end date by which an OPT application must be filed.
pub const LATEST_FILING_OFFSET_DAYS: i64 = 60;

/// Default length of the initial OPT period when no end date is given.
pub const DEFAULT_OPT_LENGTH_DAYS: i64 = 365;

/// Days before the OPT end date at which a STEM extension may first be filed.
pub const STEM_FILING_OFFSET_DAYS: i64 = -90;

const STANDARD_OPT_MONTHS: u32 = 12;
const MILLIS_PER_DAY: i64 = 86_400_000;

/// Which period `opt_duration_months` reports for a STEM student.
///
/// Either the length of the STEM extension alone (24 months) or the whole
/// authorised period including the initial year (36 months).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemDurationConvention {
    /// Report the extension only: 24 months.
    #[default]
    Extension,
    /// Report initial OPT plus extension: 36 months.
    Total,
}

impl StemDurationConvention {
    /// The number of months reported for a STEM student under this
    /// convention.
    #[must_use]
    pub const fn months(self) -> u32 {
        match self {
            Self::Extension => 24,
            Self::Total => 36,
        }
    }

    /// The configuration name of the convention.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Extension => "extension",
            Self::Total => "total",
        }
    }
}

impl fmt::Display for StemDurationConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StemDurationConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "extension" => Ok(Self::Extension),
            "total" => Ok(Self::Total),
            other => Err(format!(
                "unknown STEM duration convention '{other}' (expected 'extension' or 'total')"
            )),
        }
    }
}

/// A closed interval of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    /// First day of the window (inclusive).
    pub from: NaiveDate,
    /// Last day of the window (inclusive).
    pub to: NaiveDate,
}

impl DateWindow {
    /// Creates a window spanning `from` to `to`, both inclusive.
    #[must_use]
    pub const fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Whether `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// The number of days between the two ends of the window.
    #[must_use]
    pub fn len_days(&self) -> i64 {
        (self.to - self.from).num_days()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} → {}",
            self.from.format("%b %-d, %Y"),
            self.to.format("%b %-d, %Y")
        )
    }
}

/// The facts a timeline is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineInput {
    graduation_date: NaiveDate,
    is_stem_extension: bool,
    explicit_opt_end_date: Option<NaiveDate>,
}

impl TimelineInput {
    /// Creates a validated input.
    ///
    /// An explicit OPT end date is only consulted for STEM students, but it
    /// is validated regardless.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::OptEndBeforeGraduation`] if `explicit_opt_end_date`
    /// is earlier than `graduation_date`.
    pub fn new(
        graduation_date: NaiveDate,
        is_stem_extension: bool,
        explicit_opt_end_date: Option<NaiveDate>,
    ) -> Result<Self, InputError> {
        if let Some(end) = explicit_opt_end_date.filter(|end| *end < graduation_date) {
            return Err(InputError::OptEndBeforeGraduation {
                opt_end: end,
                graduation: graduation_date,
            });
        }

        Ok(Self {
            graduation_date,
            is_stem_extension,
            explicit_opt_end_date,
        })
    }

    /// Input for a student on standard (non-STEM) OPT.
    #[must_use]
    pub const fn standard(graduation_date: NaiveDate) -> Self {
        Self {
            graduation_date,
            is_stem_extension: false,
            explicit_opt_end_date: None,
        }
    }

    /// The program end date.
    #[must_use]
    pub const fn graduation_date(&self) -> NaiveDate {
        self.graduation_date
    }

    /// Whether the student intends to apply for the STEM extension.
    #[must_use]
    pub const fn is_stem_extension(&self) -> bool {
        self.is_stem_extension
    }

    /// The OPT end date supplied by the user, if any.
    #[must_use]
    pub const fn explicit_opt_end_date(&self) -> Option<NaiveDate> {
        self.explicit_opt_end_date
    }
}

/// Every filing window and countdown derived from a [`TimelineInput`].
///
/// STEM-only fields are `None` for standard OPT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineResult {
    /// The program end date the timeline was computed from.
    pub graduation_date: NaiveDate,
    /// Whether the STEM branch was taken.
    pub is_stem_extension: bool,
    /// First day an OPT application may be filed.
    pub earliest_filing_date: NaiveDate,
    /// Last day an OPT application may be filed.
    pub latest_filing_date: NaiveDate,
    /// Range of permissible OPT start dates.
    pub opt_start_window: DateWindow,
    /// OPT duration, in months, under the chosen convention.
    pub opt_duration_months: u32,
    /// The convention `opt_duration_months` was reported under.
    pub duration_convention: StemDurationConvention,
    /// End of the initial OPT period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opt_end_date: Option<NaiveDate>,
    /// Window in which the STEM extension application may be filed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stem_filing_window: Option<DateWindow>,
    /// Graduation through the end of the initial OPT period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_opt_period: Option<DateWindow>,
    /// Whole days from `now` until the earliest filing date, rounded up.
    /// Negative once the date has passed.
    pub days_until_earliest_filing: i64,
    /// Whole days from `now` until the latest filing date, rounded up.
    /// Negative once the date has passed.
    pub days_until_latest_filing: i64,
}

/// Computes the OPT filing timeline for `input` as seen at `now`.
///
/// Calendar dates are taken to start at midnight in the same (local) time
/// frame as `now`. Dates in the past are not an error; their countdowns are
/// simply negative.
#[must_use]
pub fn compute_timeline(
    input: &TimelineInput,
    convention: StemDurationConvention,
    now: NaiveDateTime,
) -> TimelineResult {
    let graduation = input.graduation_date;
    let earliest_filing_date = shift(graduation, EARLIEST_FILING_OFFSET_DAYS);
    let latest_filing_date = shift(graduation, LATEST_FILING_OFFSET_DAYS);

    let (opt_duration_months, opt_end_date, stem_filing_window, total_opt_period) =
        if input.is_stem_extension {
            let opt_end = input
                .explicit_opt_end_date
                .unwrap_or_else(|| shift(graduation, DEFAULT_OPT_LENGTH_DAYS));
            (
                convention.months(),
                Some(opt_end),
                Some(DateWindow::new(
                    shift(opt_end, STEM_FILING_OFFSET_DAYS),
                    opt_end,
                )),
                Some(DateWindow::new(graduation, opt_end)),
            )
        } else {
            (STANDARD_OPT_MONTHS, None, None, None)
        };

    let result = TimelineResult {
        graduation_date: graduation,
        is_stem_extension: input.is_stem_extension,
        earliest_filing_date,
        latest_filing_date,
        opt_start_window: DateWindow::new(graduation, latest_filing_date),
        opt_duration_months,
        duration_convention: convention,
        opt_end_date,
        stem_filing_window,
        total_opt_period,
        days_until_earliest_filing: days_until(earliest_filing_date, now),
        days_until_latest_filing: days_until(latest_filing_date, now),
    };

    debug!(
        %graduation,
        stem = input.is_stem_extension,
        earliest = %result.earliest_filing_date,
        latest = %result.latest_filing_date,
        "computed timeline"
    );

    result
}

/// Adds a signed number of calendar days, saturating at the limits of the
/// representable range.
fn shift(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(TimeDelta::days(days))
        .unwrap_or(if days < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        })
}

/// Days from `now` until midnight at the start of `target`, rounded up.
fn days_until(target: NaiveDate, now: NaiveDateTime) -> i64 {
    let millis = (target.and_time(NaiveTime::MIN) - now).num_milliseconds();
    let whole = millis / MILLIS_PER_DAY;
    // Integer division truncates toward zero, which is already the ceiling
    // for negative values.
    if millis % MILLIS_PER_DAY > 0 {
        whole + 1
    } else {
        whole
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn midnight(s: &str) -> NaiveDateTime {
        date(s).and_time(NaiveTime::MIN)
    }

    fn stem(graduation: &str, opt_end: Option<&str>) -> TimelineInput {
        TimelineInput::new(date(graduation), true, opt_end.map(date)).unwrap()
    }

    #[test]
    fn standard_opt_timeline() {
        let input = TimelineInput::standard(date("2025-06-15"));
        let result = compute_timeline(
            &input,
            StemDurationConvention::default(),
            midnight("2025-01-01"),
        );

        assert_eq!(result.earliest_filing_date, date("2025-03-17"));
        assert_eq!(result.latest_filing_date, date("2025-08-14"));
        assert_eq!(
            result.opt_start_window,
            DateWindow::new(date("2025-06-15"), date("2025-08-14"))
        );
        assert_eq!(result.opt_duration_months, 12);
        assert_eq!(result.days_until_earliest_filing, 75);
        assert_eq!(result.opt_end_date, None);
        assert_eq!(result.stem_filing_window, None);
        assert_eq!(result.total_opt_period, None);
    }

    #[test]
    fn stem_defaults_to_one_year_of_opt() {
        let result = compute_timeline(
            &stem("2025-06-15", None),
            StemDurationConvention::Extension,
            midnight("2025-01-01"),
        );

        assert_eq!(result.opt_end_date, Some(date("2026-06-15")));
        assert_eq!(
            result.stem_filing_window,
            Some(DateWindow::new(date("2026-03-17"), date("2026-06-15")))
        );
        assert_eq!(
            result.total_opt_period,
            Some(DateWindow::new(date("2025-06-15"), date("2026-06-15")))
        );
        assert_eq!(result.opt_duration_months, 24);
    }

    #[test]
    fn explicit_opt_end_overrides_default() {
        let result = compute_timeline(
            &stem("2025-06-15", Some("2027-01-10")),
            StemDurationConvention::default(),
            midnight("2025-01-01"),
        );

        let window = result.stem_filing_window.unwrap();
        assert_eq!(window.to, date("2027-01-10"));
        assert_eq!(window.from, date("2026-10-12"));
        assert_eq!(result.opt_end_date, Some(date("2027-01-10")));
    }

    #[test]
    fn explicit_opt_end_is_ignored_without_stem() {
        let input = TimelineInput::new(date("2025-06-15"), false, Some(date("2027-01-10")))
            .unwrap();
        let result = compute_timeline(
            &input,
            StemDurationConvention::default(),
            midnight("2025-01-01"),
        );

        assert_eq!(result.opt_end_date, None);
        assert_eq!(result.opt_duration_months, 12);
    }

    #[test_case(StemDurationConvention::Extension, 24; "extension only")]
    #[test_case(StemDurationConvention::Total, 36; "including initial year")]
    fn stem_duration_follows_convention(convention: StemDurationConvention, months: u32) {
        let result = compute_timeline(&stem("2025-06-15", None), convention, midnight("2025-01-01"));
        assert_eq!(result.opt_duration_months, months);
        assert_eq!(result.duration_convention, convention);
    }

    #[test_case("2024-02-29", "2023-12-01", "2024-04-29"; "leap day")]
    #[test_case("2025-01-15", "2024-10-17", "2025-03-16"; "crosses year backwards")]
    #[test_case("2025-12-01", "2025-09-02", "2026-01-30"; "crosses year forwards")]
    #[test_case("2023-12-31", "2023-10-02", "2024-02-29"; "lands on leap day")]
    fn filing_dates_across_boundaries(graduation: &str, earliest: &str, latest: &str) {
        let result = compute_timeline(
            &TimelineInput::standard(date(graduation)),
            StemDurationConvention::default(),
            midnight("2025-01-01"),
        );
        assert_eq!(result.earliest_filing_date, date(earliest));
        assert_eq!(result.latest_filing_date, date(latest));
    }

    #[test]
    fn filing_window_is_always_150_days() {
        let mut graduation = date("2023-01-01");
        while graduation < date("2026-01-01") {
            let result = compute_timeline(
                &TimelineInput::standard(graduation),
                StemDurationConvention::default(),
                midnight("2025-01-01"),
            );
            assert_eq!(
                (result.latest_filing_date - result.earliest_filing_date).num_days(),
                150,
                "graduation {graduation}"
            );
            graduation = graduation.succ_opt().unwrap();
        }
    }

    #[test]
    fn stem_window_starts_90_days_before_opt_end() {
        let result = compute_timeline(
            &stem("2024-02-29", None),
            StemDurationConvention::default(),
            midnight("2025-01-01"),
        );
        let opt_end = result.opt_end_date.unwrap();
        assert_eq!(opt_end, date("2025-02-28"));
        assert_eq!(result.stem_filing_window.unwrap().len_days(), 90);
    }

    #[test]
    fn countdown_is_zero_on_the_day() {
        let result = compute_timeline(
            &TimelineInput::standard(date("2025-06-15")),
            StemDurationConvention::default(),
            midnight("2025-03-17"),
        );
        assert_eq!(result.days_until_earliest_filing, 0);
    }

    #[test]
    fn countdown_goes_negative_after_the_day() {
        let result = compute_timeline(
            &TimelineInput::standard(date("2025-06-15")),
            StemDurationConvention::default(),
            midnight("2025-08-15"),
        );
        assert_eq!(result.days_until_latest_filing, -1);
    }

    #[test]
    fn partial_day_rounds_up() {
        let now = date("2025-03-16").and_hms_opt(18, 30, 0).unwrap();
        let result = compute_timeline(
            &TimelineInput::standard(date("2025-06-15")),
            StemDurationConvention::default(),
            now,
        );
        assert_eq!(result.days_until_earliest_filing, 1);

        let later = date("2025-03-17").and_hms_opt(9, 0, 0).unwrap();
        let result = compute_timeline(
            &TimelineInput::standard(date("2025-06-15")),
            StemDurationConvention::default(),
            later,
        );
        assert_eq!(result.days_until_earliest_filing, 0);
    }

    #[test]
    fn countdown_decreases_by_one_per_day() {
        let input = TimelineInput::standard(date("2025-06-15"));
        let mut now = midnight("2024-12-01");
        let mut previous = compute_timeline(&input, StemDurationConvention::default(), now);

        for _ in 0..400 {
            now += TimeDelta::days(1);
            let next = compute_timeline(&input, StemDurationConvention::default(), now);
            assert_eq!(
                next.days_until_earliest_filing,
                previous.days_until_earliest_filing - 1
            );
            assert_eq!(
                next.days_until_latest_filing,
                previous.days_until_latest_filing - 1
            );
            previous = next;
        }
    }

    #[test]
    fn computation_is_idempotent() {
        let input = stem("2025-06-15", Some("2026-08-01"));
        let now = date("2025-04-02").and_hms_opt(13, 14, 15).unwrap();
        let first = compute_timeline(&input, StemDurationConvention::Total, now);
        let second = compute_timeline(&input, StemDurationConvention::Total, now);
        assert_eq!(first, second);
    }

    #[test]
    fn opt_end_before_graduation_is_rejected() {
        let error = TimelineInput::new(date("2025-06-15"), true, Some(date("2025-06-14")))
            .unwrap_err();
        assert!(matches!(error, InputError::OptEndBeforeGraduation { .. }));
    }

    #[test]
    fn opt_end_on_graduation_is_accepted() {
        let input =
            TimelineInput::new(date("2025-06-15"), true, Some(date("2025-06-15"))).unwrap();
        let result = compute_timeline(
            &input,
            StemDurationConvention::default(),
            midnight("2025-01-01"),
        );
        assert_eq!(
            result.total_opt_period,
            Some(DateWindow::new(date("2025-06-15"), date("2025-06-15")))
        );
    }

    #[test]
    fn window_display_uses_short_dates() {
        let window = DateWindow::new(date("2025-06-15"), date("2025-08-14"));
        assert_eq!(window.to_string(), "Jun 15, 2025 → Aug 14, 2025");
        assert!(window.contains(date("2025-07-01")));
        assert!(!window.contains(date("2025-08-15")));
    }

    #[test_case("extension", StemDurationConvention::Extension)]
    #[test_case("Total", StemDurationConvention::Total)]
    #[test_case(" total ", StemDurationConvention::Total)]
    fn convention_parses(s: &str, expected: StemDurationConvention) {
        assert_eq!(s.parse::<StemDurationConvention>().unwrap(), expected);
    }

    #[test]
    fn unknown_convention_is_rejected() {
        assert!("forever".parse::<StemDurationConvention>().is_err());
    }

    #[test]
    fn json_omits_stem_fields_for_standard_opt() {
        let result = compute_timeline(
            &TimelineInput::standard(date("2025-06-15")),
            StemDurationConvention::default(),
            midnight("2025-01-01"),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["earliest_filing_date"], "2025-03-17");
        assert_eq!(json["duration_convention"], "extension");
        assert!(json.get("stem_filing_window").is_none());
    }
}

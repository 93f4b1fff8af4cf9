use std::{io::IsTerminal, path::Path};

use anyhow::Context;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Parser;
use opt_planner::{
    Config, Countdown, StemDurationConvention, TimelineInput, TimelineResult, compute_timeline,
    domain::input::{parse_date, parse_offset_date, suggested_graduation_date},
};
use serde::Serialize;
use tracing::{info, instrument};

use super::terminal::{Colorize, Tone, is_narrow};

#[derive(Debug, Parser, Default)]
#[command(about = "Compute OPT filing windows and countdowns")]
pub struct Plan {
    /// Program end date: YYYY-MM-DD, or +N/-N days from today
    #[arg(allow_hyphen_values = true)]
    graduation: Option<String>,

    /// Include the STEM extension timeline
    #[arg(long)]
    stem: bool,

    /// End of the initial OPT period: YYYY-MM-DD, or +N days from graduation
    ///
    /// Defaults to one year after graduation.
    #[arg(long, value_name = "DATE", requires = "stem", allow_hyphen_values = true)]
    opt_end: Option<String>,

    /// Evaluate countdowns as of this date instead of today (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", value_parser = parse_iso_date)]
    today: Option<NaiveDate>,

    /// Report STEM duration as the extension alone or the total period
    ///
    /// Overrides the configured `stem_duration`.
    #[arg(long, value_name = "CONVENTION")]
    stem_duration: Option<StemDurationConvention>,

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

fn parse_iso_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{s}': expected YYYY-MM-DD"))
}

/// A timeline with its countdowns already classified, for JSON output.
#[derive(Debug, Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    timeline: &'a TimelineResult,
    earliest_filing_countdown: Countdown,
    latest_filing_countdown: Countdown,
    earliest_filing_countdown_text: String,
    latest_filing_countdown_text: String,
}

impl<'a> Report<'a> {
    fn new(timeline: &'a TimelineResult, warning_days: i64) -> Self {
        let earliest = Countdown::from_days(timeline.days_until_earliest_filing, warning_days);
        let latest = Countdown::from_days(timeline.days_until_latest_filing, warning_days);

        Self {
            timeline,
            earliest_filing_countdown: earliest,
            latest_filing_countdown: latest,
            earliest_filing_countdown_text: earliest.to_string(),
            latest_filing_countdown_text: latest.to_string(),
        }
    }
}

impl Plan {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, config_path: &Path) -> anyhow::Result<()> {
        let config = Config::load_or_default(config_path).map_err(|e| anyhow::anyhow!("{e}"))?;
        let convention = self.stem_duration.unwrap_or(config.stem_duration);

        let now = self.now();
        let today = now.date();

        let graduation = match self.graduation.as_deref() {
            Some(text) => parse_date(text, today).context("Invalid graduation date")?,
            None => prompt_graduation(today)?,
        };

        let opt_end = self
            .opt_end
            .as_deref()
            .map(|text| parse_offset_date(text, graduation))
            .transpose()
            .context("Invalid OPT end date")?;

        let input = TimelineInput::new(graduation, self.stem, opt_end)?;
        info!(%graduation, stem = self.stem, %convention, "planning timeline");

        let timeline = compute_timeline(&input, convention, now);
        let warning_days = config.warning_days();

        match self.output {
            OutputFormat::Pretty => output_pretty(&timeline, warning_days),
            OutputFormat::Json => output_json(&timeline, warning_days)?,
        }

        Ok(())
    }

    /// The evaluation instant: midnight of `--today`, or the local clock.
    fn now(&self) -> NaiveDateTime {
        self.today.map_or_else(
            || Local::now().naive_local(),
            |date| date.and_time(NaiveTime::MIN),
        )
    }
}

/// Asks for a graduation date until a valid one is entered.
fn prompt_graduation(today: NaiveDate) -> anyhow::Result<NaiveDate> {
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("A graduation date is required (YYYY-MM-DD or +N days from today)");
    }

    let text: String = dialoguer::Input::new()
        .with_prompt("Graduation date (YYYY-MM-DD or +days)")
        .default(
            suggested_graduation_date(today)
                .format("%Y-%m-%d")
                .to_string(),
        )
        .validate_with(move |input: &String| parse_date(input, today).map(|_| ()))
        .interact_text()?;

    Ok(parse_date(&text, today)?)
}

fn output_json(timeline: &TimelineResult, warning_days: i64) -> anyhow::Result<()> {
    let report = Report::new(timeline, warning_days);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn output_pretty(timeline: &TimelineResult, warning_days: i64) {
    let narrow = is_narrow();

    println!("OPT timeline");
    println!("{}", "────────────".dim());
    print_date("Graduation", timeline.graduation_date, narrow);
    print_date("Earliest filing", timeline.earliest_filing_date, narrow);
    print_date("Latest filing", timeline.latest_filing_date, narrow);
    print_field("OPT start window", &timeline.opt_start_window.to_string(), narrow);

    let duration_note = if timeline.is_stem_extension {
        match timeline.duration_convention {
            StemDurationConvention::Extension => "STEM extension",
            StemDurationConvention::Total => "initial OPT plus STEM extension",
        }
    } else {
        "standard OPT period"
    };
    print_field(
        "OPT duration",
        &format!(
            "{} months {}",
            timeline.opt_duration_months,
            format!("({duration_note})").dim()
        ),
        narrow,
    );

    if let (Some(opt_end), Some(window), Some(total)) = (
        timeline.opt_end_date,
        timeline.stem_filing_window,
        timeline.total_opt_period,
    ) {
        println!();
        println!("STEM extension");
        println!("{}", "──────────────".dim());
        print_date("OPT end", opt_end, narrow);
        print_field("Filing window", &window.to_string(), narrow);
        print_field("Total OPT period", &total.to_string(), narrow);
    }

    println!();
    println!("Countdown");
    println!("{}", "─────────".dim());
    print_countdown(
        "Until earliest filing",
        Countdown::from_days(timeline.days_until_earliest_filing, warning_days),
        narrow,
    );
    print_countdown(
        "Until latest filing",
        Countdown::from_days(timeline.days_until_latest_filing, warning_days),
        narrow,
    );
}

fn print_field(label: &str, value: &str, narrow: bool) {
    if narrow {
        println!("{label}:");
        println!("  {value}");
    } else {
        println!("{label:<22} {value}");
    }
}

fn print_date(label: &str, date: NaiveDate, narrow: bool) {
    let format = if narrow { "%b %-d, %Y" } else { "%A, %B %-d, %Y" };
    print_field(label, &date.format(format).to_string(), narrow);
}

fn print_countdown(label: &str, countdown: Countdown, narrow: bool) {
    let text = if narrow {
        countdown.compact()
    } else {
        countdown.to_string()
    };
    print_field(label, &text.toned(Tone::for_countdown(countdown)), narrow);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(args: &[&str]) -> Result<Plan, clap::Error> {
        Plan::try_parse_from(std::iter::once("plan").chain(args.iter().copied()))
    }

    #[test]
    fn parses_full_invocation() {
        let plan = plan(&[
            "2025-06-15",
            "--stem",
            "--opt-end",
            "2027-01-10",
            "--today",
            "2025-01-01",
            "--stem-duration",
            "total",
            "--output",
            "json",
        ])
        .unwrap();

        assert_eq!(plan.graduation.as_deref(), Some("2025-06-15"));
        assert!(plan.stem);
        assert_eq!(plan.opt_end.as_deref(), Some("2027-01-10"));
        assert_eq!(plan.today, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(plan.stem_duration, Some(StemDurationConvention::Total));
        assert!(matches!(plan.output, OutputFormat::Json));
    }

    #[test]
    fn opt_end_requires_stem() {
        assert!(plan(&["2025-06-15", "--opt-end", "2027-01-10"]).is_err());
    }

    #[test]
    fn negative_offsets_are_values() {
        let plan = plan(&["-30"]).unwrap();
        assert_eq!(plan.graduation.as_deref(), Some("-30"));
    }

    #[test]
    fn negative_offsets_with_day_suffix_are_values() {
        let plan = plan(&["--stem", "-30d"]).unwrap();
        assert_eq!(plan.graduation.as_deref(), Some("-30d"));
        assert!(plan.stem);
    }

    #[test]
    fn opt_end_accepts_offsets() {
        let plan = plan(&["2025-06-15", "--stem", "--opt-end", "+365"]).unwrap();
        assert_eq!(plan.opt_end.as_deref(), Some("+365"));
    }

    #[test]
    fn today_must_be_iso() {
        assert!(plan(&["2025-06-15", "--today", "+3"]).is_err());
    }

    #[test]
    fn today_override_is_midnight() {
        let plan = plan(&["2025-06-15", "--today", "2025-03-17"]).unwrap();
        assert_eq!(
            plan.now(),
            NaiveDate::from_ymd_opt(2025, 3, 17)
                .unwrap()
                .and_time(NaiveTime::MIN)
        );
    }

    #[test]
    fn json_report_includes_rendered_countdowns() {
        let input = TimelineInput::standard(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        let now = NaiveDate::from_ymd_opt(2025, 8, 15)
            .unwrap()
            .and_time(NaiveTime::MIN);
        let timeline = compute_timeline(&input, StemDurationConvention::default(), now);

        let json = serde_json::to_value(Report::new(&timeline, 30)).unwrap();

        assert_eq!(json["earliest_filing_date"], "2025-03-17");
        assert_eq!(json["days_until_earliest_filing"], -151);
        assert_eq!(json["earliest_filing_countdown"]["state"], "elapsed");
        assert_eq!(json["earliest_filing_countdown_text"], "151 days ago");

        assert_eq!(json["latest_filing_date"], "2025-08-14");
        assert_eq!(json["days_until_latest_filing"], -1);
        assert_eq!(json["latest_filing_countdown"]["state"], "elapsed");
        assert_eq!(json["latest_filing_countdown_text"], "1 day ago");
    }

    #[test]
    fn json_report_marks_close_deadlines_urgent() {
        let input = TimelineInput::standard(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        let now = NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_time(NaiveTime::MIN);
        let timeline = compute_timeline(&input, StemDurationConvention::default(), now);

        let json = serde_json::to_value(Report::new(&timeline, 30)).unwrap();

        assert_eq!(json["earliest_filing_countdown"]["state"], "upcoming");
        assert_eq!(json["earliest_filing_countdown"]["urgent"], true);
        assert_eq!(json["earliest_filing_countdown_text"], "10 days");
        assert_eq!(json["latest_filing_countdown"]["urgent"], false);
        assert_eq!(json["latest_filing_countdown_text"], "160 days");
    }
}

//! Terminal capability detection and styling

use opt_planner::Countdown;
use owo_colors::{OwoColorize, colors::css};

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Check if terminal is narrow (< 60 columns)
pub fn is_narrow() -> bool {
    terminal_size::terminal_size().is_some_and(|(w, _)| w.0 < 60)
}

/// The emphasis given to a piece of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Good news, or something happening today.
    Success,
    /// Needs attention soon.
    Warning,
    /// Already too late.
    Danger,
    /// Neutral highlight.
    Info,
    /// Secondary detail.
    Dim,
}

impl Tone {
    /// Tone for a countdown: today is success, urgent is a warning, elapsed is
    /// danger, anything further away is informational.
    pub const fn for_countdown(countdown: Countdown) -> Self {
        match countdown {
            Countdown::Today => Self::Success,
            Countdown::Upcoming { urgent: true, .. } => Self::Warning,
            Countdown::Upcoming { urgent: false, .. } => Self::Info,
            Countdown::Elapsed { .. } => Self::Danger,
        }
    }
}

/// Extension trait for colorizing output
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
    /// Color as danger (crimson)
    fn danger(&self) -> String;
    /// Color as info (blue)
    fn info(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;

    /// Color according to `tone`.
    fn toned(&self, tone: Tone) -> String {
        match tone {
            Tone::Success => self.success(),
            Tone::Warning => self.warning(),
            Tone::Danger => self.danger(),
            Tone::Info => self.info(),
            Tone::Dim => self.dim(),
        }
    }
}

impl Colorize for str {
    fn success(&self) -> String {
        if supports_color() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn warning(&self) -> String {
        if supports_color() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }

    fn danger(&self) -> String {
        if supports_color() {
            self.fg::<css::Crimson>().to_string()
        } else {
            self.to_string()
        }
    }

    fn info(&self) -> String {
        if supports_color() {
            self.fg::<css::LightBlue>().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim(&self) -> String {
        if supports_color() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }

    fn danger(&self) -> String {
        self.as_str().danger()
    }

    fn info(&self) -> String {
        self.as_str().info()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }
}

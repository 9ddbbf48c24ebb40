//! Warnings and end-of-run reporting
//!
//! Every recoverable failure during a run (a linter exiting non-zero, a command
//! that could not be spawned, a finding reported by an in-process task) becomes a
//! [`Warning`]. Once every rule has settled, the collected warnings are handed to a
//! [`WarningReport`] which renders them, prints per-severity totals and derives the
//! process exit status.
//!
//! Only `High` and `Medium` warnings fail a run. `Low` warnings are printed but
//! never change the exit status.

use console::style;
use std::fmt;

/// Severity of a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    High,
    #[default]
    Medium,
    Low,
}

impl Severity {
    /// Upper-case tag used when rendering
    pub fn tag(&self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A recoverable failure record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
    pub level: Severity,
}

impl Warning {
    /// Create a warning with the default (`Medium`) severity
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_level(message, Severity::default())
    }

    pub fn with_level(message: impl Into<String>, level: Severity) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }

    pub fn high(message: impl Into<String>) -> Self {
        Self::with_level(message, Severity::High)
    }

    pub fn low(message: impl Into<String>) -> Self {
        Self::with_level(message, Severity::Low)
    }

    /// Severity-tagged, colorized line for the diagnostic stream
    pub fn colored_message(&self) -> String {
        let tag = format!("[{}]", self.level.tag());
        match self.level {
            Severity::High => format!("{} \t{}", style(tag).on_red(), style(&self.message).red()),
            Severity::Medium => format!(
                "{} \t{}",
                style(tag).on_red().on_bright(),
                style(&self.message).red().bright()
            ),
            Severity::Low => format!(
                "{} \t{}",
                style(tag).on_yellow(),
                style(&self.message).yellow()
            ),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.tag(), self.message)
    }
}

/// Number of warnings per severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }

    /// Exit status of a run with these counts: every High or Medium warning counts
    pub fn exit_code(&self) -> usize {
        self.high + self.medium
    }

    /// Summary line printed after all warnings
    pub fn summary_line(&self) -> String {
        format!(
            "Errors: total ({}), high ({}), medium ({}), low ({})",
            self.total(),
            self.high,
            self.medium,
            self.low
        )
    }
}

/// Aggregated warnings of a complete run
#[derive(Debug, Clone, Default)]
pub struct WarningReport {
    warnings: Vec<Warning>,
}

impl WarningReport {
    pub fn new(warnings: Vec<Warning>) -> Self {
        Self { warnings }
    }

    pub fn extend(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        self.warnings.extend(warnings);
    }

    pub fn counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for warning in &self.warnings {
            match warning.level {
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
        }
        counts
    }

    pub fn exit_code(&self) -> usize {
        self.counts().exit_code()
    }

    /// Render every warning and the totals line to stderr, returning the counts
    pub fn print(&self) -> SeverityCounts {
        for warning in &self.warnings {
            eprintln!("{}", warning.colored_message());
        }
        let counts = self.counts();
        eprintln!("{}", counts.summary_line());
        counts
    }
}

/// Exit status handed to the operating system.
///
/// Statuses are truncated to a byte by the OS, so large counts are clamped
/// instead of being allowed to wrap around to success.
pub fn process_exit_code(counts: &SeverityCounts) -> i32 {
    counts.exit_code().min(255) as i32
}

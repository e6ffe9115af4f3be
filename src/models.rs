use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MINIMUM_BILLABLE_MINUTES: f64 = 30.0;

/// One tracked work interval as read from the session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub begin: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// Recorded duration; trusted as-is rather than derived from `end - begin`.
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BillingConfig {
    pub hourly_rate: f64,
    pub minimum_billable_minutes: f64,
}

impl BillingConfig {
    pub fn with_rate(hourly_rate: f64) -> Self {
        Self {
            hourly_rate,
            minimum_billable_minutes: DEFAULT_MINIMUM_BILLABLE_MINUTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingSummary {
    /// Per-session minutes rounded to two decimals, in session order.
    pub session_minutes: Vec<f64>,
    pub total_duration_seconds: f64,
    /// Sum of the rounded per-session minutes.
    pub total_duration_minutes: f64,
    pub minimum_billable_minutes: f64,
    pub billable_minutes: f64,
    pub hourly_rate: f64,
    /// Unrounded; renderers format it to two decimals.
    pub cost: f64,
}

impl BillingSummary {
    pub fn minimum_applied(&self) -> bool {
        self.total_duration_minutes < self.minimum_billable_minutes
    }

    /// Whole hours and remaining whole minutes of the billed time.
    pub fn billable_breakdown(&self) -> (u64, u64) {
        let whole = self.billable_minutes.max(0.0).floor() as u64;
        (whole / 60, whole % 60)
    }
}

/// Everything a renderer needs: the ordered sessions and their summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub sessions: Vec<Session>,
    pub summary: BillingSummary,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Json,
    Csv,
    Text,
}

impl ReportFormat {
    pub fn as_label(self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Text => "text",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Text => "txt",
        }
    }
}

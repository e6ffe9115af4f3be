use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{BillingSummary, Report, ReportFormat};
use chrono::{DateTime, FixedOffset};
use std::io::Write;

pub mod csv;
pub mod html;
pub mod json;
pub mod text;

pub const MINIMUM_CHARGE_NOTE: &str = "Minimum charge";

/// Presentation settings shared by every renderer. None of these touch the
/// numbers in the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub title: String,
    pub currency_symbol: String,
    pub timestamp_format: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ReportOptions {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            title: cfg.report_title.clone(),
            currency_symbol: cfg.currency_symbol.clone(),
            timestamp_format: cfg.timestamp_format.clone(),
        }
    }
}

impl ReportOptions {
    /// Formats in the session's own offset.
    pub fn timestamp(&self, ts: &DateTime<FixedOffset>) -> String {
        ts.format(&self.timestamp_format).to_string()
    }

    pub fn money(&self, amount: f64) -> String {
        format!("{amount:.2} {}", self.currency_symbol)
    }

    /// `1 hours 30 minutes * 40.00 €/hour`, from the billed minutes.
    pub fn cost_breakdown(&self, summary: &BillingSummary) -> String {
        let (hours, mins) = summary.billable_breakdown();
        format!(
            "{hours} hours {mins} minutes * {}/hour",
            self.money(summary.hourly_rate)
        )
    }

    pub fn minimum_note(&self, minutes: f64) -> String {
        format!("*{MINIMUM_CHARGE_NOTE} {} minutes.", plain_number(minutes))
    }
}

/// `1800.0` prints as `1800`, `90.5` as `90.5`.
pub fn plain_number(value: f64) -> String {
    format!("{value}")
}

pub fn minutes(value: f64) -> String {
    format!("{value:.2}")
}

pub trait ReportRenderer {
    fn format(&self) -> ReportFormat;

    fn name(&self) -> &'static str {
        self.format().as_label()
    }

    fn extension(&self) -> &'static str {
        self.format().extension()
    }

    fn render(&self, report: &Report, out: &mut dyn Write) -> Result<(), AppError>;
}

pub fn renderer_for(format: ReportFormat, options: ReportOptions) -> Box<dyn ReportRenderer> {
    match format {
        ReportFormat::Html => Box::new(html::HtmlRenderer::new(options)),
        ReportFormat::Json => Box::new(json::JsonRenderer),
        ReportFormat::Csv => Box::new(csv::CsvRenderer::new(options)),
        ReportFormat::Text => Box::new(text::TextRenderer::new(options)),
    }
}

pub fn parse_format(input: &str) -> Result<ReportFormat, AppError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "html" => Ok(ReportFormat::Html),
        "json" => Ok(ReportFormat::Json),
        "csv" => Ok(ReportFormat::Csv),
        "text" | "txt" => Ok(ReportFormat::Text),
        _ => Err(AppError::Config(
            "Unsupported format. Use html, json, csv, or text.".into(),
        )),
    }
}

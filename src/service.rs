use crate::billing::aggregate;
use crate::error::AppError;
use crate::loader::read_log;
use crate::models::{BillingConfig, Report, ReportFormat};
use crate::render::ReportRenderer;
use chrono::{DateTime, TimeZone};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

pub fn build_report(input: impl Read, billing: &BillingConfig) -> Result<Report, AppError> {
    let sessions = read_log(input)?;
    let summary = aggregate(&sessions, billing)?;
    info!(
        sessions = sessions.len(),
        billable_minutes = summary.billable_minutes,
        cost = summary.cost,
        "built billing report"
    );
    Ok(Report { sessions, summary })
}

/// Renders the whole document before touching the sink, so a failed render
/// leaves nothing behind.
pub fn write_report(
    report: &Report,
    renderer: &dyn ReportRenderer,
    sink: &mut dyn Write,
) -> Result<usize, AppError> {
    let mut buf = Vec::new();
    renderer.render(report, &mut buf)?;
    sink.write_all(&buf)?;
    sink.flush()?;
    Ok(buf.len())
}

pub fn write_report_file(
    report: &Report,
    renderer: &dyn ReportRenderer,
    path: &Path,
) -> Result<usize, AppError> {
    let mut buf = Vec::new();
    let written = write_report(report, renderer, &mut buf)?;
    fs::write(path, buf)?;
    info!(path = %path.display(), bytes = written, renderer = renderer.name(), "wrote report");
    Ok(written)
}

pub fn default_output_name<Tz: TimeZone>(format: ReportFormat, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "invoice_{}.{}",
        now.format("%Y%m%d%H%M%S"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::json::JsonRenderer;
    use crate::render::text::TextRenderer;
    use crate::render::ReportOptions;
    use chrono::Utc;
    use tempfile::TempDir;

    const LOG: &str = r#"{"sessions": [
        {"begin": "2023-05-01T09:00:00+03:00", "end": "2023-05-01T09:20:00+03:00", "duration": 1200},
        {"begin": "2023-05-02T14:00:00+03:00", "end": "2023-05-02T14:40:00+03:00", "duration": 2400}
    ]}"#;

    struct FailingRenderer;

    impl ReportRenderer for FailingRenderer {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn format(&self) -> ReportFormat {
            ReportFormat::Text
        }

        fn render(&self, _report: &Report, out: &mut dyn Write) -> Result<(), AppError> {
            out.write_all(b"partial")?;
            Err(AppError::Config("renderer gave up".into()))
        }
    }

    #[test]
    fn build_report_runs_loader_and_aggregator() {
        let report = build_report(LOG.as_bytes(), &BillingConfig::with_rate(40.0)).expect("report");
        assert_eq!(report.sessions.len(), 2);
        assert_eq!(report.summary.total_duration_minutes, 60.0);
        assert_eq!(report.summary.cost, 40.0);
    }

    #[test]
    fn build_report_fails_before_aggregation_on_bad_rate() {
        let err = build_report(LOG.as_bytes(), &BillingConfig::with_rate(-5.0)).expect_err("rate");
        assert!(matches!(err, AppError::InvalidRate(_)));
    }

    #[test]
    fn build_report_is_deterministic() {
        let cfg = BillingConfig::with_rate(33.3);
        let a = build_report(LOG.as_bytes(), &cfg).expect("a");
        let b = build_report(LOG.as_bytes(), &cfg).expect("b");
        assert_eq!(a, b);

        let renderer = TextRenderer::new(ReportOptions::default());
        let mut out_a = Vec::new();
        let mut out_b = Vec::new();
        write_report(&a, &renderer, &mut out_a).expect("render a");
        write_report(&b, &renderer, &mut out_b).expect("render b");
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn failed_render_writes_nothing() {
        let report = build_report(LOG.as_bytes(), &BillingConfig::with_rate(40.0)).expect("report");
        let mut sink = Vec::new();
        assert!(write_report(&report, &FailingRenderer, &mut sink).is_err());
        assert!(sink.is_empty());

        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("invoice.bin");
        assert!(write_report_file(&report, &FailingRenderer, &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn write_report_file_creates_document() {
        let report = build_report(LOG.as_bytes(), &BillingConfig::with_rate(40.0)).expect("report");
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("invoice.json");
        let written = write_report_file(&report, &JsonRenderer, &path).expect("write");
        let raw = fs::read_to_string(&path).expect("read back");
        assert_eq!(raw.len(), written);
        assert!(raw.contains("\"billable_minutes\": 60.0"));
    }

    #[test]
    fn default_output_name_uses_timestamp_and_extension() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).single().expect("date");
        assert_eq!(
            default_output_name(ReportFormat::Html, &now),
            "invoice_20240309070501.html"
        );
        assert_eq!(
            default_output_name(ReportFormat::Text, &now),
            "invoice_20240309070501.txt"
        );
    }
}

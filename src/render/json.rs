use super::ReportRenderer;
use crate::error::AppError;
use crate::models::{Report, ReportFormat};
use std::io::Write;

/// Machine-readable dump of sessions and summary, numbers unformatted.
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }

    fn render(&self, report: &Report, out: &mut dyn Write) -> Result<(), AppError> {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures::{render_to_string, two_sessions};
    use serde_json::Value;

    #[test]
    fn renders_sessions_and_summary() {
        let raw = render_to_string(&JsonRenderer, &two_sessions());
        let parsed: Value = serde_json::from_str(&raw).expect("valid json");

        let sessions = parsed["sessions"].as_array().expect("sessions array");
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0]["begin"], "2023-05-01T09:00:00+03:00");
        assert_eq!(sessions[0]["duration_seconds"], 1200.0);
        assert_eq!(parsed["summary"]["total_duration_minutes"], 60.0);
        assert_eq!(parsed["summary"]["billable_minutes"], 60.0);
        assert_eq!(parsed["summary"]["cost"], 40.0);
    }

    #[test]
    fn output_parses_back_into_a_report() {
        let report = two_sessions();
        let raw = render_to_string(&JsonRenderer, &report);
        let parsed: Report = serde_json::from_str(&raw).expect("report");
        assert_eq!(parsed, report);
    }
}

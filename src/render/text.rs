use super::{minutes, plain_number, ReportOptions, ReportRenderer};
use crate::error::AppError;
use crate::models::{Report, ReportFormat};
use std::io::Write;

pub struct TextRenderer {
    options: ReportOptions,
}

impl TextRenderer {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }
}

impl ReportRenderer for TextRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Text
    }

    fn render(&self, report: &Report, out: &mut dyn Write) -> Result<(), AppError> {
        let summary = &report.summary;
        writeln!(out, "{}", self.options.title)?;
        writeln!(
            out,
            "{:<20} {:<20} {:>14} {:>14}",
            "Begin", "End", "Duration (sec)", "Duration (min)"
        )?;
        for (session, mins) in report.sessions.iter().zip(&summary.session_minutes) {
            writeln!(
                out,
                "{:<20} {:<20} {:>14} {:>14}",
                self.options.timestamp(&session.begin),
                self.options.timestamp(&session.end),
                plain_number(session.duration_seconds),
                minutes(*mins),
            )?;
        }
        writeln!(
            out,
            "{:<41} {:>14} {:>14}",
            "Total",
            plain_number(summary.total_duration_seconds),
            minutes(summary.total_duration_minutes),
        )?;

        writeln!(
            out,
            "Cost: {} = {}",
            self.options.cost_breakdown(summary),
            self.options.money(summary.cost),
        )?;
        writeln!(out, "{}", self.options.minimum_note(summary.minimum_billable_minutes))?;
        Ok(())
    }
}

use super::{minutes, plain_number, ReportOptions, ReportRenderer};
use crate::error::AppError;
use crate::models::{Report, ReportFormat};
use std::io::Write;

pub fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

pub struct CsvRenderer {
    options: ReportOptions,
}

impl CsvRenderer {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    fn line(out: &mut dyn Write, fields: &[String]) -> Result<(), AppError> {
        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        writeln!(out, "{}", row.join(","))?;
        Ok(())
    }
}

impl ReportRenderer for CsvRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Csv
    }

    fn render(&self, report: &Report, out: &mut dyn Write) -> Result<(), AppError> {
        let summary = &report.summary;
        writeln!(out, "begin,end,duration_seconds,duration_minutes")?;
        for (session, mins) in report.sessions.iter().zip(&summary.session_minutes) {
            Self::line(
                out,
                &[
                    self.options.timestamp(&session.begin),
                    self.options.timestamp(&session.end),
                    plain_number(session.duration_seconds),
                    minutes(*mins),
                ],
            )?;
        }

        let empty = String::new;
        Self::line(
            out,
            &[
                "total".into(),
                empty(),
                plain_number(summary.total_duration_seconds),
                minutes(summary.total_duration_minutes),
            ],
        )?;
        Self::line(
            out,
            &[
                "billable".into(),
                empty(),
                empty(),
                minutes(summary.billable_minutes),
            ],
        )?;
        Self::line(
            out,
            &[
                "hourly_rate".into(),
                empty(),
                empty(),
                self.options.money(summary.hourly_rate),
            ],
        )?;
        Self::line(
            out,
            &["cost".into(), empty(), empty(), self.options.money(summary.cost)],
        )?;
        Ok(())
    }
}

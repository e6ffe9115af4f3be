use super::{minutes, plain_number, ReportOptions, ReportRenderer};
use crate::error::AppError;
use crate::models::{Report, ReportFormat};
use minijinja::{context, Environment};
use serde::Serialize;
use std::io::Write;
use tracing::debug;

const TEMPLATE_NAME: &str = "invoice.html";

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{{ title }}</title>
    <style>
        table { border-collapse: collapse; }
        th, td { border: 1px solid black; padding: 5px; text-align: right; }
        th, td:first-child { text-align: left; }
        .total { border-top: 2px solid black; }
    </style>
</head>
<body>
    <h1>{{ title }}</h1>
    <table>
        <tr>
            <th>Begin</th>
            <th>End</th>
            <th>Duration (secs)</th>
            <th>Duration (mins)</th>
        </tr>
{%- for row in rows %}
        <tr>
            <td style="text-align: left;">{{ row.begin }}</td>
            <td style="text-align: left;">{{ row.end }}</td>
            <td>{{ row.seconds }}</td>
            <td>{{ row.minutes }}</td>
        </tr>
{%- endfor %}
        <tr class="total">
            <td colspan="2" style="text-align: left;">Total</td>
            <td>{{ total_seconds }}</td>
            <td>{{ total_minutes }}</td>
        </tr>
{%- if minimum_applied %}
        <tr>
            <td colspan="2" style="text-align: left;">Billable</td>
            <td colspan="2">{{ billable_minutes }}*</td>
        </tr>
{%- endif %}
        <tr>
            <td colspan="2" style="text-align: left;">Hourly rate</td>
            <td colspan="2">{{ hourly_rate }}</td>
        </tr>
        <tr>
            <td colspan="2" style="text-align: left;">Billed time</td>
            <td colspan="2">{{ breakdown }}</td>
        </tr>
        <tr>
            <td colspan="2" style="text-align: left;">Cost</td>
            <td colspan="2">{{ cost }}</td>
        </tr>
    </table>
    <p style="text-align: right;">{{ note }}</p>
</body>
</html>
"#;

#[derive(Debug, Serialize)]
struct HtmlRow {
    begin: String,
    end: String,
    seconds: String,
    minutes: String,
}

pub struct HtmlRenderer {
    options: ReportOptions,
}

impl HtmlRenderer {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }
}

impl ReportRenderer for HtmlRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Html
    }

    fn render(&self, report: &Report, out: &mut dyn Write) -> Result<(), AppError> {
        let summary = &report.summary;
        let rows: Vec<HtmlRow> = report
            .sessions
            .iter()
            .zip(&summary.session_minutes)
            .map(|(s, m)| HtmlRow {
                begin: self.options.timestamp(&s.begin),
                end: self.options.timestamp(&s.end),
                seconds: plain_number(s.duration_seconds),
                minutes: minutes(*m),
            })
            .collect();

        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, TEMPLATE)?;
        let html = env.get_template(TEMPLATE_NAME)?.render(context! {
            title => self.options.title,
            rows => rows,
            total_seconds => plain_number(summary.total_duration_seconds),
            total_minutes => minutes(summary.total_duration_minutes),
            minimum_applied => summary.minimum_applied(),
            billable_minutes => minutes(summary.billable_minutes),
            hourly_rate => self.options.money(summary.hourly_rate),
            breakdown => self.options.cost_breakdown(summary),
            cost => self.options.money(summary.cost),
            note => self.options.minimum_note(summary.minimum_billable_minutes),
        })?;

        debug!(rows = report.sessions.len(), bytes = html.len(), "rendered html");
        out.write_all(html.as_bytes())?;
        Ok(())
    }
}

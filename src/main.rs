mod billing;
mod config;
mod error;
mod loader;
mod logging;
mod models;
mod render;
mod service;

use crate::billing::{parse_rate, round2};
use crate::config::{
    config_path, ensure_initialized, load_config, load_stored_config, save_config, AppConfig,
};
use crate::error::AppError;
use crate::models::{BillingConfig, BillingSummary, ReportFormat};
use crate::render::{parse_format, renderer_for, ReportOptions};
use crate::service::{build_report, default_output_name, write_report, write_report_file};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader, IsTerminal, Read};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "timebill")]
#[command(about = "Billing summaries and invoices from a work-session log")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct BillingArgs {
    /// Session log to read, `-` for stdin.
    #[arg(long, default_value = ".timetracker")]
    input: String,
    #[arg(long)]
    rate: Option<String>,
    #[arg(long)]
    minimum_minutes: Option<f64>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Init,
    SetRate {
        #[arg(allow_negative_numbers = true)]
        rate: String,
    },
    SetMinimum {
        #[arg(allow_negative_numbers = true)]
        minutes: f64,
    },
    Summary {
        #[command(flatten)]
        billing: BillingArgs,
        #[arg(long, default_value = "text")]
        format: String,
    },
    Render {
        #[command(flatten)]
        billing: BillingArgs,
        #[arg(long, default_value = "html")]
        format: String,
        /// Output path, `-` for stdout.
        #[arg(long, conflicts_with = "auto_name")]
        output: Option<PathBuf>,
        /// Write `invoice_<timestamp>.<ext>` in the current directory.
        #[arg(long)]
        auto_name: bool,
    },
}

fn open_input(input: &str) -> Result<Box<dyn Read>, AppError> {
    if input == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(input).map_err(|e| {
        AppError::Io(io::Error::new(
            e.kind(),
            format!("cannot open session log '{input}': {e}"),
        ))
    })?;
    Ok(Box::new(BufReader::new(file)))
}

fn prompt_rate() -> Result<f64, AppError> {
    let raw = inquire::Text::new("Please enter the hourly rate:").prompt()?;
    parse_rate(&raw)
}

fn resolve_billing(cfg: &AppConfig, args: &BillingArgs) -> Result<BillingConfig, AppError> {
    let rate_override = args.rate.as_deref().map(parse_rate).transpose()?;
    if let Some(billing) = cfg.billing(rate_override, args.minimum_minutes)? {
        return Ok(billing);
    }

    if io::stdin().is_terminal() && args.input != "-" {
        let rate = prompt_rate()?;
        if let Some(billing) = cfg.billing(Some(rate), args.minimum_minutes)? {
            return Ok(billing);
        }
    }

    Err(AppError::InvalidRate(
        "no hourly rate given. Pass --rate, run `timebill set-rate`, or set TIMEBILL_HOURLY_RATE."
            .into(),
    ))
}

fn summary_format(input: &str) -> Result<ReportFormat, AppError> {
    match parse_format(input)? {
        format @ (ReportFormat::Text | ReportFormat::Json) => Ok(format),
        other => Err(AppError::Config(format!(
            "Unsupported format '{}' for summary. Use text or json.",
            other.as_label()
        ))),
    }
}

fn summary_lines(summary: &BillingSummary, options: &ReportOptions) -> Vec<String> {
    let (hours, minutes) = summary.billable_breakdown();
    vec![
        format!("sessions: {}", summary.session_minutes.len()),
        format!("total seconds: {}", summary.total_duration_seconds),
        format!("total minutes: {:.2}", summary.total_duration_minutes),
        format!(
            "billable minutes: {:.2}{}",
            summary.billable_minutes,
            if summary.minimum_applied() {
                " (minimum applied)"
            } else {
                ""
            }
        ),
        format!("billable time: {hours}h {minutes}m"),
        format!("hourly rate: {}", options.money(summary.hourly_rate)),
        format!("cost: {}", options.money(summary.cost)),
    ]
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Init => {
            ensure_initialized()?;
            println!("Initialized timebill config at {}", config_path()?.display());
        }
        Commands::SetRate { rate } => {
            let rate = parse_rate(&rate)?;
            ensure_initialized()?;
            let mut cfg = load_stored_config()?;
            cfg.hourly_rate = Some(rate);
            save_config(&cfg)?;
            println!("Hourly rate set to {rate:.2}.");
        }
        Commands::SetMinimum { minutes } => {
            let minutes = billing::validate_minimum(minutes)?;
            ensure_initialized()?;
            let mut cfg = load_stored_config()?;
            cfg.minimum_billable_minutes = minutes;
            save_config(&cfg)?;
            println!("Minimum billable minutes set to {minutes}.");
        }
        Commands::Summary { billing, format } => {
            let output_json = summary_format(&format)? == ReportFormat::Json;
            let cfg = load_config()?;
            let billing_cfg = resolve_billing(&cfg, &billing)?;
            let report = build_report(open_input(&billing.input)?, &billing_cfg)?;

            if output_json {
                println!("{}", serde_json::to_string_pretty(&report.summary)?);
            } else {
                let options = ReportOptions::from(&cfg);
                for line in summary_lines(&report.summary, &options) {
                    println!("{line}");
                }
            }
            debug!(cost = round2(report.summary.cost), "summary printed");
        }
        Commands::Render {
            billing,
            format,
            output,
            auto_name,
        } => {
            let format: ReportFormat = parse_format(&format)?;
            let cfg = load_config()?;
            let billing_cfg = resolve_billing(&cfg, &billing)?;
            let report = build_report(open_input(&billing.input)?, &billing_cfg)?;
            let renderer = renderer_for(format, ReportOptions::from(&cfg));
            debug!(format = format.as_label(), "rendering report");

            let target = if auto_name {
                Some(PathBuf::from(default_output_name(format, &Local::now())))
            } else {
                output.filter(|p| p.as_os_str() != "-")
            };

            match target {
                Some(path) => {
                    write_report_file(&report, renderer.as_ref(), &path)?;
                    eprintln!("Wrote {}", path.display());
                }
                None => {
                    write_report(&report, renderer.as_ref(), &mut io::stdout().lock())?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::aggregate;

    fn args(rate: Option<&str>) -> BillingArgs {
        BillingArgs {
            input: "-".into(),
            rate: rate.map(String::from),
            minimum_minutes: None,
        }
    }

    #[test]
    fn resolve_billing_prefers_cli_rate() {
        let cfg = AppConfig {
            hourly_rate: Some(10.0),
            ..AppConfig::default()
        };
        let billing = resolve_billing(&cfg, &args(Some("45"))).expect("billing");
        assert_eq!(billing.hourly_rate, 45.0);
        assert_eq!(billing.minimum_billable_minutes, 30.0);
    }

    #[test]
    fn resolve_billing_rejects_non_numeric_rate() {
        let err = resolve_billing(&AppConfig::default(), &args(Some("abc"))).expect_err("rate");
        assert!(matches!(err, AppError::InvalidRate(_)));
    }

    #[test]
    fn resolve_billing_without_any_rate_fails_for_stdin_input() {
        let err = resolve_billing(&AppConfig::default(), &args(None)).expect_err("no rate");
        assert!(err.to_string().contains("no hourly rate"));
    }

    #[test]
    fn summary_format_shares_render_format_parsing() {
        assert_eq!(summary_format("TEXT").expect("text"), ReportFormat::Text);
        assert_eq!(summary_format("json").expect("json"), ReportFormat::Json);

        let err = summary_format("pdf").expect_err("unknown");
        assert!(err.to_string().contains("Unsupported format"));
        let err = summary_format("html").expect_err("document only");
        assert!(err.to_string().contains("Unsupported format 'html' for summary"));
    }

    #[test]
    fn negative_positional_values_reach_validation() {
        let cli = Cli::try_parse_from(["timebill", "set-rate", "-5"]).expect("parse");
        assert!(matches!(cli.command, Commands::SetRate { ref rate } if rate == "-5"));

        let cli = Cli::try_parse_from(["timebill", "set-minimum", "-1"]).expect("parse");
        assert!(matches!(cli.command, Commands::SetMinimum { minutes } if minutes == -1.0));
    }

    #[test]
    fn summary_lines_mark_minimum() {
        let summary = aggregate(&[], &BillingConfig::with_rate(40.0)).expect("summary");
        let lines = summary_lines(&summary, &ReportOptions::default());
        assert!(lines.contains(&"billable minutes: 30.00 (minimum applied)".to_string()));
        assert!(lines.contains(&"billable time: 0h 30m".to_string()));
        assert!(lines.contains(&"cost: 20.00 €".to_string()));
    }
}

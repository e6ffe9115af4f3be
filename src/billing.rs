use crate::error::AppError;
use crate::models::{BillingConfig, BillingSummary, Session};
use tracing::debug;

/// Rounds to two decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn validate_rate(rate: f64) -> Result<f64, AppError> {
    if !rate.is_finite() {
        return Err(AppError::InvalidRate(format!("{rate} is not a finite number")));
    }
    if rate < 0.0 {
        return Err(AppError::InvalidRate(format!("{rate} is negative")));
    }
    Ok(rate)
}

pub fn parse_rate(raw: &str) -> Result<f64, AppError> {
    let trimmed = raw.trim();
    let rate = trimmed
        .parse::<f64>()
        .map_err(|_| AppError::InvalidRate(format!("'{trimmed}' is not a number")))?;
    validate_rate(rate)
}

pub fn validate_minimum(minutes: f64) -> Result<f64, AppError> {
    if !minutes.is_finite() || minutes < 0.0 {
        return Err(AppError::Config(format!(
            "minimum_billable_minutes must be a non-negative number, got {minutes}"
        )));
    }
    Ok(minutes)
}

/// Folds sessions into a billing summary.
///
/// Per-session minutes are rounded first and the rounded values are summed,
/// so the total always equals the sum of the printed rows.
pub fn aggregate(sessions: &[Session], cfg: &BillingConfig) -> Result<BillingSummary, AppError> {
    let hourly_rate = validate_rate(cfg.hourly_rate)?;
    let minimum_billable_minutes = validate_minimum(cfg.minimum_billable_minutes)?;

    let session_minutes: Vec<f64> = sessions
        .iter()
        .map(|s| round2(s.duration_seconds / 60.0))
        .collect();
    let total_duration_seconds: f64 = sessions.iter().map(|s| s.duration_seconds).sum();
    let total_duration_minutes: f64 = session_minutes.iter().sum();
    if !total_duration_seconds.is_finite() || !total_duration_minutes.is_finite() {
        return Err(AppError::MalformedLog(
            "total session duration is too large to represent".into(),
        ));
    }

    let billable_minutes = total_duration_minutes.max(minimum_billable_minutes);
    let cost = hourly_rate * billable_minutes / 60.0;
    if !cost.is_finite() {
        return Err(AppError::InvalidRate(format!(
            "{hourly_rate} per hour overflows the cost of {billable_minutes} minutes"
        )));
    }

    debug!(
        sessions = sessions.len(),
        total_duration_minutes, billable_minutes, cost, "aggregated sessions"
    );

    Ok(BillingSummary {
        session_minutes,
        total_duration_seconds,
        total_duration_minutes,
        minimum_billable_minutes,
        billable_minutes,
        hourly_rate,
        cost,
    })
}

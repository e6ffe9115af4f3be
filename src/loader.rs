use crate::error::AppError;
use crate::models::Session;
use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use std::io::Read;
use tracing::debug;

// RFC 3339 is tried first; this covers offsets written without a colon.
const COMPACT_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, COMPACT_OFFSET_FORMAT))
        .ok()
}

fn timestamp_field(
    record: &serde_json::Map<String, Value>,
    index: usize,
    key: &str,
) -> Result<DateTime<FixedOffset>, AppError> {
    let raw = record
        .get(key)
        .ok_or_else(|| AppError::malformed(index, format!("missing '{key}'")))?;
    let Some(text) = raw.as_str() else {
        return Err(AppError::malformed(
            index,
            format!("'{key}' must be a timestamp string"),
        ));
    };
    parse_timestamp(text).ok_or_else(|| {
        AppError::malformed(
            index,
            format!("'{key}' is not an offset-aware timestamp: {text:?}"),
        )
    })
}

fn duration_field(record: &serde_json::Map<String, Value>, index: usize) -> Result<f64, AppError> {
    let raw = record
        .get("duration")
        .ok_or_else(|| AppError::malformed(index, "missing 'duration'"))?;
    let seconds = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| AppError::malformed(index, format!("'duration' is not a number: {raw}")))?;

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(AppError::malformed(
            index,
            format!("'duration' must be a non-negative number, got {seconds}"),
        ));
    }
    Ok(seconds)
}

fn parse_record(index: usize, raw: &Value) -> Result<Session, AppError> {
    let Some(record) = raw.as_object() else {
        return Err(AppError::malformed(index, "record is not an object"));
    };

    let begin = timestamp_field(record, index, "begin")?;
    let end = timestamp_field(record, index, "end")?;
    if end < begin {
        return Err(AppError::malformed(index, "'end' is before 'begin'"));
    }
    let duration_seconds = duration_field(record, index)?;

    Ok(Session {
        begin,
        end,
        duration_seconds,
    })
}

/// Extracts the ordered sessions from an already-decoded log. Any bad record
/// fails the whole load.
pub fn parse_sessions(log: &Value) -> Result<Vec<Session>, AppError> {
    let Some(root) = log.as_object() else {
        return Err(AppError::MalformedLog("expected a JSON object".into()));
    };
    let records = root
        .get("sessions")
        .ok_or_else(|| AppError::MalformedLog("missing 'sessions' key".into()))?
        .as_array()
        .ok_or_else(|| AppError::MalformedLog("'sessions' must be an array".into()))?;

    let sessions = records
        .iter()
        .enumerate()
        .map(|(index, record)| parse_record(index, record))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = sessions.len(), "loaded sessions");
    Ok(sessions)
}

pub fn parse_log(raw: &str) -> Result<Vec<Session>, AppError> {
    let value: Value = serde_json::from_str(raw)?;
    parse_sessions(&value)
}

pub fn read_log(mut reader: impl Read) -> Result<Vec<Session>, AppError> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    parse_log(&raw)
}

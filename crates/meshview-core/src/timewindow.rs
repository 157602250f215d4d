use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use thiserror::Error;

const ABSOLUTE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("unrecognized time expression '{0}'")]
    Unrecognized(String),
    #[error("invalid offset '{offset}' in time expression '{expression}'")]
    InvalidOffset { expression: String, offset: String },
}

/// True iff the expression describes a point anchored to the current time.
/// An end time anchored to "now" is the sole signal that a window is live.
pub fn is_live_window(expression: &str) -> bool {
    expression.contains("now")
}

/// Resolve a time expression against an explicit current-time sample.
///
/// Accepts relative expressions ("now", "now - 15m", "now - 1h - 30m") and
/// absolute timestamps (RFC 3339, "2024-01-01 12:00:00", "2024-01-01 12:00",
/// the last two interpreted as UTC).
pub fn resolve(expression: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, TimeParseError> {
    let trimmed = expression.trim();
    if let Some(offsets) = trimmed.strip_prefix("now") {
        return resolve_relative(trimmed, offsets, now);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }
    for format in ABSOLUTE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(TimeParseError::Unrecognized(trimmed.to_string()))
}

fn resolve_relative(
    expression: &str,
    offsets: &str,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, TimeParseError> {
    let mut instant = now;
    let mut rest = offsets.trim_start();
    while !rest.is_empty() {
        let negative = match rest.as_bytes()[0] {
            b'-' => true,
            b'+' => false,
            _ => return Err(TimeParseError::Unrecognized(expression.to_string())),
        };
        rest = rest[1..].trim_start();

        let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let unit_end = digits_end
            + rest[digits_end..]
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(rest.len() - digits_end);
        let offset = &rest[..unit_end];
        let value: i64 = rest[..digits_end].parse().map_err(|_| invalid(expression, offset))?;
        let unit = &rest[digits_end..unit_end];
        let delta = offset_duration(value, unit).ok_or_else(|| invalid(expression, offset))?;

        instant = if negative {
            instant.checked_sub_signed(delta)
        } else {
            instant.checked_add_signed(delta)
        }
        .ok_or_else(|| invalid(expression, offset))?;
        rest = rest[unit_end..].trim_start();
    }
    Ok(instant)
}

fn invalid(expression: &str, offset: &str) -> TimeParseError {
    TimeParseError::InvalidOffset {
        expression: expression.to_string(),
        offset: offset.to_string(),
    }
}

// "m" is minutes and "M" months, matching the picker's grammar. Offsets
// whose second count overflows i64 or chrono's duration range yield None;
// expressions are attacker-reachable via query-string overrides, so
// overflow must surface as a parse error rather than a panic.
fn offset_duration(value: i64, unit: &str) -> Option<Duration> {
    let scale: i64 = match unit {
        "s" | "sec" | "second" | "seconds" => 1,
        "m" | "min" | "minute" | "minutes" => 60,
        "h" | "hour" | "hours" => 3_600,
        "d" | "day" | "days" => 86_400,
        "w" | "week" | "weeks" => 7 * 86_400,
        "M" | "month" | "months" => 30 * 86_400,
        "y" | "year" | "years" => 365 * 86_400,
        _ => return None,
    };
    Duration::try_seconds(value.checked_mul(scale)?)
}

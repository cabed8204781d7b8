//! Retention period parsing: `<n>d` day form plus the standard `1h30m` grammar.

use std::time::Duration;

use crate::core::errors::{FkError, Result};

const SECS_PER_DAY: u64 = 24 * 60 * 60;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Parse a retention period such as `30d`, `24h`, `90m` or `1h30m`.
///
/// A trailing `d` selects the day form: the prefix must be a non-negative
/// base-10 integer. Anything else goes through the standard grammar, a
/// sequence of `<decimal><unit>` terms with units `ns`, `us`/`µs`, `ms`, `s`,
/// `m` and `h`. Negative values and empty input are rejected.
pub fn parse_retention_period(raw: &str) -> Result<Duration> {
    if let Some(prefix) = raw.strip_suffix('d') {
        return parse_days(prefix).ok_or_else(|| invalid(raw, "invalid day format"));
    }
    parse_standard(raw).map_err(|details| invalid(raw, &details))
}

fn parse_days(prefix: &str) -> Option<Duration> {
    let days: u64 = prefix.parse().ok()?;
    days.checked_mul(SECS_PER_DAY).map(Duration::from_secs)
}

fn parse_standard(s: &str) -> std::result::Result<Duration, String> {
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    let mut rest = s;
    if rest.starts_with('-') {
        return Err("negative durations are not allowed".to_string());
    }
    if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err("missing value".to_string());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (int_part, after) = split_digits(rest);
        let (frac_part, after) = match after.strip_prefix('.') {
            Some(frac) => split_digits(frac),
            None => ("", after),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(format!("expected a number at {rest:?}"));
        }

        let unit_end = after
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, next) = after.split_at(unit_end);
        let unit_nanos = unit_nanos(unit)?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| format!("value {int_part:?} out of range"))?
        };
        let mut term = whole
            .checked_mul(unit_nanos)
            .ok_or_else(|| "duration out of range".to_string())?;

        let mut scale = unit_nanos;
        for digit in frac_part.bytes() {
            scale /= 10;
            if scale == 0 {
                break;
            }
            term += u128::from(digit - b'0') * scale;
        }

        total = total
            .checked_add(term)
            .ok_or_else(|| "duration out of range".to_string())?;
        rest = next;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| "duration out of range")?;
    // Remainder of a division by 1e9 always fits in u32.
    let nanos = u32::try_from(total % NANOS_PER_SEC).unwrap_or(0);
    Ok(Duration::new(secs, nanos))
}

fn split_digits(s: &str) -> (&str, &str) {
    s.split_at(s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len()))
}

fn unit_nanos(unit: &str) -> std::result::Result<u128, String> {
    Ok(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        "h" => 3_600 * NANOS_PER_SEC,
        "" => return Err("missing unit".to_string()),
        other => return Err(format!("unknown unit {other:?}")),
    })
}

fn invalid(raw: &str, details: &str) -> FkError {
    FkError::InvalidRetention {
        value: raw.to_string(),
        details: details.to_string(),
    }
}

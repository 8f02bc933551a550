// Tolerant decoders for Grocy's loosely typed JSON.
//
// Depending on server version and database driver, Grocy emits numbers as
// JSON numbers or numeric strings, booleans as `0`/`1`, and absent
// timestamps or notes as empty strings. Use with
// `#[serde(default, deserialize_with = "lenient::...")]`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a Grocy local timestamp. Bare dates resolve to midnight.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| parse_date(raw).map(|d| d.and_time(NaiveTime::MIN)))
}

/// Parse the date part of a Grocy date or timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

pub(crate) fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

#[allow(clippy::as_conversions, clippy::cast_possible_truncation)]
pub(crate) fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        // Some Grocy builds emit ids as `7.0`
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

pub fn f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(d)?;
    if is_blank(&value) {
        return Ok(0.0);
    }
    value_as_f64(&value).ok_or_else(|| D::Error::custom(format!("expected a number, got {value}")))
}

pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(d)?;
    if is_blank(&value) {
        return Ok(None);
    }
    value_as_f64(&value)
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("expected a number, got {value}")))
}

pub fn i64<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(d)?;
    value_as_i64(&value).ok_or_else(|| D::Error::custom(format!("expected an integer, got {value}")))
}

pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let value = Value::deserialize(d)?;
    if is_blank(&value) {
        return Ok(None);
    }
    value_as_i64(&value)
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("expected an integer, got {value}")))
}

pub fn bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match &value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.trim(), "1" | "true" | "True"),
        _ => false,
    })
}

pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub fn opt_datetime<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
    let value = Value::deserialize(d)?;
    match &value {
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => parse_datetime(s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp {s:?}"))),
        Value::Null => Ok(None),
        other => Err(D::Error::custom(format!("expected a timestamp, got {other}"))),
    }
}

pub fn opt_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    let value = Value::deserialize(d)?;
    match &value {
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => parse_date(s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date {s:?}"))),
        Value::Null => Ok(None),
        other => Err(D::Error::custom(format!("expected a date, got {other}"))),
    }
}

pub fn date<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
    opt_date(d)?.ok_or_else(|| D::Error::custom("missing date"))
}

/// Serialize timestamps back in Grocy's own `YYYY-MM-DD HH:MM:SS` form.
pub mod grocy_datetime {
    use chrono::NaiveDateTime;
    use serde::Serializer;

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => s.collect_str(&ts.format(FORMAT)),
            None => s.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "f64")]
        amount: f64,
        #[serde(default, deserialize_with = "opt_i64")]
        location: Option<i64>,
        #[serde(default, deserialize_with = "bool")]
        flag: bool,
        #[serde(default, deserialize_with = "opt_datetime")]
        when: Option<NaiveDateTime>,
    }

    #[test]
    fn accepts_numeric_strings_and_numbers() {
        let s: Sample = serde_json::from_str(r#"{"amount":"2.5","location":"3","flag":"1"}"#).unwrap();
        assert!((s.amount - 2.5).abs() < f64::EPSILON);
        assert_eq!(s.location, Some(3));
        assert!(s.flag);

        let s: Sample = serde_json::from_str(r#"{"amount":4,"location":7.0,"flag":0}"#).unwrap();
        assert!((s.amount - 4.0).abs() < f64::EPSILON);
        assert_eq!(s.location, Some(7));
        assert!(!s.flag);
    }

    #[test]
    fn empty_strings_are_absent() {
        let s: Sample = serde_json::from_str(r#"{"amount":"","location":"","when":""}"#).unwrap();
        assert!(s.amount.abs() < f64::EPSILON);
        assert_eq!(s.location, None);
        assert_eq!(s.when, None);
    }

    #[test]
    fn parses_grocy_timestamps() {
        let ts = parse_datetime("2024-03-05 18:30:00").unwrap();
        assert_eq!(ts.to_string(), "2024-03-05 18:30:00");
        let midnight = parse_datetime("2024-03-05").unwrap();
        assert_eq!(midnight.to_string(), "2024-03-05 00:00:00");
        assert_eq!(
            parse_date("2024-03-05 18:30:00"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert!(parse_datetime("yesterday").is_none());
    }
}

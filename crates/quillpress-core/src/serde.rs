//! Deserializers for query-string parameters.
//!
//! Query strings arrive as text, and flattened structs lose the type hints
//! `serde_urlencoded` would otherwise use, so every typed query field goes
//! through one of these helpers. Empty values are treated as absent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

/// Keeps the value as sent; only an empty string is absent.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.is_empty()))
}

/// Reads a leading integer and never fails.
///
/// An optional sign followed by digits is taken from the start of the value
/// and the rest is ignored (`"12abc"` is 12). A value without leading digits
/// is absent, and one too large for `i64` saturates so callers can clamp it.
pub fn deserialize_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_empty(deserializer)?.and_then(|s| parse_leading_i64(&s)))
}

fn parse_leading_i64(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    let saturated = if negative { i64::MIN } else { i64::MAX };
    let value = rest[..digits].bytes().try_fold(0i64, |acc, b| {
        let digit = i64::from(b - b'0');
        let acc = acc.checked_mul(10)?;
        if negative {
            acc.checked_sub(digit)
        } else {
            acc.checked_add(digit)
        }
    });
    Some(value.unwrap_or(saturated))
}

pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    match non_empty(deserializer)? {
        Some(s) => Uuid::parse_str(s.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

pub fn deserialize_optional_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match non_empty(deserializer)? {
        Some(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!(
                "invalid boolean `{}`",
                other
            ))),
        },
        None => Ok(None),
    }
}

/// Parses any [`FromStr`] value, e.g. a status enum.
pub fn deserialize_optional_parsed<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match non_empty(deserializer)? {
        Some(s) => s
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Parses a comma-separated list of UUIDs (`tag_ids=a,b,c`).
pub fn deserialize_optional_uuid_list<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    match non_empty(deserializer)? {
        Some(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| Uuid::parse_str(part).map_err(serde::de::Error::custom))
            .collect::<Result<Vec<_>, _>>()
            .map(|ids| if ids.is_empty() { None } else { Some(ids) }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Query {
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        search: Option<String>,
        #[serde(default, deserialize_with = "deserialize_optional_bool")]
        published: Option<bool>,
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        author_id: Option<Uuid>,
        #[serde(default, deserialize_with = "deserialize_optional_uuid_list")]
        tag_ids: Option<Vec<Uuid>>,
        #[serde(default, deserialize_with = "deserialize_optional_parsed")]
        count: Option<u8>,
    }

    #[test]
    fn test_empty_values_are_absent() {
        let json = r#"{"search":"","published":"","author_id":"","tag_ids":""}"#;
        let q: Query = serde_json::from_str(json).unwrap();
        assert!(q.search.is_none());
        assert!(q.published.is_none());
        assert!(q.author_id.is_none());
        assert!(q.tag_ids.is_none());
    }

    #[test]
    fn test_search_whitespace_is_kept() {
        let q: Query = serde_json::from_str(r#"{"search":" rust "}"#).unwrap();
        assert_eq!(q.search.as_deref(), Some(" rust "));
    }

    #[test]
    fn test_missing_values_are_absent() {
        let q: Query = serde_json::from_str("{}").unwrap();
        assert!(q.search.is_none());
        assert!(q.tag_ids.is_none());
    }

    #[test]
    fn test_leading_integer_parsing() {
        assert_eq!(parse_leading_i64("42"), Some(42));
        assert_eq!(parse_leading_i64(" 7 "), Some(7));
        assert_eq!(parse_leading_i64("12abc"), Some(12));
        assert_eq!(parse_leading_i64("2.5"), Some(2));
        assert_eq!(parse_leading_i64("-3"), Some(-3));
        assert_eq!(parse_leading_i64("+5"), Some(5));
        assert_eq!(parse_leading_i64("abc"), None);
        assert_eq!(parse_leading_i64("-"), None);
        assert_eq!(parse_leading_i64("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_leading_i64("-99999999999999999999"), Some(i64::MIN));
        assert_eq!(parse_leading_i64("-9223372036854775808"), Some(i64::MIN));
    }

    #[test]
    fn test_bool_parsing() {
        let q: Query = serde_json::from_str(r#"{"published":"true"}"#).unwrap();
        assert_eq!(q.published, Some(true));
        let q: Query = serde_json::from_str(r#"{"published":"FALSE"}"#).unwrap();
        assert_eq!(q.published, Some(false));
        assert!(serde_json::from_str::<Query>(r#"{"published":"yes"}"#).is_err());
    }

    #[test]
    fn test_uuid_list_parsing() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let json = format!(r#"{{"tag_ids":"{}, {}"}}"#, a, b);
        let q: Query = serde_json::from_str(&json).unwrap();
        assert_eq!(q.tag_ids, Some(vec![a, b]));

        assert!(serde_json::from_str::<Query>(r#"{"tag_ids":"nope"}"#).is_err());
    }

    #[test]
    fn test_parsed_values() {
        let q: Query = serde_json::from_str(r#"{"count":" 7 "}"#).unwrap();
        assert_eq!(q.count, Some(7));
        assert!(serde_json::from_str::<Query>(r#"{"count":"300"}"#).is_err());
    }

    #[test]
    fn test_invalid_uuid_rejected() {
        assert!(serde_json::from_str::<Query>(r#"{"author_id":"abc"}"#).is_err());
    }
}

//! Field decoders for what the reporting API actually sends: `null` where a
//! value is expected, and numbers encoded as strings.
//!
//! A value that cannot be read degrades to absent (blank cell, zero month)
//! instead of failing the whole report.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Number from a JSON number or a numeric string.
pub fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(number_of(&Value::deserialize(d)?))
}

/// Row numbers (`sl_no`, `sr_no`).
pub fn index<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Ok(number_of(&Value::deserialize(d)?)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round() as u64))
}

/// Label text; `null` reads as empty.
pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    })
}

fn numbers(raw: BTreeMap<String, Value>) -> BTreeMap<String, f64> {
    raw.into_iter()
        .filter_map(|(key, value)| number_of(&value).map(|n| (key, n)))
        .collect()
}

/// Key to number map. Unreadable entries are dropped so they read as zero.
pub fn number_map<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, f64>, D::Error> {
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(d)?;
    Ok(raw.map(numbers).unwrap_or_default())
}

pub fn opt_number_map<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<BTreeMap<String, f64>>, D::Error> {
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(d)?;
    Ok(raw.map(numbers))
}

/// Month keys. `null` stays `None`; non-string entries are dropped.
pub fn months<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
    let raw: Option<Vec<Value>> = Option::deserialize(d)?;
    Ok(raw.map(|list| {
        list.into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect()
    }))
}

/// Lists and nested objects; `null` reads as the default.
pub fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Month to record map; `null` records are dropped.
pub fn entries<'de, D, T>(d: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(opt_entries(d)?.unwrap_or_default())
}

pub fn opt_entries<'de, D, T>(d: D) -> Result<Option<BTreeMap<String, T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw: Option<BTreeMap<String, Option<T>>> = Option::deserialize(d)?;
    Ok(raw.map(|map| {
        map.into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect()
    }))
}

//! Map provider JSON to domain entities.
//!
//! Providers disagree on envelope and field names, so every lookup tries a
//! short list of known shapes and takes the first that exists.

use crate::domain::{ActivityEntry, ProfileSummary};
use serde_json::Value;

/// Follow a path of object keys.
fn at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(*key))
}

/// First present, non-null value among the given paths.
fn first_of<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|p| at(value, p))
        .find(|v| !v.is_null())
}

/// Numbers, or strings holding a number.
fn as_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn as_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Profile from `userInfos`, `data.userInfos`, `user.userInfos` or `profile`.
pub fn profile_from_json(value: &Value) -> ProfileSummary {
    let Some(infos) = first_of(
        value,
        &[
            &["userInfos"],
            &["data", "userInfos"],
            &["user", "userInfos"],
            &["profile"],
        ],
    ) else {
        return ProfileSummary::default();
    };

    ProfileSummary {
        first_name: as_text(infos.get("firstName")),
        age: as_number(infos.get("age"))
            .filter(|a| *a >= 0.0)
            .map(|a| a.round() as u32),
    }
}

fn entry_from_json(value: &Value) -> ActivityEntry {
    ActivityEntry {
        day: as_text(first_of(value, &[&["day"], &["date"]])),
        kilogram: as_number(first_of(value, &[&["kilogram"], &["weight"]])),
        calories: as_number(first_of(value, &[&["calories"], &["caloriesBurned"]])),
    }
}

/// Activity entries from `sessions`, `data.sessions`, `data`, `userActivity.sessions`
/// or a bare array. Non-array shapes yield no entries.
pub fn activity_from_json(value: &Value) -> Vec<ActivityEntry> {
    let sessions = if value.is_array() {
        Some(value)
    } else {
        first_of(
            value,
            &[
                &["sessions"],
                &["data", "sessions"],
                &["data"],
                &["userActivity", "sessions"],
            ],
        )
    };

    sessions
        .and_then(Value::as_array)
        .map(|items| items.iter().map(entry_from_json).collect())
        .unwrap_or_default()
}

//! iCalendar (RFC 5545) export of an assembled plan.
//!
//! Output is deterministic: the same plan always yields the same bytes.
//! Lines are CRLF-separated; no line folding is applied.

use crate::domain::entities::{DEFAULT_START_TIME, DEFAULT_TIME_ZONE, Session, TrainingPlan};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

pub const CALENDAR_DISPOSITION: &str = "attachment; filename=\"training-plan.ics\"";
pub const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

const PRODID: &str = "PRODID:-//stride-plan//Training Plan//EN";
const UID_DOMAIN: &str = "@stride-plan";
const DEFAULT_SUMMARY: &str = "Training";

const MIN_EVENT_MINUTES: u32 = 30;
const MAX_EVENT_MINUTES: u32 = 180;
/// Used when a session has neither a duration nor a distance.
const UNKNOWN_VOLUME_MINUTES: u32 = 60;
/// Distance-to-time heuristic.
const MINUTES_PER_KM: f64 = 6.0;

/// VTIMEZONE for the default zone (EU daylight-saving rules).
const VTIMEZONE_EUROPE_PARIS: &[&str] = &[
    "BEGIN:VTIMEZONE",
    "TZID:Europe/Paris",
    "X-LIC-LOCATION:Europe/Paris",
    "BEGIN:DAYLIGHT",
    "TZOFFSETFROM:+0100",
    "TZOFFSETTO:+0200",
    "TZNAME:CEST",
    "DTSTART:19700329T020000",
    "RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=-1SU",
    "END:DAYLIGHT",
    "BEGIN:STANDARD",
    "TZOFFSETFROM:+0200",
    "TZOFFSETTO:+0100",
    "TZNAME:CET",
    "DTSTART:19701025T030000",
    "RRULE:FREQ=YEARLY;BYMONTH=10;BYDAY=-1SU",
    "END:STANDARD",
    "END:VTIMEZONE",
];

const VALARM: &[&str] = &[
    "BEGIN:VALARM",
    "TRIGGER:-PT30M",
    "ACTION:DISPLAY",
    "DESCRIPTION:Training reminder",
    "END:VALARM",
];

/// Escape a TEXT value: backslash, newline, comma, semicolon. Carriage returns are dropped.
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            other => out.push(other),
        }
    }
    out
}

/// Event length: explicit duration, else distance × 6 min/km, else 60; clamped to [30, 180].
///
/// A zero duration defers to a positive distance but otherwise counts as given.
pub fn estimate_duration_minutes(duration_minutes: Option<u32>, distance_km: Option<f64>) -> u32 {
    let estimate = match (duration_minutes, distance_km) {
        (Some(d), _) if d > 0 => d,
        (_, Some(km)) if km.is_finite() && km > 0.0 => {
            (km * MINUTES_PER_KM).round().min(f64::from(u32::MAX)) as u32
        }
        (Some(d), _) => d,
        (None, _) => UNKNOWN_VOLUME_MINUTES,
    };
    estimate.clamp(MIN_EVENT_MINUTES, MAX_EVENT_MINUTES)
}

/// Strict `YYYY-MM-DD` that is also a real calendar date.
fn parse_session_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_start_time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(DEFAULT_START_TIME, "%H:%M"))
        .unwrap_or(NaiveTime::MIN)
}

fn format_local(dt: NaiveDateTime) -> String {
    dt.format("%Y%m%dT%H%M%S").to_string()
}

/// Description paragraphs in a fixed order; absent fields are omitted.
fn description(session: &Session) -> String {
    let slot = &session.slot;
    let labelled = [
        ("Goal", slot.session_goal.as_str()),
        ("Intensity", slot.intensity.as_str()),
        ("Warm-up", slot.details.warmup.as_str()),
        ("Main set", slot.details.main.as_str()),
        ("Cool-down", slot.details.cooldown.as_str()),
    ];
    let mut parts: Vec<String> = labelled
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(label, v)| format!("{label}: {v}"))
        .collect();
    if !slot.tips.is_empty() {
        parts.push(format!("Tips: {}", slot.tips.join(" | ")));
    }
    parts.join("\n\n")
}

/// Serialize a plan to an iCalendar document.
///
/// Sessions without a valid date are skipped. Sessions without an id get
/// `S-{n}`, numbered in document order.
pub fn to_ics(plan: &TrainingPlan) -> String {
    let with_zone = plan.meta.time_zone == DEFAULT_TIME_ZONE;

    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".to_string(),
        PRODID.to_string(),
        "VERSION:2.0".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
    ];
    if with_zone {
        lines.extend(VTIMEZONE_EUROPE_PARIS.iter().map(|l| (*l).to_string()));
    }

    let mut fallback_ids = 0u32;
    for session in plan.weeks.iter().flat_map(|w| w.sessions.iter()) {
        let Some(date) = parse_session_date(&session.date) else {
            continue;
        };

        let start = date.and_time(parse_start_time(&session.start_time));
        let minutes = estimate_duration_minutes(
            session.slot.duration_minutes,
            session.slot.target_distance_km,
        );
        let end = start + Duration::minutes(i64::from(minutes));

        let id = if session.id.is_empty() {
            fallback_ids += 1;
            format!("S-{fallback_ids}")
        } else {
            session.id.clone()
        };
        let summary = if session.title.is_empty() {
            DEFAULT_SUMMARY
        } else {
            session.title.as_str()
        };

        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}{UID_DOMAIN}", escape_text(&id)));
        lines.push(format!("SUMMARY:{}", escape_text(summary)));
        if with_zone {
            lines.push(format!("DTSTART;TZID={DEFAULT_TIME_ZONE}:{}", format_local(start)));
            lines.push(format!("DTEND;TZID={DEFAULT_TIME_ZONE}:{}", format_local(end)));
        } else {
            lines.push(format!("DTSTART:{}", format_local(start)));
            lines.push(format!("DTEND:{}", format_local(end)));
        }
        lines.push(format!("DESCRIPTION:{}", escape_text(&description(session))));
        lines.extend(VALARM.iter().map(|l| (*l).to_string()));
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());
    lines.join("\r\n")
}

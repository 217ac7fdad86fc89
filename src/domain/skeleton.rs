//! Weekly skeleton: the authoritative structure of every plan.
//!
//! Days, session types and durations are decided here and nowhere else.
//! Text fields start empty and are filled by enrichment.

use crate::domain::entities::{DayOfWeek, Level, ObjectiveBucket, SessionType, TemplateSession};

pub const MIN_SESSIONS_PER_WEEK: u8 = 2;
pub const MAX_SESSIONS_PER_WEEK: u8 = 5;
pub const DEFAULT_SESSIONS_PER_WEEK: u8 = 3;

/// Days used when availability is missing or too short.
pub const DEFAULT_ROTATION: [DayOfWeek; 4] = [
    DayOfWeek::Monday,
    DayOfWeek::Wednesday,
    DayOfWeek::Friday,
    DayOfWeek::Sunday,
];

/// Desired sessions per week: explicit request, else one per availability entry,
/// else the default. Always clamped to [2, 5].
pub fn sessions_per_week(requested: Option<u8>, availability_len: usize) -> u8 {
    let wanted = match requested {
        Some(n) => n as usize,
        None if availability_len > 0 => availability_len,
        None => DEFAULT_SESSIONS_PER_WEEK as usize,
    };
    wanted.clamp(
        MIN_SESSIONS_PER_WEEK as usize,
        MAX_SESSIONS_PER_WEEK as usize,
    ) as u8
}

/// Pick `count` days: normalized, deduplicated availability first (in the order given),
/// then unused rotation days, then the rotation cycled.
pub fn pick_days(availability: &[String], count: usize) -> Vec<DayOfWeek> {
    let mut days: Vec<DayOfWeek> = Vec::with_capacity(count);
    for day in availability.iter().filter_map(|a| DayOfWeek::normalize(a)) {
        if days.len() == count {
            break;
        }
        if !days.contains(&day) {
            days.push(day);
        }
    }

    let missing = count.saturating_sub(days.len());
    let unused: Vec<DayOfWeek> = DEFAULT_ROTATION
        .iter()
        .copied()
        .filter(|d| !days.contains(d))
        .collect();
    days.extend(
        unused
            .into_iter()
            .chain(DEFAULT_ROTATION.iter().copied().cycle())
            .take(missing),
    );
    days
}

/// Ordered type pattern for a (bucket, level) pair.
pub fn type_pattern(bucket: ObjectiveBucket, level: Level) -> [SessionType; 3] {
    use SessionType::*;
    let beginner = level == Level::Beginner;
    match bucket {
        ObjectiveBucket::Weightloss if beginner => [Endurance, Strength, Endurance],
        ObjectiveBucket::Weightloss => [Interval, Strength, Endurance],
        ObjectiveBucket::Running if beginner => [Endurance, Endurance, Interval],
        ObjectiveBucket::Running => [Interval, Endurance, LongRun],
        ObjectiveBucket::Strength => [Strength, Strength, Endurance],
        ObjectiveBucket::Recovery => [Recovery, Endurance, Recovery],
        ObjectiveBucket::General => [Endurance, Strength, Endurance],
    }
}

pub fn level_multiplier(level: Level) -> f64 {
    match level {
        Level::Beginner | Level::Unknown => 1.0,
        Level::Intermediate => 1.1,
        Level::Advanced => 1.25,
    }
}

pub fn duration_minutes(session_type: SessionType, level: Level) -> u32 {
    (session_type.base_minutes() * level_multiplier(level)).round() as u32
}

/// Build one week of structural slots, one per (day, type) pair.
pub fn build_skeleton(
    bucket: ObjectiveBucket,
    level: Level,
    availability: &[String],
    sessions_per_week: u8,
) -> Vec<TemplateSession> {
    let count = sessions_per_week.clamp(MIN_SESSIONS_PER_WEEK, MAX_SESSIONS_PER_WEEK) as usize;
    let days = pick_days(availability, count);
    let types = type_pattern(bucket, level)
        .into_iter()
        .chain(std::iter::repeat(SessionType::Endurance))
        .take(count);

    days.into_iter()
        .zip(types)
        .map(|(day, session_type)| {
            TemplateSession::structural(
                day,
                session_type,
                Some(duration_minutes(session_type, level)),
                None,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(input: &[&str]) -> Vec<String> {
        input.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sessions_per_week_clamped() {
        assert_eq!(sessions_per_week(None, 0), 3);
        assert_eq!(sessions_per_week(None, 1), 2);
        assert_eq!(sessions_per_week(None, 4), 4);
        assert_eq!(sessions_per_week(None, 7), 5);
        assert_eq!(sessions_per_week(Some(0), 3), 2);
        assert_eq!(sessions_per_week(Some(9), 3), 5);
    }

    #[test]
    fn test_pick_days_normalizes_and_dedupes() {
        let picked = pick_days(&days(&["Lundi", "lundi", "xyz", "Mercredi", "Vendredi"]), 3);
        assert_eq!(
            picked,
            vec![DayOfWeek::Monday, DayOfWeek::Wednesday, DayOfWeek::Friday]
        );
    }

    #[test]
    fn test_pick_days_pads_with_unused_rotation() {
        let picked = pick_days(&days(&["Wednesday"]), 3);
        assert_eq!(
            picked,
            vec![DayOfWeek::Wednesday, DayOfWeek::Monday, DayOfWeek::Friday]
        );
    }

    #[test]
    fn test_pick_days_without_availability_cycles_rotation() {
        let picked = pick_days(&[], 5);
        assert_eq!(
            picked,
            vec![
                DayOfWeek::Monday,
                DayOfWeek::Wednesday,
                DayOfWeek::Friday,
                DayOfWeek::Sunday,
                DayOfWeek::Monday,
            ]
        );
    }

    #[test]
    fn test_pick_days_truncates() {
        let picked = pick_days(&days(&["tue", "thu", "sat", "sun"]), 2);
        assert_eq!(picked, vec![DayOfWeek::Tuesday, DayOfWeek::Thursday]);
    }

    #[test]
    fn test_durations_by_level() {
        assert_eq!(duration_minutes(SessionType::Endurance, Level::Beginner), 40);
        assert_eq!(duration_minutes(SessionType::Interval, Level::Intermediate), 39);
        assert_eq!(duration_minutes(SessionType::LongRun, Level::Advanced), 81);
        assert_eq!(duration_minutes(SessionType::Recovery, Level::Unknown), 30);
        assert_eq!(duration_minutes(SessionType::Strength, Level::Advanced), 50);
    }

    #[test]
    fn test_running_beginner_skeleton() {
        let sk = build_skeleton(
            ObjectiveBucket::Running,
            Level::Beginner,
            &days(&["Lundi", "Mercredi", "Vendredi"]),
            3,
        );
        let types: Vec<SessionType> = sk.iter().map(|s| s.session_type).collect();
        assert_eq!(
            types,
            vec![
                SessionType::Endurance,
                SessionType::Endurance,
                SessionType::Interval
            ]
        );
        assert_eq!(sk[0].day_of_week, DayOfWeek::Monday);
        assert_eq!(sk[2].duration_minutes, Some(35));
        assert!(sk.iter().all(|s| s.target_distance_km.is_none()));
        assert!(sk.iter().all(|s| s.intensity.is_empty() && s.tips.is_empty()));
    }

    #[test]
    fn test_pattern_padded_with_endurance() {
        let sk = build_skeleton(ObjectiveBucket::Strength, Level::Advanced, &[], 5);
        let types: Vec<SessionType> = sk.iter().map(|s| s.session_type).collect();
        assert_eq!(
            types,
            vec![
                SessionType::Strength,
                SessionType::Strength,
                SessionType::Endurance,
                SessionType::Endurance,
                SessionType::Endurance,
            ]
        );
    }

    #[test]
    fn test_pattern_truncated() {
        let sk = build_skeleton(ObjectiveBucket::Recovery, Level::Intermediate, &[], 2);
        assert_eq!(sk.len(), 2);
        assert_eq!(sk[0].session_type, SessionType::Recovery);
        assert_eq!(sk[1].session_type, SessionType::Endurance);
        assert_eq!(sk[0].duration_minutes, Some(33));
    }
}

//! Fitness-level inference from recent activity.

use crate::domain::entities::{ActivityStats, ActivitySummary, Level};

/// Count sessions with any reading and average the calorie readings
/// over the most recent history.
pub fn compute_stats(summary: &ActivitySummary) -> ActivityStats {
    let start = summary
        .last10
        .len()
        .saturating_sub(ActivitySummary::HISTORY_LEN);
    let recent = &summary.last10[start..];

    let sessions_count = recent
        .iter()
        .filter(|s| s.calories.is_some() || s.kilogram.is_some())
        .count();

    let calories: Vec<f64> = recent
        .iter()
        .filter_map(|s| s.calories)
        .filter(|c| c.is_finite())
        .collect();
    let avg_calories = if calories.is_empty() {
        0.0
    } else {
        calories.iter().sum::<f64>() / calories.len() as f64
    };

    ActivityStats {
        sessions_count,
        avg_calories,
    }
}

/// Decision table, first match wins.
pub fn level_from_stats(stats: &ActivityStats) -> Level {
    if stats.sessions_count == 0 {
        Level::Unknown
    } else if stats.sessions_count <= 2 || stats.avg_calories < 180.0 {
        Level::Beginner
    } else if stats.sessions_count >= 8 || stats.avg_calories > 420.0 {
        Level::Advanced
    } else {
        Level::Intermediate
    }
}

pub fn detect_level(summary: &ActivitySummary) -> Level {
    level_from_stats(&compute_stats(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ActivityEntry;

    fn summary(calories: &[Option<f64>]) -> ActivitySummary {
        ActivitySummary {
            last10: calories
                .iter()
                .map(|c| ActivityEntry {
                    day: None,
                    kilogram: None,
                    calories: *c,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_history_is_unknown() {
        assert_eq!(detect_level(&ActivitySummary::default()), Level::Unknown);
        assert_eq!(detect_level(&summary(&[None, None])), Level::Unknown);
    }

    #[test]
    fn test_few_sessions_is_beginner() {
        assert_eq!(detect_level(&summary(&[Some(500.0), Some(500.0)])), Level::Beginner);
    }

    #[test]
    fn test_low_calories_is_beginner_even_with_many_sessions() {
        let s = summary(&[Some(150.0); 9]);
        assert_eq!(detect_level(&s), Level::Beginner);
    }

    #[test]
    fn test_many_sessions_is_advanced() {
        let s = summary(&[Some(250.0); 8]);
        assert_eq!(detect_level(&s), Level::Advanced);
    }

    #[test]
    fn test_high_calories_is_advanced() {
        let s = summary(&[Some(450.0), Some(430.0), Some(440.0)]);
        assert_eq!(detect_level(&s), Level::Advanced);
    }

    #[test]
    fn test_middle_is_intermediate() {
        let s = summary(&[Some(300.0), Some(250.0), Some(350.0), Some(300.0)]);
        assert_eq!(detect_level(&s), Level::Intermediate);
    }

    #[test]
    fn test_weight_only_entries_count_as_sessions() {
        let s = ActivitySummary {
            last10: vec![
                ActivityEntry {
                    day: None,
                    kilogram: Some(70.0),
                    calories: None,
                };
                3
            ],
            ..Default::default()
        };
        let stats = compute_stats(&s);
        assert_eq!(stats.sessions_count, 3);
        assert_eq!(stats.avg_calories, 0.0);
        assert_eq!(level_from_stats(&stats), Level::Beginner);
    }

    #[test]
    fn test_only_last_ten_are_considered() {
        let mut cals = vec![Some(100.0); 5];
        cals.extend(vec![Some(300.0); 10]);
        let stats = compute_stats(&summary(&cals));
        assert_eq!(stats.sessions_count, 10);
        assert_eq!(stats.avg_calories, 300.0);
    }
}

//! Objective classification: sport/fitness gate, bucket, realism check.
//!
//! Vocabulary covers French and English phrasing. Matching is done on the
//! lowercased objective.

use crate::domain::entities::{ObjectiveBucket, Warning, WarningType};
use regex::Regex;
use std::sync::LazyLock;

/// Broad gate: anything that does not mention sport or fitness is rejected upstream.
static SPORT_GATE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(sport|course|running|\brun|jog|endurance|fractionn|interval|renfo|muscu|muscle|",
        r"strength|force|cardio|marathon|semi|half|\d+\s?km|perte\s*de\s*poids|weight\s*loss|",
        r"lose\s*weight|maigr|fitness|récup|recup|recovery|étirement|etirement|stretch|",
        r"natation|swim|vélo|velo|cycling|bike|hiit|gainage|\bcore\b|yoga|tonif)"
    ))
    .ok()
});

static WEIGHTLOSS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(maigr|perte\s*de\s*poids|br[uû]ler|weight\s*loss|lose\s*weight|burn|slim)").ok()
});

static RUNNING: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(endurance|\d+\s?km|semi|half|marathon|course|running|\brun|jog)").ok()
});

static STRENGTH: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(muscle|muscu|renfo|tonif|force|strength|gainage|\bcore\b)").ok()
});

static RECOVERY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(r[ée]cup|recovery|fatigue|sommeil|sleep|stretch|[ée]tirement|mobility)").ok()
});

/// Safer objective suggested to the user when the goal is unrealistic for six weeks.
pub const SUGGESTED_OBJECTIVE: &str = "Half marathon (or 10 km)";

/// Working objective passed downstream instead of the user's literal text.
pub const SUBSTITUTED_OBJECTIVE: &str = "Prepare a half marathon (intermediate goal)";

/// Result of classifying an objective. Computed once per request.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveAssessment {
    pub bucket: ObjectiveBucket,
    /// Objective text used by every downstream component.
    pub working_objective: String,
    pub warning: Option<Warning>,
}

fn matches(re: &LazyLock<Option<Regex>>, text: &str) -> bool {
    re.as_ref().is_some_and(|r| r.is_match(text))
}

/// True if the objective mentions any sport/fitness keyword.
pub fn is_sport_objective(objective: &str) -> bool {
    matches(&SPORT_GATE, &objective.to_lowercase())
}

/// Bucket for an objective. First match wins, in the order
/// weightloss, running, strength, recovery; `General` otherwise.
pub fn bucket_for(objective: &str) -> ObjectiveBucket {
    let o = objective.to_lowercase();
    if matches(&WEIGHTLOSS, &o) {
        ObjectiveBucket::Weightloss
    } else if matches(&RUNNING, &o) {
        ObjectiveBucket::Running
    } else if matches(&STRENGTH, &o) {
        ObjectiveBucket::Strength
    } else if matches(&RECOVERY, &o) {
        ObjectiveBucket::Recovery
    } else {
        ObjectiveBucket::General
    }
}

/// Marathon-class goals cannot be prepared safely within the six-week horizon.
fn is_unrealistic(objective: &str) -> bool {
    let o = objective.to_lowercase();
    o.contains("marathon") || o.contains("42")
}

/// Classify an objective that already passed [`is_sport_objective`].
pub fn classify(objective: &str) -> ObjectiveAssessment {
    let (working_objective, warning) = if is_unrealistic(objective) {
        let warning = Warning {
            kind: WarningType::UnrealisticGoal,
            message: "Goal is probably unrealistic within 6 weeks. Aim for an intermediate \
                      goal before a marathon."
                .to_string(),
            suggested_objective: Some(SUGGESTED_OBJECTIVE.to_string()),
        };
        (SUBSTITUTED_OBJECTIVE.to_string(), Some(warning))
    } else {
        (objective.trim().to_string(), None)
    };

    ObjectiveAssessment {
        bucket: bucket_for(&working_objective),
        working_objective,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sport_gate() {
        assert!(is_sport_objective("course 10km"));
        assert!(is_sport_objective("Perte de poids"));
        assert!(is_sport_objective("Improve my cycling"));
        assert!(is_sport_objective("HIIT twice a week"));
        assert!(!is_sport_objective("write my cover letter"));
        assert!(!is_sport_objective("learn italian"));
    }

    #[test]
    fn test_buckets() {
        assert_eq!(bucket_for("course 10km"), ObjectiveBucket::Running);
        assert_eq!(bucket_for("perte de poids"), ObjectiveBucket::Weightloss);
        assert_eq!(bucket_for("lose weight by running"), ObjectiveBucket::Weightloss);
        assert_eq!(bucket_for("prendre du muscle"), ObjectiveBucket::Strength);
        assert_eq!(bucket_for("Better recovery and sleep"), ObjectiveBucket::Recovery);
        assert_eq!(bucket_for("general fitness"), ObjectiveBucket::General);
    }

    #[test]
    fn test_marathon_is_substituted() {
        let a = classify("Courir un marathon");
        assert_eq!(a.working_objective, SUBSTITUTED_OBJECTIVE);
        assert_eq!(a.bucket, ObjectiveBucket::Running);
        let w = a.warning.expect("warning");
        assert_eq!(w.kind, WarningType::UnrealisticGoal);
        assert_eq!(w.suggested_objective.as_deref(), Some(SUGGESTED_OBJECTIVE));
    }

    #[test]
    fn test_42_is_substituted() {
        let a = classify("run 42 km in april");
        assert!(a.warning.is_some());
        assert_eq!(a.working_objective, SUBSTITUTED_OBJECTIVE);
    }

    #[test]
    fn test_realistic_goal_kept() {
        let a = classify("  course 10km ");
        assert!(a.warning.is_none());
        assert_eq!(a.working_objective, "course 10km");
        assert_eq!(a.bucket, ObjectiveBucket::Running);
    }
}

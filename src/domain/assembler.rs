//! Plan assembly: expand the one-week safe template into six dated weeks.
//!
//! Pure date arithmetic. Week 1 starts on the Monday of the week containing the
//! start date; every later week is offset by 7 days.

use crate::domain::entities::{
    DayOfWeek, Level, PLAN_WEEKS, PlanMeta, Session, SessionDetails, TemplateSession,
    TrainingPlan, Warning, Week,
};
use crate::domain::template::{MAX_TIPS, truncate_chars};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

const INTENSITY_CAP: usize = 80;
const GOAL_CAP: usize = 120;
const WARMUP_CAP: usize = 140;
const MAIN_CAP: usize = 220;
const COOLDOWN_CAP: usize = 140;
const TIP_CAP: usize = 90;

/// Everything the assembler needs besides the template.
#[derive(Debug, Clone)]
pub struct AssemblyInput {
    /// The user's literal objective (not the substituted working objective).
    pub objective: String,
    pub start_date: NaiveDate,
    pub time_zone: String,
    pub preferred_start_time: String,
    pub sessions_per_week: u8,
    /// Detected level. Never a value suggested by generated text.
    pub level: Level,
    pub warnings: Vec<Warning>,
    pub generated_at: DateTime<Utc>,
}

impl AssemblyInput {
    fn meta(&self) -> PlanMeta {
        PlanMeta {
            objective: self.objective.clone(),
            start_date: format_date(self.start_date),
            time_zone: self.time_zone.clone(),
            sessions_per_week: self.sessions_per_week,
            level: self.level,
            generated_at: self.generated_at,
        }
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Monday of the week containing `date`.
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Concrete date for a slot. In week 1 only, a date before `start_date` moves
/// forward by exactly one week.
pub fn session_date(
    base_monday: NaiveDate,
    week_index: u32,
    day: DayOfWeek,
    start_date: NaiveDate,
) -> NaiveDate {
    let date = base_monday
        + Duration::days(7 * i64::from(week_index))
        + Duration::days(day.offset_from_monday());
    if week_index == 0 && date < start_date {
        date + Duration::days(7)
    } else {
        date
    }
}

fn week_title(week_number: u32) -> String {
    format!("Week {week_number}")
}

fn capped_slot(slot: &TemplateSession) -> TemplateSession {
    TemplateSession {
        day_of_week: slot.day_of_week,
        session_type: slot.session_type,
        duration_minutes: slot.duration_minutes,
        target_distance_km: slot.target_distance_km,
        intensity: truncate_chars(&slot.intensity, INTENSITY_CAP),
        session_goal: truncate_chars(&slot.session_goal, GOAL_CAP),
        details: SessionDetails {
            warmup: truncate_chars(&slot.details.warmup, WARMUP_CAP),
            main: truncate_chars(&slot.details.main, MAIN_CAP),
            cooldown: truncate_chars(&slot.details.cooldown, COOLDOWN_CAP),
        },
        tips: slot
            .tips
            .iter()
            .take(MAX_TIPS)
            .map(|t| truncate_chars(t, TIP_CAP))
            .collect(),
    }
}

/// Build the six-week plan from the safe template.
pub fn assemble(input: AssemblyInput, template: &[TemplateSession]) -> TrainingPlan {
    let base_monday = week_monday(input.start_date);
    let per_week = usize::from(input.sessions_per_week);

    let weeks = (0..PLAN_WEEKS)
        .map(|i| {
            let week_number = i + 1;
            let sessions = template
                .iter()
                .take(per_week)
                .enumerate()
                .map(|(idx, slot)| Session {
                    id: format!("W{week_number}-S{}", idx + 1),
                    title: format!("Training — {}", slot.session_type.label()),
                    date: format_date(session_date(
                        base_monday,
                        i,
                        slot.day_of_week,
                        input.start_date,
                    )),
                    start_time: input.preferred_start_time.clone(),
                    slot: capped_slot(slot),
                })
                .collect();
            Week {
                week_number,
                title: week_title(week_number),
                sessions,
            }
        })
        .collect();

    TrainingPlan {
        meta: input.meta(),
        warnings: input.warnings,
        weeks,
    }
}

/// Plan with six empty weeks. Used when no valid template could be obtained.
pub fn fallback(input: AssemblyInput) -> TrainingPlan {
    let weeks = (1..=PLAN_WEEKS)
        .map(|week_number| Week {
            week_number,
            title: week_title(week_number),
            sessions: Vec::new(),
        })
        .collect();

    TrainingPlan {
        meta: input.meta(),
        warnings: input.warnings,
        weeks,
    }
}

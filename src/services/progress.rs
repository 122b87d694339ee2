//! Streak and completion-rate engine.
//!
//! Everything in here is pure: callers pass `now` explicitly so a batch of
//! habits is evaluated against a single instant. Completions are reduced to a
//! set of distinct periods (days, weeks, or weekday occurrences depending on
//! the habit's frequency) before any streak math, while the raw record count
//! feeds `total_completions` and the completion rate.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::models::habit::Frequency;

/// Derived statistics for one habit. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_completed_date: Option<DateTime<Utc>>,
    pub total_completions: u64,
    pub completion_rate: f64,
}

impl Progress {
    pub fn empty() -> Self {
        Self {
            current_streak: 0,
            longest_streak: 0,
            last_completed_date: None,
            total_completions: 0,
            completion_rate: 0.0,
        }
    }
}

pub fn calculate_progress(
    frequency: Frequency,
    created_at: DateTime<Utc>,
    completions: &[DateTime<Utc>],
    now: DateTime<Utc>,
) -> Progress {
    if completions.is_empty() {
        return Progress::empty();
    }

    let today = now.date_naive();
    let periods = distinct_periods(frequency, completions);
    let total_completions = completions.len() as u64;

    Progress {
        current_streak: current_streak(frequency, &periods, today),
        longest_streak: longest_streak(&periods),
        last_completed_date: completions.iter().max().copied(),
        total_completions,
        completion_rate: completion_rate(
            frequency,
            created_at.date_naive(),
            today,
            total_completions,
        ),
    }
}

fn day_index(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

/// Monday-based week, numbered continuously across year boundaries.
fn week_index(date: NaiveDate) -> i64 {
    (day_index(date) - i64::from(date.weekday().num_days_from_monday())).div_euclid(7)
}

/// Index of the period `date` falls in, on a scale where consecutive periods
/// differ by exactly one. `None` when the date is not eligible for the
/// frequency (a non-matching weekday).
fn period_of(frequency: Frequency, date: NaiveDate) -> Option<i64> {
    match frequency {
        Frequency::Daily => Some(day_index(date)),
        Frequency::Weekly => Some(week_index(date)),
        Frequency::SpecificWeekday(target) => {
            (date.weekday() == target).then(|| day_index(date).div_euclid(7))
        }
    }
}

fn distinct_periods(frequency: Frequency, completions: &[DateTime<Utc>]) -> BTreeSet<i64> {
    completions
        .iter()
        .filter_map(|completed| period_of(frequency, completed.date_naive()))
        .collect()
}

/// The period "now" belongs to. For a weekday habit that is the most recent
/// occurrence of the weekday on or before today.
fn anchor_period(frequency: Frequency, today: NaiveDate) -> i64 {
    match frequency {
        Frequency::Daily => day_index(today),
        Frequency::Weekly => week_index(today),
        Frequency::SpecificWeekday(target) => {
            let back = (7 + today.weekday().num_days_from_monday()
                - target.num_days_from_monday())
                % 7;
            day_index(today - Duration::days(i64::from(back))).div_euclid(7)
        }
    }
}

fn current_streak(frequency: Frequency, periods: &BTreeSet<i64>, today: NaiveDate) -> u32 {
    let anchor = anchor_period(frequency, today);

    // Daily habits get one day of grace: a streak last extended yesterday is
    // still current. Weekly cadences walk back from the latest completed
    // period up to now.
    let start = match frequency {
        Frequency::Daily => [anchor, anchor - 1]
            .into_iter()
            .find(|period| periods.contains(period)),
        Frequency::Weekly | Frequency::SpecificWeekday(_) => {
            periods.range(..=anchor).next_back().copied()
        }
    };

    let Some(mut expected) = start else {
        return 0;
    };
    let mut streak = 0;
    while periods.contains(&expected) {
        streak += 1;
        expected -= 1;
    }
    streak
}

fn longest_streak(periods: &BTreeSet<i64>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<i64> = None;

    for &period in periods {
        run = match previous {
            Some(prev) if period - prev == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(period);
    }
    longest
}

/// Periods elapsed from creation through today inclusive, floored at 1.
fn expected_completions(frequency: Frequency, created: NaiveDate, today: NaiveDate) -> u64 {
    let days = (today - created).num_days() + 1;
    let expected = match frequency {
        Frequency::Daily => days,
        Frequency::Weekly => (days + 6).div_euclid(7),
        Frequency::SpecificWeekday(target) => {
            let offset = i64::from(
                (7 + target.num_days_from_monday() - created.weekday().num_days_from_monday()) % 7,
            );
            if offset >= days {
                0
            } else {
                (days - 1 - offset) / 7 + 1
            }
        }
    };
    expected.max(1) as u64
}

/// Raw completions (duplicates included) over expected periods, capped at 1.
fn completion_rate(
    frequency: Frequency,
    created: NaiveDate,
    today: NaiveDate,
    total_completions: u64,
) -> f64 {
    let expected = expected_completions(frequency, created, today);
    (total_completions as f64 / expected as f64).min(1.0)
}

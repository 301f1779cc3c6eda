//! SM-2 scheduling.
//!
//! After every review the ease factor moves by
//! `0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)`, is floored at [`MIN_EASE_FACTOR`]
//! and rounded to two decimals. A failed review (quality below 3) restarts the
//! card at a one-day interval; successes step through 1 day, 6 days, then
//! `previous interval * ease`.
//!
//! Rounding is `f64::round`, i.e. half away from zero, which for the
//! non-negative values involved here is round-half-up.

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::date::add_days;
use crate::error::Result;
use crate::response::Quality;

pub const INITIAL_EASE_FACTOR: f64 = 2.5;
pub const MIN_EASE_FACTOR: f64 = 1.3;
const FIRST_INTERVAL: u32 = 1;
const SECOND_INTERVAL: u32 = 6;
const LAPSE_INTERVAL: u32 = 1;

trait Round {
    fn to_2_decimal(self) -> f64;
}

impl Round for f64 {
    fn to_2_decimal(self) -> f64 {
        (self * 100.0).round() / 100.0
    }
}

/// The scheduling inputs carried between reviews.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub ease_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
}

impl Default for Schedule {
    /// The state of a card that has never been reviewed.
    fn default() -> Self {
        Self {
            ease_factor: INITIAL_EASE_FACTOR,
            interval_days: 0,
            repetitions: 0,
        }
    }
}

/// Output of [`compute_next_review`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextReview {
    pub ease_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    #[serde(with = "crate::date::serde_date")]
    pub next_review_date: NaiveDate,
}

impl NextReview {
    pub fn schedule(&self) -> Schedule {
        Schedule {
            ease_factor: self.ease_factor,
            interval_days: self.interval_days,
            repetitions: self.repetitions,
        }
    }
}

fn ease_delta(quality: Quality) -> f64 {
    let miss = f64::from(Quality::MAX - quality.get());
    0.1 - miss * (0.08 + miss * 0.02)
}

pub fn next_ease_factor(ease_factor: f64, quality: Quality) -> f64 {
    (ease_factor + ease_delta(quality))
        .max(MIN_EASE_FACTOR)
        .to_2_decimal()
}

/// Advances `prior` by one review, without touching the calendar.
pub fn next_schedule(quality: Quality, prior: Schedule) -> Schedule {
    let ease_factor = next_ease_factor(prior.ease_factor, quality);
    if !quality.is_success() {
        return Schedule {
            ease_factor,
            interval_days: LAPSE_INTERVAL,
            repetitions: 0,
        };
    }
    let repetitions = prior.repetitions.saturating_add(1);
    let interval_days = match repetitions {
        1 => FIRST_INTERVAL,
        2 => SECOND_INTERVAL,
        _ => (f64::from(prior.interval_days) * ease_factor)
            .round()
            .min(f64::from(u32::MAX)) as u32,
    };
    Schedule {
        ease_factor,
        interval_days,
        repetitions,
    }
}

/// Schedules the next review of a card reviewed on `today`.
///
/// `quality` is validated before anything else; values outside `0..=5` fail with
/// [`SrsError::InvalidInput`](crate::SrsError::InvalidInput). Use
/// [`Schedule::default`] as `prior` for a card that has never been reviewed.
///
/// Appending the quality to the card's history is left to the caller, see
/// [`ReviewState::record`](crate::ReviewState::record).
pub fn compute_next_review<Q>(quality: Q, prior: Schedule, today: NaiveDate) -> Result<NextReview>
where
    Q: TryInto<Quality>,
    crate::SrsError: From<Q::Error>,
{
    let quality = quality.try_into()?;
    let next = next_schedule(quality, prior);
    let next_review_date = add_days(today, next.interval_days)?;
    debug!(
        "quality {quality}: ease {} -> {}, interval {} -> {}, due {next_review_date}",
        prior.ease_factor, next.ease_factor, prior.interval_days, next.interval_days
    );
    Ok(NextReview {
        ease_factor: next.ease_factor,
        interval_days: next.interval_days,
        repetitions: next.repetitions,
        next_review_date,
    })
}

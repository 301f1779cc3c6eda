use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::response::Quality;
use crate::sm2::{NextReview, Schedule, compute_next_review};

/// Scheduling record for one (user, flashcard) pair.
///
/// A card that has never been reviewed has no `ReviewState` at all. The first
/// review creates one, and every later review replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    pub ease_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    /// Missing only on records written by something other than this crate.
    #[serde(default, with = "crate::date::serde_date::option")]
    pub next_review_date: Option<NaiveDate>,
    #[serde(default)]
    pub quality_history: Vec<Quality>,
    #[serde(default)]
    pub last_reviewed: Option<DateTime<Utc>>,
}

impl ReviewState {
    pub fn schedule(&self) -> Schedule {
        Schedule {
            ease_factor: self.ease_factor,
            interval_days: self.interval_days,
            repetitions: self.repetitions,
        }
    }

    /// Reviews the card at `reviewed_at` and returns the replacement state.
    ///
    /// `previous` is `None` for the first review of a card.
    pub fn record(
        previous: Option<&ReviewState>,
        quality: Quality,
        reviewed_at: DateTime<Utc>,
    ) -> Result<ReviewState> {
        let prior = previous.map(ReviewState::schedule).unwrap_or_default();
        let next = compute_next_review(quality, prior, reviewed_at.date_naive())?;
        let mut quality_history = previous
            .map(|s| s.quality_history.clone())
            .unwrap_or_default();
        quality_history.push(quality);
        Ok(ReviewState::from_next_review(
            next,
            quality_history,
            Some(reviewed_at),
        ))
    }

    pub fn from_next_review(
        next: NextReview,
        quality_history: Vec<Quality>,
        last_reviewed: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            ease_factor: next.ease_factor,
            interval_days: next.interval_days,
            repetitions: next.repetitions,
            next_review_date: Some(next.next_review_date),
            quality_history,
            last_reviewed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::Clock;
    use crate::test_helpers::{clock, date};

    fn q(value: u8) -> Quality {
        Quality::new(value).unwrap()
    }

    #[test]
    fn first_review_creates_state() -> Result<()> {
        let now = clock().now();
        let state = ReviewState::record(None, q(5), now)?;
        assert_eq!(state.ease_factor, 2.6);
        assert_eq!(state.interval_days, 1);
        assert_eq!(state.repetitions, 1);
        assert_eq!(state.next_review_date, Some(date(2024, 6, 2)));
        assert_eq!(state.quality_history, [q(5)]);
        assert_eq!(state.last_reviewed, Some(now));
        Ok(())
    }

    #[test]
    fn reviews_append_history_and_chain_schedules() -> Result<()> {
        let now = clock().now();
        let first = ReviewState::record(None, q(4), now)?;
        let second = ReviewState::record(Some(&first), q(4), now)?;
        let third = ReviewState::record(Some(&second), q(2), now)?;
        assert_eq!(second.interval_days, 6);
        assert_eq!(third.interval_days, 1);
        assert_eq!(third.repetitions, 0);
        assert_eq!(third.quality_history, [q(4), q(4), q(2)]);
        // the earlier record is untouched
        assert_eq!(first.quality_history, [q(4)]);
        Ok(())
    }

    #[test]
    fn wire_format() {
        let json = serde_json::json!({
            "easeFactor": 2.36,
            "intervalDays": 1,
            "repetitions": 1,
            "nextReviewDate": "2024-06-02",
            "qualityHistory": [3],
        });
        let state: ReviewState = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(state.next_review_date, Some(date(2024, 6, 2)));
        assert_eq!(state.last_reviewed, None);

        let partial: ReviewState = serde_json::from_value(serde_json::json!({
            "easeFactor": 2.5,
            "intervalDays": 0,
            "repetitions": 0,
        }))
        .unwrap();
        assert_eq!(partial.next_review_date, None);
        assert!(partial.quality_history.is_empty());

        let bad = serde_json::json!({
            "easeFactor": 2.5,
            "intervalDays": 0,
            "repetitions": 0,
            "qualityHistory": [9],
        });
        assert!(serde_json::from_value::<ReviewState>(bad).is_err());
    }

    #[test]
    fn dates_on_the_wire_are_strict() {
        let with_date = |d: serde_json::Value| {
            serde_json::from_value::<ReviewState>(serde_json::json!({
                "easeFactor": 2.5,
                "intervalDays": 1,
                "repetitions": 1,
                "nextReviewDate": d,
            }))
        };
        assert!(with_date("2024-6-2".into()).is_err());
        assert!(with_date("+202-06-02".into()).is_err());
        assert!(with_date("2024-06-02T00:00:00".into()).is_err());
        assert_eq!(with_date(serde_json::Value::Null).unwrap().next_review_date, None);

        let state = with_date("2024-06-02".into()).unwrap();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["nextReviewDate"], "2024-06-02");
        assert_eq!(serde_json::from_value::<ReviewState>(json).unwrap(), state);
    }
}

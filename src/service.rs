use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;
use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::date::{Clock, days_between};
use crate::error::{Result, SrsError};
use crate::response::{Quality, Response};
use crate::state::ReviewState;
use crate::status::{CardStatus, StatusCounts, get_card_status};
use crate::store::{ReviewKey, ReviewStateStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// How many times a review is re-applied on top of a concurrently written
    /// state before the conflict is returned to the caller.
    pub max_conflict_retries: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: u64,
    pub incorrect: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOutcome {
    pub state: ReviewState,
    pub previous_status: CardStatus,
    pub status: CardStatus,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueCard {
    pub flashcard_id: String,
    pub next_review_date: NaiveDate,
    pub days_overdue: u64,
}

fn tally_poisoned<E>(_: E) -> SrsError {
    SrsError::Store {
        message: "tally lock poisoned".into(),
    }
}

/// Records reviews against a [`ReviewStateStore`] and answers read-only
/// questions about a user's cards.
pub struct ReviewService<S, C> {
    store: S,
    clock: C,
    config: ServiceConfig,
    tallies: Mutex<HashMap<String, Tally>>,
}

impl<S: ReviewStateStore, C: Clock> ReviewService<S, C> {
    pub fn new(store: S, clock: C, config: ServiceConfig) -> Self {
        Self {
            store,
            clock,
            config,
            tallies: Mutex::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn record_review(&self, key: &ReviewKey, response: Response) -> Result<ReviewOutcome> {
        self.apply(key, response.quality(), response.is_correct())
    }

    pub fn record_quality(&self, key: &ReviewKey, quality: Quality) -> Result<ReviewOutcome> {
        self.apply(key, quality, quality.is_success())
    }

    fn apply(&self, key: &ReviewKey, quality: Quality, correct: bool) -> Result<ReviewOutcome> {
        let now = self.clock.now();
        let today = now.date_naive();
        let mut retries = 0;
        loop {
            let current = self.store.load(key)?;
            let previous = current.as_ref().map(|v| &v.value);
            let previous_status = get_card_status(previous, today);
            let state = ReviewState::record(previous, quality, now)?;
            match self
                .store
                .save(key, state.clone(), current.as_ref().map(|v| v.version))
            {
                Ok(version) => {
                    debug!("{key}: quality {quality} saved at version {version}");
                    // the review has landed, a broken tally must not make it look failed
                    if let Err(e) = self.bump_tally(&key.user_id, correct) {
                        warn!("{key}: review saved but tally not updated: {e}");
                    }
                    let status = get_card_status(Some(&state), today);
                    return Ok(ReviewOutcome {
                        state,
                        previous_status,
                        status,
                        correct,
                    });
                }
                Err(SrsError::Conflict { .. }) if retries < self.config.max_conflict_retries => {
                    retries += 1;
                    warn!("{key}: concurrent review detected, retry {retries}");
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn bump_tally(&self, user_id: &str, correct: bool) -> Result<()> {
        let mut tallies = self.tallies.lock().map_err(tally_poisoned)?;
        let tally = tallies.entry(user_id.to_owned()).or_default();
        if correct {
            tally.correct += 1;
        } else {
            tally.incorrect += 1;
        }
        Ok(())
    }

    pub fn tallies(&self, user_id: &str) -> Result<Tally> {
        let tallies = self.tallies.lock().map_err(tally_poisoned)?;
        Ok(tallies.get(user_id).copied().unwrap_or_default())
    }

    pub fn status(&self, key: &ReviewKey) -> Result<CardStatus> {
        let current = self.store.load(key)?;
        Ok(get_card_status(
            current.as_ref().map(|v| &v.value),
            self.clock.today(),
        ))
    }

    /// The user's cards that are due, most overdue first.
    pub fn due_cards(&self, user_id: &str) -> Result<Vec<DueCard>> {
        let today = self.clock.today();
        Ok(self
            .store
            .list_for_user(user_id)?
            .into_iter()
            .filter(|(_, state)| get_card_status(Some(state), today) == CardStatus::Due)
            .filter_map(|(flashcard_id, state)| {
                let next_review_date = state.next_review_date?;
                Some(DueCard {
                    flashcard_id,
                    next_review_date,
                    days_overdue: days_between(next_review_date, today).unsigned_abs(),
                })
            })
            .sorted_by(|a, b| {
                a.next_review_date
                    .cmp(&b.next_review_date)
                    .then_with(|| a.flashcard_id.cmp(&b.flashcard_id))
            })
            .collect())
    }

    /// Status counts over a deck. Cards the user has never reviewed are `new`.
    pub fn deck_overview<I, T>(&self, user_id: &str, flashcard_ids: I) -> Result<StatusCounts>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let today = self.clock.today();
        let states = self
            .store
            .list_for_user(user_id)?
            .into_iter()
            .collect::<HashMap<_, _>>();
        Ok(flashcard_ids
            .into_iter()
            .map(|id| get_card_status(states.get(id.as_ref()), today))
            .collect())
    }
}

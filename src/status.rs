use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::date::days_between;
use crate::state::ReviewState;

/// Cards whose interval has grown past this many days count as mastered.
pub const MASTERED_INTERVAL_DAYS: u32 = 21;
/// Cards due within this many days (but not today) count as soon.
pub const SOON_WINDOW_DAYS: i64 = 3;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    New,
    Due,
    Soon,
    Learning,
    Mastered,
}

/// Where a card stands in its learning lifecycle as of `today`.
///
/// Checked in order: no state is `new`; due today or overdue is `due`; an
/// interval over [`MASTERED_INTERVAL_DAYS`] is `mastered` even when the card
/// is also due soon; due within [`SOON_WINDOW_DAYS`] is `soon`; anything else
/// is `learning`.
pub fn get_card_status(state: Option<&ReviewState>, today: NaiveDate) -> CardStatus {
    let Some((state, next_review_date)) =
        state.and_then(|s| s.next_review_date.map(|date| (s, date)))
    else {
        return CardStatus::New;
    };
    let days_until_review = days_between(today, next_review_date);
    if days_until_review <= 0 {
        CardStatus::Due
    } else if state.interval_days > MASTERED_INTERVAL_DAYS {
        CardStatus::Mastered
    } else if days_until_review <= SOON_WINDOW_DAYS {
        CardStatus::Soon
    } else {
        CardStatus::Learning
    }
}

/// Number of cards in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub new: usize,
    pub due: usize,
    pub soon: usize,
    pub learning: usize,
    pub mastered: usize,
}

impl StatusCounts {
    pub fn add(&mut self, status: CardStatus) {
        *self.slot(status) += 1;
    }

    pub fn get(&self, status: CardStatus) -> usize {
        match status {
            CardStatus::New => self.new,
            CardStatus::Due => self.due,
            CardStatus::Soon => self.soon,
            CardStatus::Learning => self.learning,
            CardStatus::Mastered => self.mastered,
        }
    }

    pub fn total(&self) -> usize {
        self.new + self.due + self.soon + self.learning + self.mastered
    }

    fn slot(&mut self, status: CardStatus) -> &mut usize {
        match status {
            CardStatus::New => &mut self.new,
            CardStatus::Due => &mut self.due,
            CardStatus::Soon => &mut self.soon,
            CardStatus::Learning => &mut self.learning,
            CardStatus::Mastered => &mut self.mastered,
        }
    }
}

impl FromIterator<CardStatus> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = CardStatus>>(iter: I) -> Self {
        let mut counts = Self::default();
        iter.into_iter().for_each(|status| counts.add(status));
        counts
    }
}

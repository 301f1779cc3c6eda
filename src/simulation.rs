use std::cmp::Reverse;

use chrono::NaiveDate;
use log::info;
use priority_queue::PriorityQueue;
use rand::SeedableRng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::{Deserialize, Serialize};

use crate::date::add_days;
use crate::error::{Result, SrsError};
use crate::response::Response;
use crate::sm2::{Schedule, next_schedule};
use crate::state::ReviewState;
use crate::status::{StatusCounts, get_card_status};

const RESPONSES: [Response; 4] = [
    Response::Again,
    Response::Hard,
    Response::Good,
    Response::Easy,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub deck_size: usize,
    pub learn_span: usize,
    /// New cards introduced per day.
    pub learn_limit: usize,
    pub review_limit: usize,
    /// Study time budget per day, in the unit of `response_costs`. `None` is unlimited.
    pub max_cost_per_day: Option<f64>,
    /// Weights of again/hard/good/easy on a card's first review.
    pub first_response_prob: [f64; 4],
    /// Weights of again/hard/good/easy on later reviews.
    pub review_response_prob: [f64; 4],
    /// Seconds spent answering again/hard/good/easy.
    pub response_costs: [f64; 4],
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            deck_size: 1000,
            learn_span: 365,
            learn_limit: 20,
            review_limit: 200,
            max_cost_per_day: None,
            first_response_prob: [0.2, 0.15, 0.5, 0.15],
            review_response_prob: [0.1, 0.15, 0.6, 0.15],
            response_costs: [20.0, 15.0, 10.0, 8.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimCard {
    pub schedule: Option<Schedule>,
    pub last_day: Option<usize>,
    pub due: usize,
    pub reviews: u32,
    pub lapses: u32,
}

impl SimCard {
    fn is_learn(&self) -> bool {
        self.schedule.is_none()
    }

    /// The card as a stored review state, with day `0` mapped to `epoch`.
    pub fn review_state(&self, epoch: NaiveDate) -> Result<Option<ReviewState>> {
        let Some(schedule) = self.schedule else {
            return Ok(None);
        };
        let due = u32::try_from(self.due)
            .map_err(|_| SrsError::invalid_input(format!("due day {} out of range", self.due)))?;
        Ok(Some(ReviewState {
            ease_factor: schedule.ease_factor,
            interval_days: schedule.interval_days,
            repetitions: schedule.repetitions,
            next_review_date: Some(add_days(epoch, due)?),
            quality_history: vec![],
            last_reviewed: None,
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub review_cnt_per_day: Vec<usize>,
    pub learn_cnt_per_day: Vec<usize>,
    /// Reviews answered good or easy (first reviews not included).
    pub correct_cnt_per_day: Vec<usize>,
    pub cost_per_day: Vec<f64>,
    /// Status of every card on the day after the simulation ends.
    pub status_counts: StatusCounts,
    pub cards: Vec<SimCard>,
}

fn response_dist(weights: [f64; 4], name: &str) -> Result<WeightedIndex<f64>> {
    WeightedIndex::new(weights)
        .map_err(|e| SrsError::invalid_input(format!("{name} {weights:?}: {e}")))
}

fn card_priority(card: &SimCard, index: usize) -> Reverse<(usize, bool, usize)> {
    // earliest due first, reviews before new cards
    Reverse((card.due, card.is_learn(), index))
}

/// Simulates studying a deck of new cards for `learn_span` days.
///
/// Answers are drawn from the configured response weights with a generator
/// seeded by `seed` (42 when `None`), so a given seed always yields the same
/// result.
pub fn simulate(config: &SimulatorConfig, seed: Option<u64>) -> Result<SimulationResult> {
    if config.deck_size == 0 || config.learn_span == 0 {
        return Err(SrsError::InvalidDeckSize);
    }
    let first_dist = response_dist(config.first_response_prob, "first_response_prob")?;
    let review_dist = response_dist(config.review_response_prob, "review_response_prob")?;
    let max_cost = config.max_cost_per_day.unwrap_or(f64::INFINITY);
    let learn_span = config.learn_span;

    let mut review_cnt_per_day = vec![0; learn_span];
    let mut learn_cnt_per_day = vec![0; learn_span];
    let mut correct_cnt_per_day = vec![0; learn_span];
    let mut cost_per_day = vec![0.0; learn_span];

    let mut rng = StdRng::seed_from_u64(seed.unwrap_or(42));

    let mut cards = (0..config.deck_size)
        .map(|i| SimCard {
            schedule: None,
            last_day: None,
            due: i.checked_div(config.learn_limit).unwrap_or(learn_span),
            reviews: 0,
            lapses: 0,
        })
        .collect::<Vec<_>>();

    let mut queue = PriorityQueue::new();
    for (i, card) in cards.iter().enumerate() {
        queue.push(i, card_priority(card, i));
    }

    while let Some((&index, _)) = queue.peek() {
        let card = &mut cards[index];
        let day = card.due;
        if day >= learn_span {
            queue.pop();
            continue;
        }
        let is_learn = card.is_learn();

        let over_limit = if is_learn {
            learn_cnt_per_day[day] + 1 > config.learn_limit
        } else {
            review_cnt_per_day[day] + 1 > config.review_limit
        };
        if over_limit || cost_per_day[day] >= max_cost {
            card.due = day + 1;
            queue.change_priority(&index, card_priority(card, index));
            continue;
        }

        let dist = if is_learn { &first_dist } else { &review_dist };
        let choice = dist.sample(&mut rng);
        let response = RESPONSES[choice];
        let quality = response.quality();
        let schedule = next_schedule(quality, card.schedule.unwrap_or_default());

        if is_learn {
            learn_cnt_per_day[day] += 1;
        } else {
            review_cnt_per_day[day] += 1;
            if response.is_correct() {
                correct_cnt_per_day[day] += 1;
            }
            if !quality.is_success() {
                card.lapses += 1;
            }
        }
        cost_per_day[day] += config.response_costs[choice];

        card.schedule = Some(schedule);
        card.last_day = Some(day);
        card.due = day.saturating_add(schedule.interval_days as usize);
        card.reviews += 1;
        queue.change_priority(&index, card_priority(card, index));
    }

    let epoch = NaiveDate::default();
    let end = add_days(
        epoch,
        u32::try_from(learn_span).map_err(|_| SrsError::InvalidDeckSize)?,
    )?;
    let status_counts = cards
        .iter()
        .map(|card| Ok(get_card_status(card.review_state(epoch)?.as_ref(), end)))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .collect::<StatusCounts>();

    info!(
        "simulated {} cards over {} days: {} learned, {} reviews",
        config.deck_size,
        learn_span,
        learn_cnt_per_day.iter().sum::<usize>(),
        review_cnt_per_day.iter().sum::<usize>()
    );

    Ok(SimulationResult {
        review_cnt_per_day,
        learn_cnt_per_day,
        correct_cnt_per_day,
        cost_per_day,
        status_counts,
        cards,
    })
}

/// Runs [`simulate`] once per seed in parallel. Results are in seed order.
pub fn parallel_simulate(config: &SimulatorConfig, seeds: &[u64]) -> Result<Vec<SimulationResult>> {
    seeds
        .par_iter()
        .map(|&seed| simulate(config, Some(seed)))
        .collect()
}

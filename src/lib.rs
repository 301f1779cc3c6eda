mod date;
mod error;
mod response;
mod service;
mod simulation;
mod sm2;
mod state;
mod status;
mod store;
#[cfg(test)]
mod test_helpers;

pub use date::{
    Clock, DATE_FORMAT, FixedClock, UtcClock, add_days, days_between, format_date, parse_date,
};
pub use error::{Result, SrsError};
pub use response::{Quality, Response, is_difficulty_correct, response_to_quality};
pub use service::{DueCard, ReviewOutcome, ReviewService, ServiceConfig, Tally};
pub use simulation::{SimCard, SimulationResult, SimulatorConfig, parallel_simulate, simulate};
pub use sm2::{
    INITIAL_EASE_FACTOR, MIN_EASE_FACTOR, NextReview, Schedule, compute_next_review,
    next_ease_factor, next_schedule,
};
pub use state::ReviewState;
pub use status::{
    CardStatus, MASTERED_INTERVAL_DAYS, SOON_WINDOW_DAYS, StatusCounts, get_card_status,
};
pub use store::{MemoryStore, ReviewKey, ReviewStateStore, Versioned};

use chrono::{Duration, Utc};
use sm2_srs::{
    FixedClock, MemoryStore, Response, ReviewKey, ReviewService, ReviewState, Schedule,
    ServiceConfig, compute_next_review, format_date, get_card_status,
};

fn setup_logging() -> Result<(), Box<dyn std::error::Error>> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
        })
        .level(log::LevelFilter::Debug)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

fn schedule_new_card() -> Result<(), Box<dyn std::error::Error>> {
    let today = Utc::now().date_naive();

    // Show where each answer would send a card that has never been reviewed
    for response in [Response::Again, Response::Hard, Response::Good, Response::Easy] {
        let next = compute_next_review(response, Schedule::default(), today)?;
        println!(
            "{response:>5}: ease {:.2}, interval {} days, due {}",
            next.ease_factor,
            next.interval_days,
            format_date(next.next_review_date)
        );
    }
    Ok(())
}

fn review_over_time() -> Result<(), Box<dyn std::error::Error>> {
    let start = Utc::now() - Duration::days(60);
    let mut state: Option<ReviewState> = None;
    let mut reviewed_at = start;

    // Answer the card every time it comes due
    for response in [Response::Good, Response::Good, Response::Easy, Response::Hard, Response::Good] {
        let next = ReviewState::record(state.as_ref(), response.quality(), reviewed_at)?;
        println!(
            "{} answered {response}: interval {} days, status {}",
            reviewed_at.date_naive(),
            next.interval_days,
            get_card_status(Some(&next), Utc::now().date_naive())
        );
        reviewed_at += Duration::days(next.interval_days.into());
        state = Some(next);
    }
    Ok(())
}

fn review_through_service() -> Result<(), Box<dyn std::error::Error>> {
    let service = ReviewService::new(
        MemoryStore::new(),
        FixedClock(Utc::now()),
        ServiceConfig::default(),
    );
    let key = ReviewKey::new("demo-user", "card-1");
    let outcome = service.record_review(&key, Response::Good)?;
    println!(
        "{} -> {}, next review {:?}",
        outcome.previous_status, outcome.status, outcome.state.next_review_date
    );
    println!("tallies: {:?}", service.tallies("demo-user")?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logging()?;

    println!("Scheduling a new card:");
    schedule_new_card()?;

    println!("\nReviewing a card over time:");
    review_over_time()?;

    println!("\nRecording a review through the service:");
    review_through_service()?;

    Ok(())
}

use chrono::NaiveDate;

use crate::date::FixedClock;

pub(crate) const TODAY: NaiveDate = date(2024, 6, 1);

pub(crate) const fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(d) => d,
        None => panic!("invalid test date"),
    }
}

pub(crate) fn clock() -> FixedClock {
    FixedClock::on(TODAY)
}

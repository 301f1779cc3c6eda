//! Calendar-date handling.
//!
//! Every date the crate produces or consumes is a UTC calendar date with no
//! time of day. "Today" always means the current date in UTC, whatever the
//! local timezone of the host.

use chrono::{Datelike, DateTime, Days, NaiveDate, Utc};

use crate::error::{Result, SrsError};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UtcClock;

impl Clock for UtcClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a given instant, for replaying reviews and for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Midnight UTC of `date`.
    pub fn on(date: NaiveDate) -> Self {
        Self(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Latest year that still formats as four digits.
const MAX_YEAR: i32 = 9999;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    // chrono accepts padded, signed and unpadded fields, the wire format does not
    let well_formed = s.len() == 10
        && s.bytes().enumerate().all(|(i, b)| {
            if i == 4 || i == 7 {
                b == b'-'
            } else {
                b.is_ascii_digit()
            }
        });
    if !well_formed {
        return Err(SrsError::invalid_input(format!(
            "expected a YYYY-MM-DD date, got {s:?}"
        )));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| SrsError::invalid_input(format!("expected a YYYY-MM-DD date, got {s:?}: {e}")))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `date` plus `days`, as long as the result still fits `YYYY-MM-DD`.
pub fn add_days(date: NaiveDate, days: u32) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days.into()))
        .filter(|d| (0..=MAX_YEAR).contains(&d.year()))
        .ok_or_else(|| {
            SrsError::invalid_input(format!("{date} + {days} days is past year {MAX_YEAR}"))
        })
}

/// `#[serde(with = "serde_date")]` for dates on the wire.
pub mod serde_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_date(&s).map_err(D::Error::custom)
    }

    /// The same format for `Option<NaiveDate>`, `null` when absent.
    pub mod option {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => serializer.serialize_str(&super::super::format_date(*date)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|s| super::super::parse_date(&s).map_err(D::Error::custom))
                .transpose()
        }
    }
}

/// Whole calendar days from `from` to `to`; negative when `to` is earlier.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{Result, SrsError};

/// Grade of a single review, 0 (complete blackout) to 5 (perfect recall).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 5;
    /// Lowest grade that still counts as remembered.
    pub const PASSING: u8 = 3;

    pub fn new(value: u8) -> Result<Self> {
        if value > Self::MAX {
            return Err(SrsError::invalid_input(format!(
                "quality must be within 0..=5, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 >= Self::PASSING
    }
}

impl TryFrom<u8> for Quality {
    type Error = SrsError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Quality {
    type Error = SrsError;

    fn try_from(value: i64) -> Result<Self> {
        u8::try_from(value)
            .map_err(|_| {
                SrsError::invalid_input(format!("quality must be within 0..=5, got {value}"))
            })
            .and_then(Self::new)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

impl From<Response> for Quality {
    fn from(response: Response) -> Self {
        response.quality()
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four answer buttons shown after a card is revealed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Again,
    Hard,
    Good,
    Easy,
}

impl Response {
    /// Qualities 0 and 4 are not reachable from a button press.
    pub fn quality(self) -> Quality {
        match self {
            Response::Again => Quality(1),
            Response::Hard => Quality(2),
            Response::Good => Quality(3),
            Response::Easy => Quality(5),
        }
    }

    /// Whether the answer counts towards the correct tally.
    pub fn is_correct(self) -> bool {
        !matches!(self, Response::Again | Response::Hard)
    }

    pub fn parse(token: &str) -> Result<Self> {
        Response::from_str(token)
            .map_err(|_| SrsError::invalid_input(format!("unrecognized response {token:?}")))
    }
}

/// Maps a response token (`again`, `hard`, `good`, `easy`) to its quality.
pub fn response_to_quality(token: &str) -> Result<Quality> {
    Response::parse(token).map(Response::quality)
}

pub fn is_difficulty_correct(response: Response) -> bool {
    response.is_correct()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn response_mapping() -> Result<()> {
        let qualities = Response::iter()
            .map(|r| response_to_quality(r.into()).map(Quality::get))
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(qualities, [1, 2, 3, 5]);
        assert_eq!(response_to_quality("easy")?.get(), 5);
        Ok(())
    }

    #[test]
    fn unknown_token_is_rejected() {
        let err = response_to_quality("medium").unwrap_err();
        assert!(matches!(&err, SrsError::InvalidInput { message } if message.contains("medium")));
        // tokens are case-sensitive
        assert!(response_to_quality("Easy").is_err());
        assert!(response_to_quality("").is_err());
    }

    #[test]
    fn correctness_predicate() {
        let correct = Response::iter()
            .map(is_difficulty_correct)
            .collect::<Vec<_>>();
        assert_eq!(correct, [false, false, true, true]);
    }

    #[test]
    fn quality_bounds() {
        assert!(Quality::new(0).is_ok());
        assert!(Quality::new(5).is_ok());
        assert!(Quality::new(6).is_err());
        assert!(Quality::try_from(-1i64).is_err());
        assert!(Quality::try_from(300i64).is_err());
        assert!(!Quality::new(2).unwrap().is_success());
        assert!(Quality::new(3).unwrap().is_success());
    }

    #[test]
    fn serde_representation() {
        assert_eq!(serde_json::to_string(&Response::Again).unwrap(), "\"again\"");
        assert_eq!(
            serde_json::from_str::<Response>("\"easy\"").unwrap(),
            Response::Easy
        );
        assert_eq!(serde_json::to_string(&Quality::new(4).unwrap()).unwrap(), "4");
        assert!(serde_json::from_str::<Quality>("7").is_err());
    }
}

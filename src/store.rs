use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SrsError};
use crate::state::ReviewState;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewKey {
    pub user_id: String,
    pub flashcard_id: String,
}

impl ReviewKey {
    pub fn new(user_id: impl Into<String>, flashcard_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            flashcard_id: flashcard_id.into(),
        }
    }
}

impl fmt::Display for ReviewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.flashcard_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

/// Persistence for review states, keyed by (user, flashcard).
///
/// Writes are compare-and-set on a per-key version so that two reviews of the
/// same card racing each other cannot both win.
pub trait ReviewStateStore: Send + Sync {
    fn load(&self, key: &ReviewKey) -> Result<Option<Versioned<ReviewState>>>;

    /// Stores `state` if the key is still at `expected_version` (`None`: the key
    /// must not exist yet) and returns the new version. Otherwise fails with
    /// [`SrsError::Conflict`].
    fn save(
        &self,
        key: &ReviewKey,
        state: ReviewState,
        expected_version: Option<u64>,
    ) -> Result<u64>;

    /// Every stored state of `user_id`, keyed by flashcard id.
    fn list_for_user(&self, user_id: &str) -> Result<Vec<(String, ReviewState)>>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    states: RwLock<HashMap<ReviewKey, Versioned<ReviewState>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.states.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<E>(_: E) -> SrsError {
    SrsError::Store {
        message: "memory store lock poisoned".into(),
    }
}

impl ReviewStateStore for MemoryStore {
    fn load(&self, key: &ReviewKey) -> Result<Option<Versioned<ReviewState>>> {
        let states = self.states.read().map_err(poisoned)?;
        Ok(states.get(key).cloned())
    }

    fn save(
        &self,
        key: &ReviewKey,
        state: ReviewState,
        expected_version: Option<u64>,
    ) -> Result<u64> {
        let mut states = self.states.write().map_err(poisoned)?;
        let found = states.get(key).map(|v| v.version);
        if found != expected_version {
            return Err(SrsError::Conflict {
                key: key.to_string(),
                expected: expected_version,
                found,
            });
        }
        let version = found.map_or(1, |v| v + 1);
        states.insert(
            key.clone(),
            Versioned {
                value: state,
                version,
            },
        );
        Ok(version)
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<(String, ReviewState)>> {
        let states = self.states.read().map_err(poisoned)?;
        Ok(states
            .iter()
            .filter(|(key, _)| key.user_id == user_id)
            .map(|(key, v)| (key.flashcard_id.clone(), v.value.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::Clock;
    use crate::response::Quality;
    use crate::test_helpers::clock;

    fn reviewed(quality: u8) -> ReviewState {
        ReviewState::record(None, Quality::new(quality).unwrap(), clock().now()).unwrap()
    }

    #[test]
    fn versions_advance_on_save() -> Result<()> {
        let store = MemoryStore::new();
        let key = ReviewKey::new("u1", "c1");
        assert_eq!(store.load(&key)?, None);
        assert_eq!(store.save(&key, reviewed(3), None)?, 1);
        assert_eq!(store.save(&key, reviewed(5), Some(1))?, 2);
        let loaded = store.load(&key)?.unwrap();
        assert_eq!(loaded.version, 2);
        assert_eq!(loaded.value, reviewed(5));
        Ok(())
    }

    #[test]
    fn stale_writes_conflict() -> Result<()> {
        let store = MemoryStore::new();
        let key = ReviewKey::new("u1", "c1");
        store.save(&key, reviewed(3), None)?;
        assert_eq!(
            store.save(&key, reviewed(1), None),
            Err(SrsError::Conflict {
                key: "u1/c1".into(),
                expected: None,
                found: Some(1),
            })
        );
        assert!(matches!(
            store.save(&ReviewKey::new("u1", "c2"), reviewed(1), Some(4)),
            Err(SrsError::Conflict { found: None, .. })
        ));
        assert_eq!(store.load(&key)?.unwrap().value, reviewed(3));
        Ok(())
    }

    #[test]
    fn lists_only_the_users_cards() -> Result<()> {
        let store = MemoryStore::new();
        store.save(&ReviewKey::new("u1", "a"), reviewed(3), None)?;
        store.save(&ReviewKey::new("u1", "b"), reviewed(3), None)?;
        store.save(&ReviewKey::new("u2", "a"), reviewed(3), None)?;
        let mut ids = store
            .list_for_user("u1")?
            .into_iter()
            .map(|(id, _)| id)
            .collect::<Vec<_>>();
        ids.sort();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(store.len()?, 3);
        Ok(())
    }

    #[test]
    fn poisoned_lock_is_reported() -> Result<()> {
        let store = MemoryStore::new();
        let key = ReviewKey::new("u1", "c1");
        store.save(&key, reviewed(3), None)?;
        let poisoner = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = store.states.write();
                panic!("poison the store lock");
            })
            .join()
        });
        assert!(poisoner.is_err());

        assert!(matches!(store.len(), Err(SrsError::Store { .. })));
        assert!(matches!(store.is_empty(), Err(SrsError::Store { .. })));
        assert!(matches!(store.load(&key), Err(SrsError::Store { .. })));
        Ok(())
    }
}

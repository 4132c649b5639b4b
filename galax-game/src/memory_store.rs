//! In-process [`PlayerStore`] used by the QA harness and tests.
use chrono::Utc;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

use crate::PlayerStore;
use crate::player::{Player, PlayerUpdate, PlayerUpdateError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("player {0} not found")]
    UnknownPlayer(String),
    #[error("player {0} already exists")]
    DuplicatePlayer(String),
    #[error(transparent)]
    Update(#[from] PlayerUpdateError),
}

/// Cloneable handle to a shared map of players.
#[derive(Debug, Clone, Default)]
pub struct MemoryPlayerStore {
    players: Rc<RefCell<HashMap<String, Player>>>,
}

impl MemoryPlayerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.borrow().is_empty()
    }
}

impl PlayerStore for MemoryPlayerStore {
    type Error = MemoryStoreError;

    fn load_player(&self, player_id: &str) -> Result<Option<Player>, Self::Error> {
        Ok(self.players.borrow().get(player_id).cloned())
    }

    fn create_player(&self, player: &Player) -> Result<Player, Self::Error> {
        let mut players = self.players.borrow_mut();
        if players.contains_key(&player.player_id) {
            return Err(MemoryStoreError::DuplicatePlayer(player.player_id.clone()));
        }
        let now = Utc::now();
        let mut stored = player.clone();
        stored.created_at = Some(now);
        stored.updated_at = Some(now);
        players.insert(stored.player_id.clone(), stored.clone());
        Ok(stored)
    }

    fn apply_update(&self, player_id: &str, update: &PlayerUpdate) -> Result<Player, Self::Error> {
        let mut players = self.players.borrow_mut();
        let player = players
            .get_mut(player_id)
            .ok_or_else(|| MemoryStoreError::UnknownPlayer(player_id.to_string()))?;
        // Validate against a copy so a rejected update leaves the record intact.
        let mut next = player.clone();
        next.apply(update)?;
        next.updated_at = Some(Utc::now());
        *player = next.clone();
        Ok(next)
    }
}

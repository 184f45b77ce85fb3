//! Read models for clients: the board of a match and the open-match list.
//!
//! These read outside any transition and so may observe a snapshot taken
//! between two actions of a busy match.

use arena_store::Entity;
use serde::{Deserialize, Serialize};

use crate::components::{CoverPosition, MapConfig, MatchPhase, PlacedCards};
use crate::engine::MatchEngine;
use crate::error::MatchResult;
use crate::world::CardView;

/// A player seat as shown on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub user: Entity,
    pub username: String,
}

/// Everything a client needs to draw a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    pub match_id: Entity,
    pub map: MapConfig,
    pub phase: MatchPhase,
    pub player_one: PlayerView,
    pub player_two: Option<PlayerView>,
    pub turn: u32,
    pub current_player: Option<Entity>,
    pub mana: u32,
    pub placed: PlacedCards,
    pub cover: CoverPosition,
    /// Live cards ordered by id.
    pub cards: Vec<CardView>,
}

/// A match waiting for its second player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenMatch {
    pub match_id: Entity,
    pub creator: PlayerView,
    pub map: MapConfig,
}

impl MatchEngine {
    /// Current board of a match.
    ///
    /// # Errors
    ///
    /// `NotFound` if the match does not exist.
    pub fn board(&self, match_id: Entity) -> MatchResult<BoardView> {
        let state = self.world().match_state(match_id)?;
        let cards = self
            .world()
            .cards_in(match_id)
            .into_iter()
            .filter_map(|card| self.world().card(card).ok())
            .collect();
        Ok(BoardView {
            match_id,
            map: state.map,
            phase: state.phase,
            player_one: self.player_view(state.player_one),
            player_two: state.player_two.map(|user| self.player_view(user)),
            turn: state.turn,
            current_player: state.current_player,
            mana: state.mana,
            placed: state.placed,
            cover: state.cover,
            cards,
        })
    }

    /// Matches that can be joined, oldest first.
    #[must_use]
    pub fn open_matches(&self) -> Vec<OpenMatch> {
        self.world()
            .tables
            .phase
            .keys_with_value(&MatchPhase::AwaitingPlayers)
            .into_iter()
            .filter_map(|match_id| {
                let state = self.world().match_state(match_id).ok()?;
                Some(OpenMatch {
                    match_id,
                    creator: self.player_view(state.player_one),
                    map: state.map,
                })
            })
            .collect()
    }

    /// The unfinished match `user` is seated in.
    #[must_use]
    pub fn match_of(&self, user: Entity) -> Option<Entity> {
        self.world().active_match_of(user)
    }

    fn player_view(&self, user: Entity) -> PlayerView {
        PlayerView {
            user,
            username: self
                .world()
                .tables
                .user
                .get(user)
                .map(|name| name.0)
                .unwrap_or_default(),
        }
    }
}

//! Game data model: players, teeth, phase, and the aggregate `GameState`.
//!
//! All structs derive Serialize/Deserialize with camelCase field names so the
//! JS side sees the same shape it renders (`isEliminated`, `trapToothId`, ...).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::game::error::GameError;
use crate::game::rules;

/// Number of teeth in the crocodile's mouth. Tooth ids run 1..=TOOTH_COUNT.
pub const TOOTH_COUNT: u8 = 13;

/// Fewest players a game can start with.
pub const MIN_PLAYERS: usize = 2;

/// Most players a game can start with.
pub const MAX_PLAYERS: usize = 4;

/// A participant. Never removed from the game once created; elimination only
/// flips `is_eliminated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Stable id assigned at creation (1-based, count order).
    pub id: u32,
    /// Positional display name ("P1".."P4"), not shuffled with turn order.
    pub name: String,
    pub is_eliminated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooth {
    pub id: u8,
    pub is_pressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    #[default]
    Setup,
    Playing,
    GameOver,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamePhase::Setup => f.write_str("setup"),
            GamePhase::Playing => f.write_str("playing"),
            GamePhase::GameOver => f.write_str("gameOver"),
        }
    }
}

/// Complete game state: the aggregate root every transition replaces as a
/// whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Turn cycle order, fixed by the shuffle at game start.
    pub players: Vec<Player>,
    pub current_player_index: usize,
    pub teeth: Vec<Tooth>,
    /// Hidden losing tooth for the current round.
    pub trap_tooth_id: u8,
    pub game_phase: GamePhase,
    pub winner: Option<Player>,
    /// Elimination order, append-only.
    pub eliminated_players: Vec<Player>,
    /// Interaction lock while the bite is being shown.
    pub is_mouth_closed: bool,
}

impl Default for GameState {
    /// The pre-start setup state: no players, a full unpressed tooth set and a
    /// placeholder trap that is never consulted outside `Playing`.
    fn default() -> Self {
        Self {
            players: Vec::new(),
            current_player_index: 0,
            teeth: rules::create_initial_teeth(),
            trap_tooth_id: 1,
            game_phase: GamePhase::Setup,
            winner: None,
            eliminated_players: Vec::new(),
            is_mouth_closed: false,
        }
    }
}

impl GameState {
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    /// Look up a tooth by its 1-based id.
    pub fn tooth(&self, id: u8) -> Option<&Tooth> {
        self.teeth.iter().find(|t| t.id == id)
    }

    pub fn remaining_teeth(&self) -> usize {
        self.teeth.iter().filter(|t| !t.is_pressed).count()
    }

    /// True once this round's trap has been pressed (the bite, or game over).
    pub fn is_trap_revealed(&self) -> bool {
        self.game_phase != GamePhase::Setup
            && self.tooth(self.trap_tooth_id).is_some_and(|t| t.is_pressed)
    }

    /// Borrowed view for the renderer. Keeps the trap hidden until it is hit.
    pub fn view(&self, sound_enabled: bool) -> BoardView<'_> {
        BoardView {
            players: &self.players,
            current_player_index: self.current_player_index,
            current_player: self.current_player(),
            teeth: &self.teeth,
            remaining_teeth: self.remaining_teeth(),
            game_phase: self.game_phase,
            winner: self.winner.as_ref(),
            eliminated_players: &self.eliminated_players,
            is_mouth_closed: self.is_mouth_closed,
            sound_enabled,
            trap_tooth_id: self.is_trap_revealed().then_some(self.trap_tooth_id),
        }
    }

    /// Check a restored snapshot against the model invariants.
    ///
    /// # Errors
    /// Returns `GameError::CorruptSnapshot` naming the first violated invariant.
    pub fn validate(&self) -> Result<(), GameError> {
        let corrupt = |msg: &str| Err(GameError::CorruptSnapshot(msg.to_string()));

        if self.game_phase == GamePhase::Setup {
            if self.winner.is_some() {
                return corrupt("setup snapshot has a winner");
            }
            return Ok(());
        }

        let ids_in_order = self
            .teeth
            .iter()
            .map(|t| t.id)
            .eq(1..=TOOTH_COUNT);
        if !ids_in_order {
            return corrupt("teeth must be exactly 1..=13 in order");
        }
        if !(1..=TOOTH_COUNT).contains(&self.trap_tooth_id) {
            return corrupt("trap tooth id out of range");
        }
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players.len()) {
            return corrupt("player count out of range");
        }
        let unique: HashSet<u32> = self.players.iter().map(|p| p.id).collect();
        if unique.len() != self.players.len() {
            return corrupt("duplicate player ids");
        }

        let flagged = self.players.iter().filter(|p| p.is_eliminated).count();
        if flagged != self.eliminated_players.len() {
            return corrupt("eliminated flags disagree with elimination order");
        }
        let recorded: HashSet<u32> = self.eliminated_players.iter().map(|p| p.id).collect();
        if recorded.len() != self.eliminated_players.len() {
            return corrupt("player eliminated more than once");
        }
        let all_recorded = self
            .eliminated_players
            .iter()
            .all(|e| e.is_eliminated && self.players.contains(e));
        if !all_recorded {
            return corrupt("elimination order names an active or unknown player");
        }

        let active = rules::active_player_count(&self.players);
        match self.game_phase {
            GamePhase::Playing => {
                if self.winner.is_some() {
                    return corrupt("playing snapshot has a winner");
                }
                if active < 2 {
                    return corrupt("playing snapshot needs two active players");
                }
                if self.is_mouth_closed {
                    return corrupt("snapshot was taken mid-bite");
                }
                match self.current_player() {
                    Some(p) if !p.is_eliminated => {}
                    _ => return corrupt("current player is missing or eliminated"),
                }
                if self.is_trap_revealed() {
                    return corrupt("trap tooth already pressed in a live round");
                }
            }
            GamePhase::GameOver => {
                let sole = rules::determine_winner(&self.players);
                if active != 1 || sole != self.winner.as_ref() {
                    return corrupt("winner must be the sole active player");
                }
                if !self.is_trap_revealed() {
                    return corrupt("game ended without the trap being pressed");
                }
            }
            GamePhase::Setup => {}
        }
        Ok(())
    }
}

/// Renderer-facing snapshot. `trap_tooth_id` is `None` until the trap is hit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView<'a> {
    pub players: &'a [Player],
    pub current_player_index: usize,
    pub current_player: Option<&'a Player>,
    pub teeth: &'a [Tooth],
    pub remaining_teeth: usize,
    pub game_phase: GamePhase,
    pub winner: Option<&'a Player>,
    pub eliminated_players: &'a [Player],
    pub is_mouth_closed: bool,
    pub sound_enabled: bool,
    pub trap_tooth_id: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_player_game() -> GameState {
        GameState {
            players: rules::create_players(2),
            current_player_index: 0,
            teeth: rules::create_initial_teeth(),
            trap_tooth_id: 5,
            game_phase: GamePhase::Playing,
            winner: None,
            eliminated_players: Vec::new(),
            is_mouth_closed: false,
        }
    }

    #[test]
    fn default_is_setup() {
        let state = GameState::default();
        assert_eq!(state.game_phase, GamePhase::Setup);
        assert!(state.players.is_empty());
        assert!(state.winner.is_none());
        assert!(state.validate().is_ok());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_string(&two_player_game()).unwrap();
        assert!(json.contains("\"currentPlayerIndex\":0"));
        assert!(json.contains("\"trapToothId\":5"));
        assert!(json.contains("\"gamePhase\":\"playing\""));
        assert!(json.contains("\"isEliminated\":false"));
        assert!(json.contains("\"isMouthClosed\":false"));
    }

    #[test]
    fn view_hides_trap_until_pressed() {
        let mut state = two_player_game();
        assert_eq!(state.view(true).trap_tooth_id, None);
        state.teeth[4].is_pressed = true;
        assert_eq!(state.view(true).trap_tooth_id, Some(5));
    }

    #[test]
    fn view_counts_remaining_teeth() {
        let mut state = two_player_game();
        state.teeth[0].is_pressed = true;
        state.teeth[1].is_pressed = true;
        let view = state.view(false);
        assert_eq!(view.remaining_teeth, 11);
        assert!(!view.sound_enabled);
        assert_eq!(view.current_player.map(|p| p.id), Some(1));
    }

    #[test]
    fn validate_accepts_live_game() {
        assert!(two_player_game().validate().is_ok());
    }

    #[test]
    fn validate_rejects_short_tooth_set() {
        let mut state = two_player_game();
        state.teeth.pop();
        assert!(matches!(state.validate(), Err(GameError::CorruptSnapshot(_))));
    }

    #[test]
    fn validate_rejects_winner_while_playing() {
        let mut state = two_player_game();
        state.winner = Some(state.players[0].clone());
        assert!(state.validate().is_err());
    }

    #[test]
    fn validate_rejects_mid_bite_snapshot() {
        let mut state = two_player_game();
        state.is_mouth_closed = true;
        let err = state.validate().unwrap_err();
        assert!(err.to_string().contains("mid-bite"));
    }

    #[test]
    fn validate_rejects_inconsistent_eliminations() {
        let mut state = two_player_game();
        state.players[1].is_eliminated = true;
        assert!(state.validate().is_err());
    }

    /// Three players, P1 and P2 bitten in that order, P3 wins.
    fn three_player_finish() -> GameState {
        let mut players = rules::create_players(3);
        players[0].is_eliminated = true;
        players[1].is_eliminated = true;
        let mut teeth = rules::create_initial_teeth();
        teeth[4].is_pressed = true;
        GameState {
            eliminated_players: vec![players[0].clone(), players[1].clone()],
            winner: Some(players[2].clone()),
            players,
            current_player_index: 1,
            teeth,
            trap_tooth_id: 5,
            game_phase: GamePhase::GameOver,
            is_mouth_closed: true,
        }
    }

    #[test]
    fn validate_accepts_finished_game() {
        let mut state = two_player_game();
        state.players[1].is_eliminated = true;
        state.eliminated_players.push(state.players[1].clone());
        state.game_phase = GamePhase::GameOver;
        state.winner = Some(state.players[0].clone());
        state.is_mouth_closed = true;
        state.teeth[4].is_pressed = true;
        assert!(state.validate().is_ok());
        assert!(three_player_finish().validate().is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_elimination_record() {
        let mut state = three_player_finish();
        state.eliminated_players[1] = state.players[0].clone();
        let err = state.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn validate_rejects_mismatched_elimination_record() {
        let mut state = three_player_finish();
        state.eliminated_players[1].name = "Impostor".to_string();
        assert!(matches!(state.validate(), Err(GameError::CorruptSnapshot(_))));

        let mut state = three_player_finish();
        state.eliminated_players[0].is_eliminated = false;
        assert!(state.validate().is_err());
    }

    #[test]
    fn validate_rejects_game_over_with_unpressed_trap() {
        let mut state = three_player_finish();
        state.teeth[4].is_pressed = false;
        let err = state.validate().unwrap_err();
        assert!(err.to_string().contains("without the trap"));
    }

    #[test]
    fn validate_rejects_wrong_winner() {
        let mut state = two_player_game();
        state.players[1].is_eliminated = true;
        state.eliminated_players.push(state.players[1].clone());
        state.game_phase = GamePhase::GameOver;
        state.winner = Some(state.players[1].clone());
        assert!(state.validate().is_err());
    }
}

//! Game transitions: start a game and press a tooth.
//!
//! Transitions are pure: they read a state and return a `Transition` holding
//! the next state, the sound cues to play, and at most one `Continuation` the
//! caller must apply after a delay. Nothing here sleeps or schedules; the
//! session hands continuations to the browser's timers.

use rand::Rng;
use serde::Serialize;

use crate::config::GameConfig;
use crate::game::error::GameError;
use crate::game::model::{GamePhase, GameState, MAX_PLAYERS, MIN_PLAYERS};
use crate::game::rules;

/// Audio events for the sound collaborator. Fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundCue {
    Start,
    Click,
    Chomp,
    Winner,
}

/// Deferred follow-up to a trap press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContinuationKind {
    /// Replace the bite state with this freshly dealt round.
    RoundReset(Box<GameState>),
    /// Play the winner cue. State is already final.
    WinnerFanfare,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    pub delay_ms: u32,
    pub kind: ContinuationKind,
}

/// Result of an accepted transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: GameState,
    pub cues: Vec<SoundCue>,
    pub scheduled: Option<Continuation>,
}

/// Build a new game for `player_count` players: shuffled turn order, fresh
/// teeth, a rolled trap, first player up.
///
/// # Errors
/// `GameError::InvalidPlayerCount` unless `player_count` is 2, 3 or 4.
pub fn initialize_game<R: Rng + ?Sized>(
    player_count: usize,
    rng: &mut R,
) -> Result<Transition, GameError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
        return Err(GameError::InvalidPlayerCount(player_count));
    }

    let players = rules::shuffle_players(&rules::create_players(player_count), rng);
    let state = GameState {
        players,
        current_player_index: 0,
        teeth: rules::create_initial_teeth(),
        trap_tooth_id: rules::roll_trap_tooth(rng),
        game_phase: GamePhase::Playing,
        winner: None,
        eliminated_players: Vec::new(),
        is_mouth_closed: false,
    };

    Ok(Transition {
        state,
        cues: vec![SoundCue::Start],
        scheduled: None,
    })
}

/// Press tooth `tooth_id` for the current player.
///
/// A safe tooth passes the turn. The trap eliminates the current player and
/// closes the mouth; the returned continuation either deals the next round or
/// plays the winner fanfare. The next round's trap is rolled now, so the
/// continuation carries the exact state to apply.
///
/// # Errors
/// Rejected without touching `state` when the game is not playing, the mouth
/// is closed, the id is outside 1..=13, or the tooth is already pressed.
pub fn press_tooth<R: Rng + ?Sized>(
    state: &GameState,
    tooth_id: u8,
    rng: &mut R,
    config: &GameConfig,
) -> Result<Transition, GameError> {
    if state.game_phase != GamePhase::Playing {
        return Err(GameError::NotPlaying(state.game_phase));
    }
    if state.is_mouth_closed {
        return Err(GameError::MouthClosed);
    }
    let tooth = state
        .tooth(tooth_id)
        .ok_or(GameError::ToothOutOfRange(tooth_id))?;
    if tooth.is_pressed {
        return Err(GameError::ToothAlreadyPressed(tooth_id));
    }

    let mut next = state.clone();
    for t in next.teeth.iter_mut().filter(|t| t.id == tooth_id) {
        t.is_pressed = true;
    }

    if tooth_id != state.trap_tooth_id {
        next.current_player_index =
            rules::get_next_player_index(state.current_player_index, &state.players);
        return Ok(Transition {
            state: next,
            cues: vec![SoundCue::Click],
            scheduled: None,
        });
    }

    let bitten = state.current_player_index;
    let Some(player) = next.players.get_mut(bitten) else {
        return Err(GameError::CorruptSnapshot(
            "current player index out of range".to_string(),
        ));
    };
    player.is_eliminated = true;
    let record = player.clone();
    next.eliminated_players.push(record);
    next.is_mouth_closed = true;

    let winner = rules::determine_winner(&next.players).cloned();
    let scheduled = match winner {
        Some(winner) => {
            next.game_phase = GamePhase::GameOver;
            next.winner = Some(winner);
            Continuation {
                delay_ms: config.winner_cue_delay_ms,
                kind: ContinuationKind::WinnerFanfare,
            }
        }
        None => {
            let mut round = next.clone();
            round.teeth = rules::create_initial_teeth();
            round.trap_tooth_id = rules::roll_trap_tooth(rng);
            round.current_player_index = rules::get_next_player_index(bitten, &round.players);
            round.is_mouth_closed = false;
            Continuation {
                delay_ms: config.round_reset_delay_ms,
                kind: ContinuationKind::RoundReset(Box::new(round)),
            }
        }
    };

    Ok(Transition {
        state: next,
        cues: vec![SoundCue::Click, SoundCue::Chomp],
        scheduled: Some(scheduled),
    })
}

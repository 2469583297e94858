//! Game session: the worker-side orchestration around the pure engine.
//!
//! Uses `thread_local!` + `RefCell` for safe mutable access in single-threaded
//! WASM. The Web Worker keeps the module alive, so the session persists across
//! `handle_request` calls for the whole page visit.
//!
//! Every accepted transition replaces the stored `GameState` whole. Deferred
//! continuations (round reset, winner fanfare) are parked here under a ticket;
//! the page only learns the ticket and delay, starts a timer, and posts the
//! ticket back when it fires. A ticket applies once.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use std::cell::RefCell;
use tracing::{debug, info, warn};

use crate::config::{self, GameConfig};
use crate::game::engine::{self, Continuation, ContinuationKind, SoundCue, Transition};
use crate::game::error::GameError;
use crate::game::model::{GamePhase, GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScheduledKind {
    RoundReset,
    WinnerFanfare,
}

/// What the page needs to arm a timer. The follow-up state itself stays in
/// the session so the next trap never leaves the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheduled {
    pub ticket: u64,
    pub delay_ms: u32,
    pub kind: ScheduledKind,
}

/// Result of a session operation, ready for the renderer and sound player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub state: GameState,
    pub sound_enabled: bool,
    pub cues: Vec<SoundCue>,
    pub scheduled: Option<Scheduled>,
}

#[derive(Debug, Clone)]
struct Pending {
    ticket: u64,
    continuation: Continuation,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub game: GameState,
    pub sound_enabled: bool,
    pending: Vec<Pending>,
    next_ticket: u64,
    rng: SmallRng,
}

impl Session {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            game: GameState::default(),
            sound_enabled: config.sound_enabled,
            pending: Vec::new(),
            next_ticket: 1,
            rng: seeded_rng(config.seed),
        }
    }

    /// Number of continuations still waiting for their timer.
    #[cfg(test)]
    fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn update(&self, cues: Vec<SoundCue>, scheduled: Option<Scheduled>) -> Update {
        Update {
            state: self.game.clone(),
            sound_enabled: self.sound_enabled,
            cues: if self.sound_enabled { cues } else { Vec::new() },
            scheduled,
        }
    }

    /// Store the transition's state and park its continuation, if any.
    fn commit(&mut self, transition: Transition) -> Update {
        let Transition {
            state,
            cues,
            scheduled,
        } = transition;
        self.game = state;
        let scheduled = scheduled.map(|continuation| {
            let ticket = self.next_ticket;
            self.next_ticket += 1;
            let kind = match continuation.kind {
                ContinuationKind::RoundReset(_) => ScheduledKind::RoundReset,
                ContinuationKind::WinnerFanfare => ScheduledKind::WinnerFanfare,
            };
            let view = Scheduled {
                ticket,
                delay_ms: continuation.delay_ms,
                kind,
            };
            self.pending.push(Pending {
                ticket,
                continuation,
            });
            view
        });
        self.update(cues, scheduled)
    }
}

fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    }
}

thread_local! {
    static SESSION: RefCell<Session> = RefCell::new(Session::new(&GameConfig::default()));
}

/// Execute a closure with read access to the session.
pub fn with_session<F, R>(f: F) -> R
where
    F: FnOnce(&Session) -> R,
{
    SESSION.with(|s| f(&s.borrow()))
}

/// Execute a closure with mutable access to the session.
pub fn with_session_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut Session) -> R,
{
    SESSION.with(|s| f(&mut s.borrow_mut()))
}

/// Throw away everything and start over from the current config.
pub fn reset_session() {
    let fresh = Session::new(&config::current());
    with_session_mut(|s| *s = fresh);
}

/// Install a new config and carry its session-level settings over.
pub fn apply_config(new_config: GameConfig) {
    info!(
        round_reset_delay_ms = new_config.round_reset_delay_ms,
        winner_cue_delay_ms = new_config.winner_cue_delay_ms,
        seeded = new_config.seed.is_some(),
        "config updated"
    );
    with_session_mut(|s| {
        s.sound_enabled = new_config.sound_enabled;
        if new_config.seed.is_some() {
            s.rng = seeded_rng(new_config.seed);
        }
    });
    config::replace_config(new_config);
}

/// Current state with no cues, for initial paint and polling.
pub fn snapshot() -> Update {
    with_session(|s| s.update(Vec::new(), None))
}

/// `startGame`: a brand-new game. Discards any pending continuations.
pub fn start(player_count: usize) -> Result<Update, GameError> {
    with_session_mut(|s| {
        let transition = engine::initialize_game(player_count, &mut s.rng).inspect_err(|e| {
            warn!(player_count, error = %e, "start rejected");
        })?;
        s.pending.clear();
        let order: Vec<&str> = transition
            .state
            .players
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        info!(player_count, turn_order = ?order, "game started");
        Ok(s.commit(transition))
    })
}

/// `toothPress`: press a tooth for the current player.
pub fn press(tooth_id: u8) -> Result<Update, GameError> {
    let config = config::current();
    with_session_mut(|s| {
        let player = s.game.current_player().map(|p| p.name.clone());
        let transition =
            engine::press_tooth(&s.game, tooth_id, &mut s.rng, &config).inspect_err(|e| {
                warn!(tooth_id, error = %e, "press rejected");
            })?;

        if transition.scheduled.is_none() {
            debug!(tooth_id, player = ?player, "safe press");
        } else if transition.state.game_phase == GamePhase::GameOver {
            let winner = transition.state.winner.as_ref().map(|w| w.name.clone());
            info!(tooth_id, bitten = ?player, winner = ?winner, "game over");
        } else {
            info!(tooth_id, bitten = ?player, "player eliminated");
        }
        Ok(s.commit(transition))
    })
}

/// Timer completion for a ticket handed out by `start`/`press`.
///
/// # Errors
/// `GameError::UnknownContinuation` if the ticket already fired or was
/// discarded by a reset, restart or import.
pub fn advance(ticket: u64) -> Result<Update, GameError> {
    with_session_mut(|s| {
        let Some(pos) = s.pending.iter().position(|p| p.ticket == ticket) else {
            debug!(ticket, "stale or unknown continuation");
            return Err(GameError::UnknownContinuation(ticket));
        };
        let Pending { continuation, .. } = s.pending.remove(pos);
        match continuation.kind {
            ContinuationKind::RoundReset(round) => {
                s.game = *round;
                let next = s.game.current_player().map(|p| p.name.clone());
                info!(ticket, next_player = ?next, "round reset");
                Ok(s.update(Vec::new(), None))
            }
            ContinuationKind::WinnerFanfare => {
                debug!(ticket, "winner fanfare");
                Ok(s.update(vec![SoundCue::Winner], None))
            }
        }
    })
}

/// `resetGame`: back to setup.
pub fn reset() -> Update {
    with_session_mut(|s| {
        s.game = GameState::default();
        s.pending.clear();
        info!("game reset to setup");
        s.update(Vec::new(), None)
    })
}

pub fn set_sound_enabled(enabled: bool) -> Update {
    with_session_mut(|s| {
        s.sound_enabled = enabled;
        s.update(Vec::new(), None)
    })
}

pub fn toggle_sound() -> Update {
    let enabled = with_session(|s| !s.sound_enabled);
    set_sound_enabled(enabled)
}

/// Export the full game state (trap included) as JSON.
pub fn export_state_json() -> String {
    with_session(|s| serde_json::to_string(&s.game).unwrap_or_else(|_| "{}".to_string()))
}

/// Import a game state exported by `export_state_json`, validating it first.
/// Pending continuations are dropped.
pub fn import_state_json(json: &str) -> Result<Update, GameError> {
    let state: GameState =
        serde_json::from_str(json).map_err(|e| GameError::InvalidSnapshot(e.to_string()))?;
    state.validate().inspect_err(|e| {
        warn!(error = %e, "import rejected");
    })?;
    with_session_mut(|s| {
        s.game = state;
        s.pending.clear();
        info!(phase = %s.game.game_phase, "game state imported");
        Ok(s.update(Vec::new(), None))
    })
}

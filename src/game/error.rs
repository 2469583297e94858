//! Error taxonomy for game transitions.
//!
//! Every variant is a rejection: the state the caller holds is left exactly
//! as it was.

use thiserror::Error;

use crate::game::model::{GamePhase, MAX_PLAYERS, MIN_PLAYERS, TOOTH_COUNT};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("player count must be between {} and {}, got {}", MIN_PLAYERS, MAX_PLAYERS, .0)]
    InvalidPlayerCount(usize),

    #[error("tooth {} does not exist (teeth are numbered 1 to {})", .0, TOOTH_COUNT)]
    ToothOutOfRange(u8),

    #[error("tooth {0} has already been pressed")]
    ToothAlreadyPressed(u8),

    #[error("no game in progress (phase: {0})")]
    NotPlaying(GamePhase),

    #[error("the crocodile's mouth is closed")]
    MouthClosed,

    #[error("no pending continuation with ticket {0}")]
    UnknownContinuation(u64),

    #[error("invalid game state JSON: {0}")]
    InvalidSnapshot(String),

    #[error("snapshot violates game rules: {0}")]
    CorruptSnapshot(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

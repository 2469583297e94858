//! Runtime configuration for the game worker.
//!
//! Lives in its own `thread_local!` beside the session. Every field has a
//! default, so the page can post partial JSON (`{"seed": 42}`).

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

use crate::game::error::GameError;

/// Upper bound for either presentation delay.
pub const MAX_DELAY_MS: u32 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Bite animation length before the next round is dealt.
    pub round_reset_delay_ms: u32,
    /// Pause between the final bite and the winner fanfare.
    pub winner_cue_delay_ms: u32,
    pub sound_enabled: bool,
    /// Fixed RNG seed for reproducible games. `None` draws from entropy.
    pub seed: Option<u64>,
    /// `tracing_subscriber::EnvFilter` directive.
    pub log_filter: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_reset_delay_ms: 2000,
            winner_cue_delay_ms: 1000,
            sound_enabled: true,
            seed: None,
            log_filter: "info".to_string(),
        }
    }
}

impl GameConfig {
    /// # Errors
    /// Returns `GameError::InvalidConfig` if a delay exceeds `MAX_DELAY_MS`.
    pub fn validate(&self) -> Result<(), GameError> {
        for (name, value) in [
            ("roundResetDelayMs", self.round_reset_delay_ms),
            ("winnerCueDelayMs", self.winner_cue_delay_ms),
        ] {
            if value > MAX_DELAY_MS {
                return Err(GameError::InvalidConfig(format!(
                    "{} must be at most {} ms, got {}",
                    name, MAX_DELAY_MS, value
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let config: GameConfig = serde_json::from_str(json)
            .map_err(|e| GameError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

thread_local! {
    static CONFIG: RefCell<GameConfig> = RefCell::new(GameConfig::default());
}

/// Execute a closure with read access to the config.
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&GameConfig) -> R,
{
    CONFIG.with(|c| f(&c.borrow()))
}

/// Snapshot of the current config.
pub fn current() -> GameConfig {
    with_config(GameConfig::clone)
}

pub fn replace_config(new_config: GameConfig) {
    CONFIG.with(|c| {
        *c.borrow_mut() = new_config;
    });
}

pub fn export_config_json() -> String {
    with_config(|c| serde_json::to_string(c).unwrap_or_else(|_| "{}".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_presentation_timing() {
        let config = GameConfig::default();
        assert_eq!(config.round_reset_delay_ms, 2000);
        assert_eq!(config.winner_cue_delay_ms, 1000);
        assert!(config.sound_enabled);
        assert!(config.seed.is_none());
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{"seed": 42, "soundEnabled": false}"#).unwrap();
        assert_eq!(config.seed, Some(42));
        assert!(!config.sound_enabled);
        assert_eq!(config.round_reset_delay_ms, 2000);
    }

    #[test]
    fn rejects_oversized_delay() {
        let err = GameConfig::from_json(r#"{"roundResetDelayMs": 600000}"#).unwrap_err();
        assert!(err.to_string().contains("roundResetDelayMs"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            GameConfig::from_json("{not json"),
            Err(GameError::InvalidConfig(_))
        ));
    }

    #[test]
    fn replace_and_export() {
        replace_config(GameConfig {
            winner_cue_delay_ms: 500,
            ..GameConfig::default()
        });
        assert!(export_config_json().contains("\"winnerCueDelayMs\":500"));
        replace_config(GameConfig::default());
        assert_eq!(current(), GameConfig::default());
    }
}

//! Pure game rules: player setup, tooth sets, trap rolls, turn order and
//! winner detection. Nothing here touches session state; random draws go
//! through the caller's RNG.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::game::model::{Player, TOOTH_COUNT, Tooth};

const PLAYER_NAMES: [&str; 4] = ["P1", "P2", "P3", "P4"];

/// Positional names for the first `count` players.
pub fn generate_player_names(count: usize) -> Vec<String> {
    PLAYER_NAMES
        .iter()
        .take(count)
        .map(|n| n.to_string())
        .collect()
}

/// Players in count order with ids 1..=count, all active.
pub fn create_players(count: usize) -> Vec<Player> {
    generate_player_names(count)
        .into_iter()
        .enumerate()
        .map(|(i, name)| Player {
            id: i as u32 + 1,
            name,
            is_eliminated: false,
        })
        .collect()
}

/// A fresh set of 13 unpressed teeth.
pub fn create_initial_teeth() -> Vec<Tooth> {
    (1..=TOOTH_COUNT)
        .map(|id| Tooth {
            id,
            is_pressed: false,
        })
        .collect()
}

/// Uniform trap roll over 1..=13. Repeats across rounds are allowed.
pub fn roll_trap_tooth<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.random_range(1..=TOOTH_COUNT)
}

/// Unbiased (Fisher-Yates) permutation of the turn order. Names and ids move
/// with their player.
pub fn shuffle_players<R: Rng + ?Sized>(players: &[Player], rng: &mut R) -> Vec<Player> {
    let mut shuffled = players.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

pub fn active_player_count(players: &[Player]) -> usize {
    players.iter().filter(|p| !p.is_eliminated).count()
}

/// Next active player after `current_index`, scanning forward cyclically.
/// With one or no active players left, `current_index` comes back unchanged.
pub fn get_next_player_index(current_index: usize, players: &[Player]) -> usize {
    if active_player_count(players) <= 1 {
        return current_index;
    }
    let len = players.len();
    (1..len)
        .map(|step| (current_index + step) % len)
        .find(|&i| !players[i].is_eliminated)
        .unwrap_or(current_index)
}

/// The sole active player, if exactly one remains.
pub fn determine_winner(players: &[Player]) -> Option<&Player> {
    let mut active = players.iter().filter(|p| !p.is_eliminated);
    match (active.next(), active.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

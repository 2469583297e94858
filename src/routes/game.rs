//! `/api/game/*` and `/api/config` routes.
//!
//! Every game route answers with the same JSON envelope:
//! `{"state": <BoardView>, "cues": [...], "scheduled": {...} | null}`.
//! The page renders `state`, plays `cues`, and when `scheduled` is present
//! arms a timer that posts the ticket back to `/api/game/continue`.
//! Rejections answer `{"error": "..."}` and leave the session untouched.

use serde::Serialize;

use crate::config::{self, GameConfig};
use crate::game::engine::SoundCue;
use crate::game::model::BoardView;
use crate::game::session::{self, Scheduled, Update};
use crate::routes::util::{RequestError, optional, parse_form_body, require};

#[derive(Serialize)]
struct UpdateBody<'a> {
    state: BoardView<'a>,
    cues: &'a [SoundCue],
    scheduled: Option<Scheduled>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// Serialize an update for the renderer.
pub fn render_update(update: &Update) -> String {
    let body = UpdateBody {
        state: update.state.view(update.sound_enabled),
        cues: &update.cues,
        scheduled: update.scheduled,
    };
    serde_json::to_string(&body).unwrap_or_else(|_| error_json("failed to encode game state"))
}

pub fn error_json(message: &str) -> String {
    serde_json::to_string(&ErrorBody { error: message })
        .unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string())
}

fn respond(result: Result<Update, RequestError>) -> String {
    match result {
        Ok(update) => render_update(&update),
        Err(e) => error_json(&e.to_string()),
    }
}

// ── GET /api/game/state ────────────────────────────────────────────

/// Current snapshot, no cues. Used for first paint.
pub fn handle_state_get(_query: &str) -> String {
    render_update(&session::snapshot())
}

// ── POST /api/game/start ───────────────────────────────────────────

/// Body: `players={2..4}`
pub fn handle_start_post(body: &str) -> String {
    respond(start_game(body))
}

fn start_game(body: &str) -> Result<Update, RequestError> {
    let params = parse_form_body(body);
    let players: usize = require(&params, "players")?;
    Ok(session::start(players)?)
}

// ── POST /api/game/press ───────────────────────────────────────────

/// Body: `tooth={1..13}`
pub fn handle_press_post(body: &str) -> String {
    respond(press_tooth(body))
}

fn press_tooth(body: &str) -> Result<Update, RequestError> {
    let params = parse_form_body(body);
    let tooth: u8 = require(&params, "tooth")?;
    Ok(session::press(tooth)?)
}

// ── POST /api/game/continue ────────────────────────────────────────

/// Body: `ticket={n}`, posted by the page's timer when a scheduled
/// continuation comes due.
pub fn handle_continue_post(body: &str) -> String {
    respond(continue_ticket(body))
}

fn continue_ticket(body: &str) -> Result<Update, RequestError> {
    let params = parse_form_body(body);
    let ticket: u64 = require(&params, "ticket")?;
    Ok(session::advance(ticket)?)
}

// ── POST /api/game/reset ───────────────────────────────────────────

pub fn handle_reset_post(_body: &str) -> String {
    render_update(&session::reset())
}

// ── POST /api/game/sound ───────────────────────────────────────────

/// Body: `enabled=true|false`, or empty to toggle.
pub fn handle_sound_post(body: &str) -> String {
    respond(set_sound(body))
}

fn set_sound(body: &str) -> Result<Update, RequestError> {
    let params = parse_form_body(body);
    Ok(match optional::<bool>(&params, "enabled")? {
        Some(enabled) => session::set_sound_enabled(enabled),
        None => session::toggle_sound(),
    })
}

// ── GET /api/game/export ───────────────────────────────────────────

/// Full state including the trap, for the page to stash and import later.
pub fn handle_export_get(_query: &str) -> String {
    session::export_state_json()
}

// ── POST /api/game/import ──────────────────────────────────────────

/// Body: JSON produced by `/api/game/export`.
pub fn handle_import_post(body: &str) -> String {
    respond(session::import_state_json(body).map_err(RequestError::from))
}

// ── GET/POST /api/config ───────────────────────────────────────────

pub fn handle_config_get(_query: &str) -> String {
    config::export_config_json()
}

/// Body: `GameConfig` JSON; missing fields take their defaults.
pub fn handle_config_post(body: &str) -> String {
    match GameConfig::from_json(body) {
        Ok(new_config) => {
            session::apply_config(new_config);
            config::export_config_json()
        }
        Err(e) => error_json(&e.to_string()),
    }
}

//! Crocodile dentist in-browser WASM game server.
//!
//! Exports `handle_request(method, path, query, body)` for the Web Worker
//! bridge to call, and `init_worker(config_json)` to run once on worker start.
//! Uses `matchit` for URL routing, the same router engine that powers Axum.
//!
//! The page sends tooth presses and timer completions; every answer is a JSON
//! snapshot of the game plus the sound cues and any timer to arm.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod game;
pub mod logging;
pub mod routes;

/// Configure logging and the session. Call once when the worker boots.
///
/// `config_json` may be empty for defaults. Returns the effective config as
/// JSON, or an error body if the config was rejected (defaults stay in force).
#[wasm_bindgen]
pub fn init_worker(config_json: &str) -> String {
    let parsed = if config_json.trim().is_empty() {
        Ok(config::GameConfig::default())
    } else {
        config::GameConfig::from_json(config_json)
    };

    match parsed {
        Ok(cfg) => {
            logging::init(&cfg.log_filter);
            game::session::apply_config(cfg);
            config::export_config_json()
        }
        Err(e) => {
            logging::init(&config::with_config(|c| c.log_filter.clone()));
            tracing::warn!(error = %e, "worker config rejected");
            routes::game::error_json(&e.to_string())
        }
    }
}

/// Process an HTTP-like request and return a JSON string.
///
/// Called from JavaScript (Web Worker) via wasm-bindgen.
///
/// # Arguments
/// * `method`: HTTP method ("GET" or "POST")
/// * `path`: URL path (e.g., "/api/game/press")
/// * `query`: Query string (e.g., "?foo=bar")
/// * `body`: Request body (form data or JSON). Empty string for GET requests.
#[wasm_bindgen]
pub fn handle_request(method: &str, path: &str, query: &str, body: &str) -> String {
    let mut router = matchit::Router::new();

    router.insert("/api/game/state", "game_state").ok();
    router.insert("/api/game/start", "game_start").ok();
    router.insert("/api/game/press", "game_press").ok();
    router.insert("/api/game/continue", "game_continue").ok();
    router.insert("/api/game/reset", "game_reset").ok();
    router.insert("/api/game/sound", "game_sound").ok();
    router.insert("/api/game/export", "game_export").ok();
    router.insert("/api/game/import", "game_import").ok();
    router.insert("/api/config", "config").ok();

    match router.at(path) {
        Ok(matched) => match (*matched.value, method) {
            ("game_state", "GET") => routes::game::handle_state_get(query),
            ("game_export", "GET") => routes::game::handle_export_get(query),
            ("config", "GET") => routes::game::handle_config_get(query),

            ("game_start", "POST") => routes::game::handle_start_post(body),
            ("game_press", "POST") => routes::game::handle_press_post(body),
            ("game_continue", "POST") => routes::game::handle_continue_post(body),
            ("game_reset", "POST") => routes::game::handle_reset_post(body),
            ("game_sound", "POST") => routes::game::handle_sound_post(body),
            ("game_import", "POST") => routes::game::handle_import_post(body),
            ("config", "POST") => routes::game::handle_config_post(body),

            _ => method_not_allowed(method, path),
        },
        Err(_) => not_found(path),
    }
}

fn not_found(path: &str) -> String {
    tracing::debug!(path, "route not found");
    routes::game::error_json("404: route not found")
}

fn method_not_allowed(method: &str, path: &str) -> String {
    tracing::debug!(method, path, "method not allowed");
    routes::game::error_json("405: method not allowed")
}

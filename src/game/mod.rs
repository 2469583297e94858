//! Game module: the crocodile dentist state machine and the worker session
//! that drives it.
//!
//! `model`, `rules` and `engine` are pure; `session` owns the only mutable
//! state (thread_local WASM memory for the lifetime of the Web Worker).

pub mod engine;
pub mod error;
pub mod model;
pub mod rules;
pub mod session;

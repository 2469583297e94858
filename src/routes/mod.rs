//! Route handlers called from `handle_request`.

pub mod game;
pub mod util;

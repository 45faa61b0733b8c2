//! Game module — in-memory trivia state for the lifetime of the Web Worker.
//!
//! The catalog holds the loaded sheet's questions, the roster persists
//! player profiles across visits, and the session is the live progression
//! state machine for the logged-in player. State lives in WASM memory
//! (thread_local), with the roster additionally encoded for localStorage.

pub mod catalog;
pub mod errors;
pub mod modes;
pub mod roster;
pub mod rounds;
pub mod session;
pub mod skin;

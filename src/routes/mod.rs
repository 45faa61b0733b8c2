//! Route handlers, one module per API surface.

pub mod play;
pub mod players;
pub mod sheets;
pub mod util;

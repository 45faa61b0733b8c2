//! Error types shared across the game modules.
//!
//! None of these are fatal: the worst case is that the current round's
//! progress is not persisted and must be re-earned.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    /// Question or sheet-list JSON could not be parsed. Prior state is left
    /// untouched; the caller may refetch and retry.
    #[error("data fetch failed: {0}")]
    DataFetch(String),

    /// A caller broke an API precondition (answering with no active round,
    /// answering after game over, ...). Rejected without mutation.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// Roster encode/restore failed. Gameplay continues; the next successful
    /// mutation retries the write.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

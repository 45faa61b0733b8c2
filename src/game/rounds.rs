//! Category round selection.
//!
//! A round is a set of at most [`ROUND_SIZE`] categories shown on the board
//! at once. Selection is a pure function over the category list, the used
//! set, and an injected random source — no hidden state, so tests can seed
//! the RNG and get repeatable draws.

use rand::Rng;
use std::collections::BTreeSet;

/// How many categories a round presents at once.
pub const ROUND_SIZE: usize = 2;

/// Draw the next round's categories.
///
/// Picks `round_size` distinct categories uniformly without replacement from
/// `all` minus `used`. When fewer than `round_size` remain, returns all of
/// them in catalog order; when none remain, returns an empty Vec (no more
/// rounds).
pub fn select_round<R: Rng>(
    all: &[String],
    used: &BTreeSet<String>,
    round_size: usize,
    rng: &mut R,
) -> Vec<String> {
    let available: Vec<&String> = all.iter().filter(|cat| !used.contains(*cat)).collect();

    if available.len() <= round_size {
        return available.into_iter().cloned().collect();
    }

    let mut picked: Vec<String> = Vec::with_capacity(round_size);
    while picked.len() < round_size {
        let idx = rng.gen_range(0..available.len());
        let cat = available[idx];
        if !picked.iter().any(|c| c == cat) {
            picked.push(cat.clone());
        }
    }
    picked
}

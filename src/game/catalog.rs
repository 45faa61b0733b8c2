//! Question catalog — the module-side of the question source boundary.
//!
//! The WASM module cannot fetch; the JS bridge pulls the sheet list and each
//! sheet's questions from the spreadsheet proxy and POSTs the JSON in. The
//! catalog validates the records and answers lookups for the session.
//!
//! Loads are guarded by a token so the last request wins: `begin_load`
//! hands out a fresh token, and `complete_load` with any older token is
//! discarded. A fetch that fails or is cancelled simply never completes, so
//! prior state stays untouched.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashSet;

use crate::game::errors::GameError;

/// A single question record as delivered by the spreadsheet API.
///
/// `question` is the identity key: unique and non-empty within a loaded set.
/// Records violating that are dropped at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub category: String,
    pub difficulty: String,
    pub question: String,
    pub correct: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub explanation: String,
    /// Point value. The sheet cell may be empty or non-numeric; both
    /// deserialize to None and contribute 0 to the score.
    #[serde(default, deserialize_with = "lenient_rate")]
    pub rate: Option<u32>,
}

/// One entry of the sheet list the welcome screen offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetInfo {
    pub id: u32,
    pub name: String,
}

/// Accept a number, a numeric string, or anything else (→ None) for `rate`.
fn lenient_rate<'de, D>(de: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(de)?;
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| f as u32))
}

/// Catalog state: the sheet list, the currently loaded sheet, and its
/// questions. `load_epoch` is the token of the most recent `begin_load`.
#[derive(Debug, Default)]
pub struct Catalog {
    sheets: Vec<SheetInfo>,
    sheet: Option<String>,
    questions: Vec<Question>,
    load_epoch: u64,
}

thread_local! {
    static CATALOG: RefCell<Catalog> = RefCell::new(Catalog::default());
}

/// Reset the catalog to empty (session start / tests).
pub fn reset_catalog() {
    CATALOG.with(|c| *c.borrow_mut() = Catalog::default());
}

/// Store the fetched sheet list. Returns how many sheets were stored.
pub fn set_sheets(json: &str) -> Result<usize, GameError> {
    let sheets: Vec<SheetInfo> = serde_json::from_str(json)
        .map_err(|e| GameError::DataFetch(format!("invalid sheet list: {e}")))?;
    let count = sheets.len();
    CATALOG.with(|c| c.borrow_mut().sheets = sheets);
    Ok(count)
}

/// The sheet list as last fetched.
pub fn sheets() -> Vec<SheetInfo> {
    CATALOG.with(|c| c.borrow().sheets.clone())
}

/// Start loading a sheet. Returns the token the completion must present.
/// Any load still in flight for an older token becomes stale.
pub fn begin_load(sheet: &str) -> u64 {
    CATALOG.with(|c| {
        let mut cat = c.borrow_mut();
        cat.load_epoch += 1;
        log::info!("[LOAD] begin sheet:{} token:{}", sheet, cat.load_epoch);
        cat.load_epoch
    })
}

/// Complete a load started by [`begin_load`]. Returns `Ok(false)` when the
/// token is stale (a newer load started meanwhile) — the result is discarded
/// and nothing changes.
pub fn complete_load(token: u64, sheet: &str, json: &str) -> Result<bool, GameError> {
    let current = CATALOG.with(|c| c.borrow().load_epoch);
    if token != current {
        log::warn!(
            "[LOAD] stale result discarded sheet:{} token:{} current:{}",
            sheet,
            token,
            current
        );
        return Ok(false);
    }

    let raw: Vec<Question> = serde_json::from_str(json)
        .map_err(|e| GameError::DataFetch(format!("invalid questions for '{sheet}': {e}")))?;

    // Enforce the identity-key invariant: non-empty, unique question text.
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut questions: Vec<Question> = Vec::with_capacity(raw.len());
    let mut dropped = 0usize;
    for q in raw {
        if q.question.trim().is_empty() || !seen.insert(q.question.clone()) {
            dropped += 1;
            continue;
        }
        questions.push(q);
    }
    if dropped > 0 {
        log::warn!("[LOAD] dropped {} invalid/duplicate records from '{}'", dropped, sheet);
    }

    log::info!(
        "[LOAD] complete sheet:{} questions:{} categories:{}",
        sheet,
        questions.len(),
        category_count(&questions)
    );
    CATALOG.with(|c| {
        let mut cat = c.borrow_mut();
        cat.sheet = Some(sheet.to_string());
        cat.questions = questions;
    });
    Ok(true)
}

fn category_count(questions: &[Question]) -> usize {
    let mut seen = HashSet::new();
    questions.iter().filter(|q| seen.insert(&q.category)).count()
}

/// Name of the currently loaded sheet, if any.
pub fn current_sheet() -> Option<String> {
    CATALOG.with(|c| c.borrow().sheet.clone())
}

/// All questions of the loaded sheet.
pub fn questions() -> Vec<Question> {
    CATALOG.with(|c| c.borrow().questions.clone())
}

/// Category names in first-appearance order, deduplicated.
pub fn categories() -> Vec<String> {
    CATALOG.with(|c| {
        let cat = c.borrow();
        let mut seen = HashSet::new();
        cat.questions
            .iter()
            .filter(|q| seen.insert(q.category.clone()))
            .map(|q| q.category.clone())
            .collect()
    })
}

//! `/api/session`, `/api/answer`, `/api/board`, `/api/categories` routes —
//! the in-round surface the game board talks to.

use crate::game::{catalog, roster, session};
use crate::routes::util::{get_param, json_error, json_message, json_ok, parse_form_body};
use serde::Serialize;

// ── GET /api/session ───────────────────────────────────────────────

/// Everything the UI needs to render: phase, player, board, wrong answers.
pub fn handle_session_get(_query: &str) -> String {
    json_ok(&session::with_session(|s| s.snapshot()))
}

// ── POST /api/answer ───────────────────────────────────────────────

#[derive(Serialize)]
struct AnswerResponse {
    #[serde(flatten)]
    outcome: session::AnswerOutcome,
    player: Option<session::PlayerSnapshot>,
}

/// Record one answered question. Body params:
///   - `question={s}` — the question text (the identity key)
///   - `answer={s}`   — the chosen option
///
/// All scoring, HP, streak, and round-advance logic runs inside the
/// session; the updated profile is written back to the roster before the
/// response, so a crashed tab loses nothing.
pub fn handle_answer_post(body: &str) -> String {
    let params = parse_form_body(body);
    let question = match get_param(&params, "question") {
        Some(q) if !q.is_empty() => q,
        _ => return json_message("missing question parameter"),
    };
    let chosen = match get_param(&params, "answer") {
        Some(a) => a,
        None => return json_message("missing answer parameter"),
    };

    let result = session::with_session_mut(|s| {
        let outcome = s.answer(question, chosen)?;
        Ok::<_, crate::game::errors::GameError>((outcome, s.to_record()))
    });
    match result {
        Ok((outcome, record)) => {
            log::info!(
                "[ANSWER] correct:{} delta:{} phase:{:?}",
                outcome.correct,
                outcome.score_delta,
                outcome.phase
            );
            if let Some(rec) = record {
                roster::upsert_player(&rec);
            }
            let player = session::with_session(|s| s.player_snapshot());
            json_ok(&AnswerResponse { outcome, player })
        }
        Err(e) => json_error(&e),
    }
}

// ── GET /api/board ─────────────────────────────────────────────────

#[derive(Serialize)]
struct BoardResponse {
    phase: session::Phase,
    current_categories: Vec<String>,
    questions: Vec<catalog::Question>,
    answered: std::collections::HashMap<String, bool>,
}

/// The current round only: categories, their questions, and which of them
/// are already answered.
pub fn handle_board_get(_query: &str) -> String {
    json_ok(&session::with_session(|s| BoardResponse {
        phase: s.phase(),
        current_categories: s.current_categories().to_vec(),
        questions: s.current_round_questions(),
        answered: s.snapshot().answered,
    }))
}

// ── GET /api/categories ────────────────────────────────────────────

#[derive(Serialize)]
struct CategoriesResponse {
    all: Vec<String>,
    available: Vec<String>,
    used: Vec<String>,
    current: Vec<String>,
}

/// Category bookkeeping: the full catalog order, what is still in the
/// pool, what has been retired, and what is on the board right now.
pub fn handle_categories_get(_query: &str) -> String {
    json_ok(&session::with_session(|s| CategoriesResponse {
        all: catalog::categories(),
        available: s.available_categories(),
        used: s.used_categories().iter().cloned().collect(),
        current: s.current_categories().to_vec(),
    }))
}

//! Trivia in-browser WASM server.
//!
//! Exports `handle_request(method, path, query, body)` for the Web Worker
//! bridge to call. Uses `matchit` for URL routing — the same router
//! engine that powers Axum.
//!
//! The module cannot fetch: the JS bridge pulls sheet and question JSON
//! from the spreadsheet proxy and POSTs it in through `/api/sheets` and
//! `/api/questions/*`. Everything else — round selection, progression,
//! the player roster — lives in WASM memory for the worker's lifetime,
//! with the roster additionally persisted to localStorage as base64.

use wasm_bindgen::prelude::*;

pub mod game;
pub mod routes;

/// Process an HTTP-like request and return a JSON string.
///
/// Called from JavaScript (Web Worker) via wasm-bindgen.
///
/// # Arguments
/// * `method` — HTTP method (e.g., "GET", "POST")
/// * `path`   — URL path (e.g., "/api/answer")
/// * `query`  — Query string (e.g., "?sheet=Movies&token=3")
/// * `body`   — Request body (form data or raw JSON). Empty string for GET.
///
/// # Returns
/// A JSON response body, or `{"error": ...}` on failure. `/api/players/state`
/// alone returns raw base64 for direct localStorage storage.
#[wasm_bindgen]
pub fn handle_request(method: &str, path: &str, query: &str, body: &str) -> String {
    // Build the router. matchit compiles route patterns into a radix tree.
    let mut router = matchit::Router::new();

    // Register routes — the value is a &str tag we match on below
    router.insert("/api/sheets", "sheets").ok();
    router.insert("/api/questions/begin", "questions_begin").ok();
    router.insert("/api/questions/load", "questions_load").ok();

    // Player lifecycle and roster persistence
    router.insert("/api/players", "players").ok();
    router.insert("/api/players/login", "players_login").ok();
    router.insert("/api/players/logout", "players_logout").ok();
    router.insert("/api/players/restart", "players_restart").ok();
    router.insert("/api/players/state", "players_state").ok();
    router.insert("/api/players/restore", "players_restore").ok();

    // In-round surface
    router.insert("/api/session", "session").ok();
    router.insert("/api/answer", "answer").ok();
    router.insert("/api/board", "board").ok();
    router.insert("/api/categories", "categories").ok();
    router.insert("/api/skin", "skin").ok();

    match router.at(path) {
        Ok(matched) => match (*matched.value, method) {
            // GET routes
            ("sheets", "GET") => routes::sheets::handle_sheets_get(query),
            ("players", "GET") => routes::players::handle_players_get(query),
            ("players_state", "GET") => routes::players::handle_state_get(query),
            ("session", "GET") => routes::play::handle_session_get(query),
            ("board", "GET") => routes::play::handle_board_get(query),
            ("categories", "GET") => routes::play::handle_categories_get(query),
            ("skin", "GET") => routes::players::handle_skin_get(query),

            // POST routes
            ("sheets", "POST") => routes::sheets::handle_sheets_post(body),
            ("questions_begin", "POST") => routes::sheets::handle_questions_begin_post(body),
            ("questions_load", "POST") => routes::sheets::handle_questions_load_post(query, body),
            ("players_login", "POST") => routes::players::handle_login_post(body),
            ("players_logout", "POST") => routes::players::handle_logout_post(body),
            ("players_restart", "POST") => routes::players::handle_restart_post(body),
            ("players_restore", "POST") => routes::players::handle_restore_post(body),
            ("answer", "POST") => routes::play::handle_answer_post(body),
            ("skin", "POST") => routes::players::handle_skin_post(body),

            _ => method_not_allowed(),
        },
        Err(_) => not_found(),
    }
}

fn not_found() -> String {
    r#"{"error":"404 — route not found"}"#.to_string()
}

fn method_not_allowed() -> String {
    r#"{"error":"405 — method not allowed"}"#.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEETS: &str = r#"[{"id":1,"name":"Quiz"}]"#;
    const QUESTIONS: &str = r#"[
        {"category":"Space","difficulty":"easy","question":"Closest star?",
         "correct":"Sun","options":["Sun","Vega"],"explanation":"","rate":10},
        {"category":"Oceans","difficulty":"easy","question":"Deepest trench?",
         "correct":"Mariana","options":["Mariana","Tonga"],"explanation":"","rate":20}
    ]"#;

    fn reset() {
        game::catalog::reset_catalog();
        game::roster::init_roster();
        game::session::reset_session();
    }

    fn load_and_login() {
        handle_request("POST", "/api/sheets", "", SHEETS);
        let begin = handle_request("POST", "/api/questions/begin", "", "sheet=Quiz");
        let token: serde_json::Value = serde_json::from_str(&begin).unwrap();
        let query = format!("?token={}&sheet=Quiz", token["token"]);
        handle_request("POST", "/api/questions/load", &query, QUESTIONS);
        handle_request("POST", "/api/players/login", "", "name=Ada&sheet=Quiz&seed=7");
    }

    #[test]
    fn returns_404_for_unknown_route() {
        let out = handle_request("GET", "/api/nonexistent", "", "");
        assert!(out.contains("404"));
    }

    #[test]
    fn returns_405_for_wrong_method() {
        let out = handle_request("GET", "/api/answer", "", "");
        assert!(out.contains("405"));
        let out = handle_request("POST", "/api/board", "", "");
        assert!(out.contains("405"));
    }

    #[test]
    fn routes_sheets_roundtrip() {
        reset();
        let out = handle_request("POST", "/api/sheets", "", SHEETS);
        assert!(out.contains("\"sheets\":1"));
        let out = handle_request("GET", "/api/sheets", "", "");
        assert!(out.contains("Quiz"));
        reset();
    }

    #[test]
    fn routes_full_game_flow() {
        reset();
        load_and_login();

        let out = handle_request("GET", "/api/session", "", "");
        assert!(out.contains("in_round"));
        assert!(out.contains("Ada"));

        let out = handle_request(
            "POST",
            "/api/answer",
            "",
            "question=Closest+star%3F&answer=Sun",
        );
        assert!(out.contains("\"correct\":true"));

        let out = handle_request("GET", "/api/board", "", "");
        assert!(out.contains("\"Closest star?\":true"));

        let out = handle_request("POST", "/api/players/logout", "", "");
        assert!(out.contains("\"score\":10"));
        reset();
    }

    #[test]
    fn routes_players_state_is_raw_base64() {
        reset();
        load_and_login();
        let state = handle_request("GET", "/api/players/state", "", "");
        assert!(!state.starts_with('{'));

        reset();
        let out = handle_request("POST", "/api/players/restore", "", &state);
        assert!(out.contains("\"players\":1"));
        reset();
    }

    #[test]
    fn routes_skin_get_and_post() {
        reset();
        let out = handle_request("GET", "/api/skin", "", "");
        assert!(out.contains("classic"));
        let out = handle_request("POST", "/api/skin", "", "skin=minimal");
        assert!(out.contains("minimal"));
        reset();
    }

    #[test]
    fn routes_categories() {
        reset();
        load_and_login();
        let out = handle_request("GET", "/api/categories", "", "");
        assert!(out.contains("Space"));
        assert!(out.contains("Oceans"));
        reset();
    }
}

//! `/api/sheets` and `/api/questions/*` routes — the question source
//! boundary.
//!
//! The WASM module cannot fetch, so the JS bridge pulls JSON from the
//! spreadsheet proxy and POSTs it here. Sheet loads use a begin/complete
//! token pair so a slow fetch that arrives after a newer one started is
//! discarded (last request wins).

use crate::game::{catalog, session};
use crate::routes::util::{get_param, json_error, json_message, json_ok, parse_form_body, parse_query};

// ── POST /api/sheets ───────────────────────────────────────────────

/// Store the fetched sheet list. Body is the raw JSON array
/// `[{"id":1,"name":"..."}]`.
pub fn handle_sheets_post(body: &str) -> String {
    match catalog::set_sheets(body) {
        Ok(count) => json_ok(&serde_json::json!({ "sheets": count })),
        Err(e) => json_error(&e),
    }
}

// ── GET /api/sheets ────────────────────────────────────────────────

/// The sheet list for the welcome screen.
pub fn handle_sheets_get(_query: &str) -> String {
    json_ok(&catalog::sheets())
}

// ── POST /api/questions/begin ──────────────────────────────────────

/// Start loading a sheet. Returns `{"token": n}`; the bridge echoes the
/// token back to `/api/questions/load` once the fetch finishes.
pub fn handle_questions_begin_post(body: &str) -> String {
    let params = parse_form_body(body);
    let sheet = match get_param(&params, "sheet") {
        Some(s) if !s.is_empty() => s,
        _ => return json_message("missing sheet parameter"),
    };
    let token = catalog::begin_load(sheet);
    json_ok(&serde_json::json!({ "token": token }))
}

// ── POST /api/questions/load ───────────────────────────────────────

/// Complete a sheet load. Query carries `token` and `sheet`; the body is
/// the raw questions JSON. A stale token returns `{"loaded": false}` and
/// changes nothing.
pub fn handle_questions_load_post(query: &str, body: &str) -> String {
    let params = parse_query(query);
    let sheet = match get_param(&params, "sheet") {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => return json_message("missing sheet parameter"),
    };
    let token: u64 = match get_param(&params, "token").and_then(|t| t.parse().ok()) {
        Some(t) => t,
        None => return json_message("missing or invalid token parameter"),
    };

    match catalog::complete_load(token, &sheet, body) {
        Ok(true) => {
            // The live session plays from the freshly loaded set.
            session::with_session_mut(|s| s.set_questions(catalog::questions()));
            json_ok(&serde_json::json!({
                "loaded": true,
                "sheet": sheet,
                "questions": catalog::questions().len(),
                "categories": catalog::categories().len(),
            }))
        }
        Ok(false) => json_ok(&serde_json::json!({ "loaded": false })),
        Err(e) => json_error(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::session::reset_session;

    fn reset() {
        catalog::reset_catalog();
        reset_session();
    }

    const QUESTIONS: &str = r#"[
        {"category":"Space","difficulty":"easy","question":"Closest star?",
         "correct":"Sun","options":["Sun","Vega"],"explanation":"","rate":10}
    ]"#;

    #[test]
    fn sheets_roundtrip() {
        reset();
        let out = handle_sheets_post(r#"[{"id":1,"name":"Movies"}]"#);
        assert!(out.contains("\"sheets\":1"));
        let listed = handle_sheets_get("");
        assert!(listed.contains("Movies"));
        reset();
    }

    #[test]
    fn begin_returns_token() {
        reset();
        let out = handle_questions_begin_post("sheet=Movies");
        assert!(out.contains("token"));
        reset();
    }

    #[test]
    fn load_requires_current_token() {
        reset();
        handle_questions_begin_post("sheet=First");
        let out = handle_questions_load_post("?token=1&sheet=First", QUESTIONS);
        assert!(out.contains("\"loaded\":true"));

        // An old token after a newer begin is discarded.
        handle_questions_begin_post("sheet=Second");
        handle_questions_begin_post("sheet=Third");
        let out = handle_questions_load_post("?token=2&sheet=Second", QUESTIONS);
        assert!(out.contains("\"loaded\":false"));
        assert_eq!(catalog::current_sheet().as_deref(), Some("First"));
        reset();
    }

    #[test]
    fn load_rejects_missing_params() {
        reset();
        assert!(handle_questions_load_post("?token=abc&sheet=X", QUESTIONS).contains("error"));
        assert!(handle_questions_load_post("?token=1", QUESTIONS).contains("error"));
        reset();
    }

    #[test]
    fn bad_json_reports_data_fetch() {
        reset();
        handle_questions_begin_post("sheet=Movies");
        let out = handle_questions_load_post("?token=1&sheet=Movies", "not json");
        assert!(out.contains("data_fetch"));
        reset();
    }
}

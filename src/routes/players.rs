//! `/api/players/*` routes — profile lifecycle and roster persistence.
//!
//! Profiles live in the roster document; the session only mirrors the
//! logged-in one. Every route that mutates the session writes the profile
//! back to the roster before returning, so the bridge can persist
//! `/api/players/state` at any moment without losing progress.

use crate::game::errors::GameError;
use crate::game::modes::GameType;
use crate::game::roster::{self, PlayerRecord};
use crate::game::session;
use crate::game::skin::Skin;
use crate::game::catalog;
use crate::routes::util::{get_param, json_error, json_message, json_ok, parse_form_body, parse_query};

// ── POST /api/players/login ────────────────────────────────────────

/// Log a player in. Body params:
///   - `name={s}`      — player name (case-insensitive match against the roster)
///   - `sheet={s}`     — sheet the player wants to play
///   - `game_type={s}` — optional rule variant; omitted keeps the stored one
///   - `seed={n}`      — optional RNG seed from the JS clock
///
/// An existing profile on the same sheet resumes where it left off. A
/// profile that is exhausted, or tied to a different sheet, starts fresh
/// under its stored name. Unknown names create a new profile.
pub fn handle_login_post(body: &str) -> String {
    let params = parse_form_body(body);
    let name = match get_param(&params, "name").map(str::trim) {
        Some(n) if !n.is_empty() => n,
        _ => return json_message("missing name parameter"),
    };
    let sheet = match get_param(&params, "sheet") {
        Some(s) if !s.is_empty() => s,
        _ => return json_message("missing sheet parameter"),
    };
    if catalog::questions().is_empty() {
        return json_error(&GameError::Precondition(format!(
            "no questions loaded for '{sheet}'"
        )));
    }

    let mut record = match roster::find_player_ci(name) {
        Some(existing) if !existing.is_exhausted() && existing.sheet == sheet => {
            log::info!("[LOGIN] resume name:{} sheet:{}", existing.name, sheet);
            existing
        }
        Some(existing) => {
            // Keep the stored spelling of the name; everything else resets.
            log::info!("[LOGIN] fresh name:{} sheet:{}", existing.name, sheet);
            PlayerRecord::new(&existing.name, sheet)
        }
        None => {
            log::info!("[LOGIN] new name:{} sheet:{}", name, sheet);
            PlayerRecord::new(name, sheet)
        }
    };
    if let Some(mode) = get_param(&params, "game_type") {
        record.game_type = GameType::from_key(mode);
    }

    session::with_session_mut(|s| {
        if let Some(seed) = get_param(&params, "seed").and_then(|v| v.parse().ok()) {
            s.reseed(seed);
        }
        s.set_questions(catalog::questions());
        s.login(&record);
    });
    roster::upsert_player(&record);
    json_ok(&session::with_session(|s| s.snapshot()))
}

// ── POST /api/players/logout ───────────────────────────────────────

/// End the session. The profile is written back so the player can resume.
pub fn handle_logout_post(_body: &str) -> String {
    let record = session::with_session_mut(|s| s.logout());
    match record {
        Some(rec) => {
            log::info!("[LOGOUT] name:{} score:{} level:{}", rec.name, rec.score, rec.level);
            roster::upsert_player(&rec);
            json_ok(&rec)
        }
        None => json_error(&GameError::Precondition("no player logged in".into())),
    }
}

// ── POST /api/players/restart ──────────────────────────────────────

/// Start the logged-in player over: fresh stats, new first round.
pub fn handle_restart_post(_body: &str) -> String {
    let result = session::with_session_mut(|s| {
        s.restart()?;
        Ok::<_, GameError>(s.to_record())
    });
    match result {
        Ok(Some(rec)) => {
            log::info!("[RESTART] name:{}", rec.name);
            roster::upsert_player(&rec);
            json_ok(&session::with_session(|s| s.snapshot()))
        }
        Ok(None) => json_error(&GameError::Precondition("no player logged in".into())),
        Err(e) => json_error(&e),
    }
}

// ── GET /api/players ───────────────────────────────────────────────

/// Leaderboard. `?sheet={s}` filters to one sheet (score descending);
/// without it, every profile in name order.
pub fn handle_players_get(query: &str) -> String {
    let params = parse_query(query);
    match get_param(&params, "sheet") {
        Some(sheet) if !sheet.is_empty() => json_ok(&roster::players_for_sheet(sheet)),
        _ => json_ok(&roster::all_players()),
    }
}

// ── GET /api/players/state ─────────────────────────────────────────

/// The full roster as URL-safe base64 for localStorage.
pub fn handle_state_get(_query: &str) -> String {
    roster::encode_full_state()
}

// ── POST /api/players/restore ──────────────────────────────────────

/// Restore the roster from a persisted base64 state (page load).
pub fn handle_restore_post(body: &str) -> String {
    match roster::restore_from_state(body.trim()) {
        Ok(()) => {
            let count = roster::all_players().len();
            log::info!("[RESTORE] players:{}", count);
            json_ok(&serde_json::json!({ "players": count }))
        }
        Err(e) => json_error(&e),
    }
}

// ── GET/POST /api/skin ─────────────────────────────────────────────

/// The active skin and the closed set of valid choices.
pub fn handle_skin_get(_query: &str) -> String {
    let skin = session::with_session(|s| s.skin());
    json_ok(&serde_json::json!({ "skin": skin, "all": Skin::all() }))
}

/// Switch skins. Unknown keys fall back to the default rather than erroring.
pub fn handle_skin_post(body: &str) -> String {
    let params = parse_form_body(body);
    let skin = Skin::from_key(get_param(&params, "skin").unwrap_or(""));
    let record = session::with_session_mut(|s| {
        s.set_skin(skin);
        s.to_record()
    });
    if let Some(rec) = record {
        roster::upsert_player(&rec);
    }
    json_ok(&serde_json::json!({ "skin": skin }))
}

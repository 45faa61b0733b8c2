//! Player roster — persistent yrs document holding every player profile.
//!
//! The roster is the authoritative store for named player profiles (level,
//! score, hp, streak, sheet affinity, skin). It is created once on first
//! visit, persisted to localStorage as URL-safe base64 binary by the JS
//! bridge, and restored on every page load. Profiles are never deleted:
//! exhausted players (hp ≤ 0) stay in the roster for the leaderboard.
//!
//! ## Doc structure
//!
//! ```text
//! ROSTER_DOC (yrs::Doc)
//! └── "players" (YMap keyed by player name)
//!     └── "Alice" (YMap)
//!         ├── "level" / "score" / "hp" / "streak" (number)
//!         ├── "total_correct" / "total_asked" (number)
//!         ├── "sheet" (string)
//!         └── "skin" (string)
//! ```

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use yrs::updates::decoder::Decode;
use yrs::{Any, Doc, Map, MapPrelim, MapRef, ReadTxn, StateVector, Transact, Update, WriteTxn};

use crate::game::errors::GameError;
use crate::game::modes::GameType;
use crate::game::skin::Skin;

/// Hit points a fresh player starts with.
pub const STARTING_HP: i32 = 5;

/// One named player profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub level: u32,
    pub score: u32,
    pub hp: i32,
    /// Consecutive fully-correct rounds since the last HP bonus.
    pub streak: u32,
    /// Sheet this profile plays on.
    pub sheet: String,
    /// Rule variant the profile was created under.
    pub game_type: GameType,
    pub skin: Skin,
    pub total_correct: u32,
    pub total_asked: u32,
}

impl PlayerRecord {
    /// A fresh profile for `name` on `sheet`: level 1, empty score, full HP.
    pub fn new(name: &str, sheet: &str) -> Self {
        Self {
            name: name.to_string(),
            level: 1,
            score: 0,
            hp: STARTING_HP,
            streak: 0,
            sheet: sheet.to_string(),
            game_type: GameType::default(),
            skin: Skin::default(),
            total_correct: 0,
            total_asked: 0,
        }
    }

    /// Out of hit points. The profile stays stored but cannot be resumed.
    pub fn is_exhausted(&self) -> bool {
        self.hp <= 0
    }
}

thread_local! {
    static ROSTER_DOC: RefCell<Doc> = RefCell::new(new_roster_doc());
}

fn new_roster_doc() -> Doc {
    let doc = Doc::new();
    {
        let mut txn = doc.transact_mut();
        txn.get_or_insert_map("players");
    }
    doc
}

/// Reset the roster to empty (session start / tests).
pub fn init_roster() {
    ROSTER_DOC.with(|cell| {
        *cell.borrow_mut() = new_roster_doc();
    });
}

// ── Profile accessors ──────────────────────────────────────────────

fn read_number<T: ReadTxn>(map: &MapRef, txn: &T, key: &str, default: f64) -> f64 {
    match map.get(txn, key) {
        Some(yrs::Out::Any(Any::Number(n))) => n,
        _ => default,
    }
}

fn read_string<T: ReadTxn>(map: &MapRef, txn: &T, key: &str) -> String {
    match map.get(txn, key) {
        Some(yrs::Out::Any(Any::String(s))) => s.to_string(),
        _ => String::new(),
    }
}

fn record_from_map<T: ReadTxn>(name: &str, map: &MapRef, txn: &T) -> PlayerRecord {
    PlayerRecord {
        name: name.to_string(),
        level: read_number(map, txn, "level", 1.0) as u32,
        score: read_number(map, txn, "score", 0.0) as u32,
        hp: read_number(map, txn, "hp", STARTING_HP as f64) as i32,
        streak: read_number(map, txn, "streak", 0.0) as u32,
        sheet: read_string(map, txn, "sheet"),
        game_type: GameType::from_key(&read_string(map, txn, "game_type")),
        skin: Skin::from_key(&read_string(map, txn, "skin")),
        total_correct: read_number(map, txn, "total_correct", 0.0) as u32,
        total_asked: read_number(map, txn, "total_asked", 0.0) as u32,
    }
}

/// Look up a profile by exact name.
pub fn get_player(name: &str) -> Option<PlayerRecord> {
    ROSTER_DOC.with(|cell| {
        let doc = cell.borrow();
        let players = doc.get_or_insert_map("players");
        let txn = doc.transact();
        match players.get(&txn, name) {
            Some(yrs::Out::YMap(map)) => Some(record_from_map(name, &map, &txn)),
            _ => None,
        }
    })
}

/// Look up a profile by name, ignoring ASCII case (the welcome screen treats
/// "alice" and "Alice" as the same player).
pub fn find_player_ci(name: &str) -> Option<PlayerRecord> {
    if let Some(found) = get_player(name) {
        return Some(found);
    }
    ROSTER_DOC.with(|cell| {
        let doc = cell.borrow();
        let players = doc.get_or_insert_map("players");
        let txn = doc.transact();
        let key = players
            .keys(&txn)
            .find(|k| k.eq_ignore_ascii_case(name))
            .map(|k| k.to_string())?;
        match players.get(&txn, &key) {
            Some(yrs::Out::YMap(map)) => Some(record_from_map(&key, &map, &txn)),
            _ => None,
        }
    })
}

/// Insert or fully replace a profile. Write happens after the corresponding
/// session mutation, never before.
pub fn upsert_player(record: &PlayerRecord) {
    ROSTER_DOC.with(|cell| {
        let doc = cell.borrow();
        let players = doc.get_or_insert_map("players");
        let mut txn = doc.transact_mut();
        let entry = MapPrelim::from([
            ("level".to_string(), Any::from(record.level as f64)),
            ("score".to_string(), Any::from(record.score as f64)),
            ("hp".to_string(), Any::from(record.hp as f64)),
            ("streak".to_string(), Any::from(record.streak as f64)),
            ("sheet".to_string(), Any::from(record.sheet.clone())),
            (
                "game_type".to_string(),
                Any::from(record.game_type.as_key().to_string()),
            ),
            ("skin".to_string(), Any::from(record.skin.as_key().to_string())),
            (
                "total_correct".to_string(),
                Any::from(record.total_correct as f64),
            ),
            (
                "total_asked".to_string(),
                Any::from(record.total_asked as f64),
            ),
        ]);
        players.insert(&mut txn, record.name.as_str(), entry);
    });
}

/// Every stored profile, in name order.
pub fn all_players() -> Vec<PlayerRecord> {
    ROSTER_DOC.with(|cell| {
        let doc = cell.borrow();
        let players = doc.get_or_insert_map("players");
        let txn = doc.transact();
        let mut names: Vec<String> = players.keys(&txn).map(|k| k.to_string()).collect();
        names.sort();
        names
            .iter()
            .filter_map(|name| match players.get(&txn, name) {
                Some(yrs::Out::YMap(map)) => Some(record_from_map(name, &map, &txn)),
                _ => None,
            })
            .collect()
    })
}

/// Leaderboard for one sheet: score descending, then level descending.
/// Exhausted players are included (shown greyed out by the UI).
pub fn players_for_sheet(sheet: &str) -> Vec<PlayerRecord> {
    let mut players: Vec<PlayerRecord> = all_players()
        .into_iter()
        .filter(|p| p.sheet == sheet)
        .collect();
    players.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.level.cmp(&a.level))
            .then(a.name.cmp(&b.name))
    });
    players
}

// ── Persistence ────────────────────────────────────────────────────

/// Encode the full roster as a URL-safe base64 string for localStorage.
pub fn encode_full_state() -> String {
    ROSTER_DOC.with(|cell| {
        let doc = cell.borrow();
        let state = doc.transact().encode_diff_v1(&StateVector::default());
        URL_SAFE_NO_PAD.encode(&state)
    })
}

/// Restore the roster from a previously persisted base64 state.
/// An empty string is a no-op (first visit).
pub fn restore_from_state(state_b64: &str) -> Result<(), GameError> {
    if state_b64.is_empty() {
        return Ok(());
    }
    let state_bytes = URL_SAFE_NO_PAD
        .decode(state_b64)
        .map_err(|e| GameError::Persistence(format!("base64 decode error: {e}")))?;
    let update = Update::decode_v1(&state_bytes)
        .map_err(|e| GameError::Persistence(format!("state decode error: {e}")))?;

    ROSTER_DOC.with(|cell| {
        // Apply onto a fresh doc so the root map exists before the update.
        let doc = Doc::new();
        {
            let mut txn = doc.transact_mut();
            txn.get_or_insert_map("players");
            txn.apply_update(update)
                .map_err(|e| GameError::Persistence(format!("restore error: {e}")))?;
            Ok::<(), GameError>(())
        }?;
        *cell.borrow_mut() = doc;
        Ok(())
    })
}

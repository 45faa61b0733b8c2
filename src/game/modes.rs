//! Game mode selection.
//!
//! A profile carries the mode it was created under. Like skins, the set is
//! closed: a mode resolves through `GameType::from_key` and unknown keys
//! fall back to the classic rules. The module stores and reports the
//! selection; mode-specific pacing (timers, team turns) happens in JS.

use serde::{Deserialize, Serialize};

/// One of the rule variants a player can start a profile under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameType {
    #[default]
    Classic,
    TimeAttack,
    Survival,
    Team,
    Automata,
}

impl GameType {
    /// Resolve a mode from its string key, defaulting to classic.
    pub fn from_key(key: &str) -> GameType {
        match key {
            "time-attack" => GameType::TimeAttack,
            "survival" => GameType::Survival,
            "team" => GameType::Team,
            "automata" => GameType::Automata,
            _ => GameType::Classic,
        }
    }

    /// The string key the UI uses to pick this mode.
    pub fn as_key(&self) -> &'static str {
        match self {
            GameType::Classic => "classic",
            GameType::TimeAttack => "time-attack",
            GameType::Survival => "survival",
            GameType::Team => "team",
            GameType::Automata => "automata",
        }
    }

    /// All registered modes, in display order.
    pub fn all() -> &'static [GameType] {
        &[
            GameType::Classic,
            GameType::TimeAttack,
            GameType::Survival,
            GameType::Team,
            GameType::Automata,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_key_resolves_known_modes() {
        assert_eq!(GameType::from_key("classic"), GameType::Classic);
        assert_eq!(GameType::from_key("time-attack"), GameType::TimeAttack);
        assert_eq!(GameType::from_key("survival"), GameType::Survival);
        assert_eq!(GameType::from_key("team"), GameType::Team);
        assert_eq!(GameType::from_key("automata"), GameType::Automata);
    }

    #[test]
    fn unknown_key_falls_back_to_classic() {
        assert_eq!(GameType::from_key("speedrun"), GameType::Classic);
        assert_eq!(GameType::from_key(""), GameType::Classic);
    }

    #[test]
    fn key_roundtrip() {
        for mode in GameType::all() {
            assert_eq!(GameType::from_key(mode.as_key()), *mode);
        }
    }

    #[test]
    fn serializes_as_kebab_case_key() {
        let json = serde_json::to_string(&GameType::TimeAttack).unwrap();
        assert_eq!(json, r#""time-attack""#);
    }
}

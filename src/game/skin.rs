//! Board skin selection.
//!
//! The web UI ships interchangeable board renderers. The set of skins is
//! closed — a skin is resolved through `Skin::from_key` rather than looked up
//! by arbitrary string, and unknown keys fall back to the classic board. The
//! module only stores and reports the selection; rendering happens in JS.

use serde::{Deserialize, Serialize};

/// One of the interchangeable board renderers the UI can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skin {
    #[default]
    Classic,
    Minimal,
    Animated,
    Dark,
    Mobile,
    Automata,
}

impl Skin {
    /// Resolve a skin from its string key, defaulting to classic.
    pub fn from_key(key: &str) -> Skin {
        match key {
            "minimal" => Skin::Minimal,
            "animated" => Skin::Animated,
            "dark" => Skin::Dark,
            "mobile" => Skin::Mobile,
            "automata" => Skin::Automata,
            _ => Skin::Classic,
        }
    }

    /// The string key the UI uses to pick this skin.
    pub fn as_key(&self) -> &'static str {
        match self {
            Skin::Classic => "classic",
            Skin::Minimal => "minimal",
            Skin::Animated => "animated",
            Skin::Dark => "dark",
            Skin::Mobile => "mobile",
            Skin::Automata => "automata",
        }
    }

    /// All registered skins, in display order.
    pub fn all() -> &'static [Skin] {
        &[
            Skin::Classic,
            Skin::Minimal,
            Skin::Animated,
            Skin::Dark,
            Skin::Mobile,
            Skin::Automata,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_key_resolves_known_skins() {
        assert_eq!(Skin::from_key("classic"), Skin::Classic);
        assert_eq!(Skin::from_key("minimal"), Skin::Minimal);
        assert_eq!(Skin::from_key("animated"), Skin::Animated);
        assert_eq!(Skin::from_key("dark"), Skin::Dark);
        assert_eq!(Skin::from_key("mobile"), Skin::Mobile);
        assert_eq!(Skin::from_key("automata"), Skin::Automata);
    }

    #[test]
    fn unknown_key_falls_back_to_classic() {
        assert_eq!(Skin::from_key("neon"), Skin::Classic);
        assert_eq!(Skin::from_key(""), Skin::Classic);
    }

    #[test]
    fn key_roundtrip() {
        for skin in Skin::all() {
            assert_eq!(Skin::from_key(skin.as_key()), *skin);
        }
    }

    #[test]
    fn serializes_as_lowercase_key() {
        let json = serde_json::to_string(&Skin::Dark).unwrap();
        assert_eq!(json, r#""dark""#);
    }
}

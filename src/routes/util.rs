//! Shared URL/form parsing and JSON response utilities for route handlers.

use crate::game::errors::GameError;
use serde::Serialize;

/// Parse URL-encoded form body into key-value pairs.
/// Handles `key=value&key2=value2` format (from fetch POST bodies).
pub fn parse_form_body(body: &str) -> Vec<(String, String)> {
    if body.is_empty() {
        return Vec::new();
    }
    body.split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?;
            let val = parts.next().unwrap_or("");
            Some((percent_decode(key), percent_decode(val)))
        })
        .collect()
}

/// Percent-decode a URL-encoded value.
///
/// Escapes are decoded to raw bytes first and converted to UTF-8 once at
/// the end — question texts and answers are multi-byte (Cyrillic), so
/// decoding byte-by-byte into chars would mangle them.
pub fn percent_decode(input: &str) -> String {
    let mut bytes: Vec<u8> = Vec::with_capacity(input.len());
    let mut iter = input.bytes();
    while let Some(b) = iter.next() {
        if b == b'%' {
            let hi = iter.next().unwrap_or(b'0');
            let lo = iter.next().unwrap_or(b'0');
            let hex = [hi, lo];
            if let Ok(s) = core::str::from_utf8(&hex) {
                if let Ok(val) = u8::from_str_radix(s, 16) {
                    bytes.push(val);
                    continue;
                }
            }
            bytes.push(b'%');
            bytes.push(hi);
            bytes.push(lo);
        } else if b == b'+' {
            bytes.push(b' ');
        } else {
            bytes.push(b);
        }
    }
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Parse a query string into key-value pairs.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let q = query.strip_prefix('?').unwrap_or(query);
    parse_form_body(q)
}

/// Helper to get a value by key from a list of key-value pairs.
pub fn get_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Serialize a successful response body.
pub fn json_ok<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| json_message(&format!("serialization failed: {e}")))
}

/// `{"error": ..., "kind": ...}` for a failed operation.
pub fn json_error(err: &GameError) -> String {
    let kind = match err {
        GameError::DataFetch(_) => "data_fetch",
        GameError::Precondition(_) => "precondition",
        GameError::Persistence(_) => "persistence",
    };
    serde_json::json!({ "error": err.to_string(), "kind": kind }).to_string()
}

/// `{"error": ...}` for malformed requests that never reach the game.
pub fn json_message(msg: &str) -> String {
    serde_json::json!({ "error": msg }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_form_body_works() {
        let pairs = parse_form_body("name=Ada&sheet=General+Knowledge&seed=42");
        assert_eq!(pairs.len(), 3);
        assert_eq!(get_param(&pairs, "name"), Some("Ada"));
        assert_eq!(get_param(&pairs, "sheet"), Some("General Knowledge"));
    }

    #[test]
    fn parse_form_body_empty() {
        let pairs = parse_form_body("");
        assert!(pairs.is_empty());
    }

    #[test]
    fn percent_decode_plus_as_space() {
        assert_eq!(percent_decode("hello+world"), "hello world");
    }

    #[test]
    fn percent_decode_hex() {
        assert_eq!(percent_decode("hello%20world"), "hello world");
    }

    #[test]
    fn percent_decode_multibyte_utf8() {
        // encodeURIComponent("Ближайшая звезда?") as the JS bridge sends it.
        let encoded = "%D0%91%D0%BB%D0%B8%D0%B6%D0%B0%D0%B9%D1%88%D0%B0%D1%8F%20%D0%B7%D0%B2%D0%B5%D0%B7%D0%B4%D0%B0%3F";
        assert_eq!(percent_decode(encoded), "Ближайшая звезда?");
        assert_eq!(percent_decode("%D0%A1%D0%BE%D0%BB%D0%BD%D1%86%D0%B5"), "Солнце");
    }

    #[test]
    fn percent_decode_invalid_utf8_is_lossy_not_panicking() {
        let out = percent_decode("%FF%FE");
        assert_eq!(out, "\u{FFFD}\u{FFFD}");
    }

    #[test]
    fn parse_query_strips_prefix() {
        let pairs = parse_query("?sheet=Science");
        assert_eq!(get_param(&pairs, "sheet"), Some("Science"));
    }

    #[test]
    fn json_error_carries_kind() {
        let body = json_error(&GameError::Precondition("nope".to_string()));
        assert!(body.contains("precondition"));
        assert!(body.contains("nope"));
    }
}

//! Validation boundary for downloaded pack files
//!
//! Distinguishes content that is not a document at all (corrupt, gets
//! quarantined) from a document that lacks the required fields (incomplete,
//! left on disk so a later download can fix it).

use serde_json::Value;

use super::LanguagePack;

/// Result of parsing one overlay file
#[derive(Debug)]
pub enum OverlayParse {
    /// Parsed, with a non-empty `id` and a `topics` sequence
    Valid(LanguagePack),
    /// Well-formed JSON that is not a usable pack
    Incomplete(String),
    /// Not JSON
    Corrupt(serde_json::Error),
}

/// Parse overlay file content into a pack
pub fn parse_overlay(content: &str) -> OverlayParse {
    let value: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => return OverlayParse::Corrupt(e),
    };

    let Some(fields) = value.as_object() else {
        return OverlayParse::Incomplete("document is not an object".to_string());
    };

    match fields.get("id") {
        Some(Value::String(id)) if !id.is_empty() => {}
        _ => return OverlayParse::Incomplete("missing or empty `id`".to_string()),
    }

    if !matches!(fields.get("topics"), Some(Value::Array(_))) {
        return OverlayParse::Incomplete("`topics` is missing or not a sequence".to_string());
    }

    match serde_json::from_value::<LanguagePack>(value) {
        Ok(pack) => OverlayParse::Valid(pack),
        Err(e) => OverlayParse::Incomplete(format!("invalid pack shape: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_overlay() {
        let parsed = parse_overlay(r#"{"id": "zig", "name": "Zig", "topics": []}"#);
        match parsed {
            OverlayParse::Valid(pack) => {
                assert_eq!(pack.id, "zig");
                assert!(pack.topics.is_empty());
            }
            other => panic!("expected valid pack, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_is_corrupt() {
        assert!(matches!(
            parse_overlay("{\"id\": \"zig\", \"topics\": ["),
            OverlayParse::Corrupt(_)
        ));
        assert!(matches!(parse_overlay(""), OverlayParse::Corrupt(_)));
    }

    #[test]
    fn test_missing_fields_are_incomplete() {
        let cases = [
            r#"{"name": "No id", "topics": []}"#,
            r#"{"id": "", "topics": []}"#,
            r#"{"id": 7, "topics": []}"#,
            r#"{"id": "zig"}"#,
            r#"{"id": "zig", "topics": {"a": 1}}"#,
            r#"[1, 2, 3]"#,
            r#"{"id": "zig", "topics": [42]}"#,
        ];

        for case in cases {
            assert!(
                matches!(parse_overlay(case), OverlayParse::Incomplete(_)),
                "expected incomplete for {case}"
            );
        }
    }
}

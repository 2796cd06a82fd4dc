//! Bundled baseline packs shipped inside the binary

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::LanguagePack;

const BASELINE_JSON: &str = include_str!("../../assets/baseline.json");

/// Shape of the bundled document: `{ "languages": [Pack] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineDocument {
    #[serde(default)]
    pub languages: Vec<LanguagePack>,
}

/// Parse a baseline document
pub fn parse_baseline(content: &str) -> Result<Vec<LanguagePack>, serde_json::Error> {
    serde_json::from_str::<BaselineDocument>(content).map(|doc| doc.languages)
}

/// The embedded baseline, parsed once per process
///
/// Callers clone before merging; this slice is never mutated.
pub fn baseline_packs() -> &'static [LanguagePack] {
    static BASELINE: OnceLock<Vec<LanguagePack>> = OnceLock::new();

    BASELINE.get_or_init(|| match parse_baseline(BASELINE_JSON) {
        Ok(packs) => packs,
        Err(e) => {
            tracing::error!("Embedded baseline is invalid, continuing without it: {}", e);
            Vec::new()
        }
    })
}

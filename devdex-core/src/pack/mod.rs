//! Language packs - the unit of content, install and delete
//!
//! A pack bundles one language's display metadata with its ordered topics.
//! Packs come from two places:
//!
//! ```text
//! assets/baseline.json   ← embedded at build time, read-only
//! <data_root>/docs/*     ← downloaded overlay files, one pack per file
//! ```
//!
//! Overlay files are untrusted and go through [`parse_overlay`] before they
//! are allowed into a catalog.

mod baseline;
mod model;
mod overlay;

pub use baseline::{baseline_packs, parse_baseline, BaselineDocument};
pub use model::{LanguagePack, Topic, FALLBACK_CATEGORY, FALLBACK_GROUP};
pub use overlay::{parse_overlay, OverlayParse};

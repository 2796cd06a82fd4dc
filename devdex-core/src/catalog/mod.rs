//! DevDex catalog - merged pack listing and the overlay lifecycle
//!
//! # Overview
//!
//! - [`PackRepository`] merges the embedded baseline with downloaded overlay
//!   packs, every call, without caching
//! - [`PackInstaller`] downloads packs into the overlay directory and
//!   removes them again
//! - [`RemoteIndex`] lists the packs available for download
//! - [`views`] and [`search`] derive read models from a loaded [`Catalog`]
//!
//! # Architecture
//!
//! ```text
//! Remote index (JSON)
//!     │
//!     └── entries[] { id, url, filename, ... }
//!            │  install_entry / install_pack
//!            ▼
//!     <data_root>/docs/<filename>   ← overlay files
//!            │  load_catalog
//!            ▼
//!     baseline ⊕ overlays → Catalog → views / quiz / favorites
//! ```

mod index;
mod installer;
mod repository;
pub mod search;
pub mod views;

pub use index::{IndexListing, RemoteIndex, RemoteIndexEntry, DEFAULT_INDEX_URL};
pub use installer::{FetchResponse, HttpFetcher, PackFetcher, PackInstaller};
pub use repository::{LoadReport, OverlayOutcome, OverlayStatus, PackRepository};

use serde::Serialize;

use crate::pack::LanguagePack;

/// Ordered, merged set of packs produced by one load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    packs: Vec<LanguagePack>,
}

impl Catalog {
    pub fn new(packs: Vec<LanguagePack>) -> Self {
        Self { packs }
    }

    pub fn packs(&self) -> &[LanguagePack] {
        &self.packs
    }

    pub fn into_packs(self) -> Vec<LanguagePack> {
        self.packs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LanguagePack> {
        self.packs.iter()
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    pub fn contains(&self, language_id: &str) -> bool {
        self.packs.iter().any(|p| p.id == language_id)
    }

    /// Total topics across all packs
    pub fn topic_count(&self) -> usize {
        self.packs.iter().map(|p| p.topics.len()).sum()
    }
}

impl From<Vec<LanguagePack>> for Catalog {
    fn from(packs: Vec<LanguagePack>) -> Self {
        Self::new(packs)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a LanguagePack;
    type IntoIter = std::slice::Iter<'a, LanguagePack>;

    fn into_iter(self) -> Self::IntoIter {
        self.packs.iter()
    }
}

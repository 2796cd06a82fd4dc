//! Pack repository - baseline and overlay merge
//!
//! Loading never fails from the caller's point of view. Each overlay file
//! ends up in exactly one of these states:
//!
//! - loaded, replacing any earlier pack with the same id
//! - skipped as incomplete, left on disk for a later update to fix
//! - quarantined: not parseable at all, deleted so it cannot break the
//!   next load
//!
//! An unreachable directory degrades to the baseline alone.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::Catalog;
use crate::error::StorageError;
use crate::pack::{baseline_packs, parse_overlay, LanguagePack, OverlayParse};
use crate::storage::PackDirectory;

/// What happened to one overlay file during a load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayStatus {
    /// Added a pack id not seen before
    Loaded { pack_id: String },
    /// Replaced a baseline pack or an earlier overlay with the same id
    Replaced { pack_id: String },
    /// Valid JSON missing required fields; kept on disk
    Incomplete { reason: String },
    /// Unparseable; deleted
    Quarantined { reason: String },
    /// Unparseable, and deleting it failed too
    QuarantineFailed { reason: String },
    /// Could not be read; kept on disk
    Unreadable { reason: String },
}

/// Per-file outcome of a load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayOutcome {
    pub file: String,
    pub status: OverlayStatus,
}

/// Diagnostics for one [`PackRepository::load_catalog_with_report`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub overlays: Vec<OverlayOutcome>,
    /// The overlay directory could not be listed; only the baseline was used
    pub directory_unavailable: bool,
}

impl LoadReport {
    fn files_where(&self, predicate: impl Fn(&OverlayStatus) -> bool) -> Vec<&str> {
        self.overlays
            .iter()
            .filter(|o| predicate(&o.status))
            .map(|o| o.file.as_str())
            .collect()
    }

    pub fn loaded(&self) -> Vec<&str> {
        self.files_where(|s| {
            matches!(
                s,
                OverlayStatus::Loaded { .. } | OverlayStatus::Replaced { .. }
            )
        })
    }

    pub fn quarantined(&self) -> Vec<&str> {
        self.files_where(|s| matches!(s, OverlayStatus::Quarantined { .. }))
    }

    pub fn skipped(&self) -> Vec<&str> {
        self.files_where(|s| {
            matches!(
                s,
                OverlayStatus::Incomplete { .. }
                    | OverlayStatus::Unreadable { .. }
                    | OverlayStatus::QuarantineFailed { .. }
            )
        })
    }
}

/// Stateless projector over the baseline and the overlay directory
pub struct PackRepository {
    directory: Arc<dyn PackDirectory>,
    baseline: Vec<LanguagePack>,
}

impl PackRepository {
    /// Repository over the embedded baseline
    pub fn new(directory: Arc<dyn PackDirectory>) -> Self {
        Self::with_baseline(directory, baseline_packs().to_vec())
    }

    /// Repository over a caller-supplied baseline
    pub fn with_baseline(directory: Arc<dyn PackDirectory>, baseline: Vec<LanguagePack>) -> Self {
        Self {
            directory,
            baseline,
        }
    }

    pub fn baseline(&self) -> &[LanguagePack] {
        &self.baseline
    }

    /// Load the merged catalog
    ///
    /// May delete corrupt overlay files as a side effect.
    pub async fn load_catalog(&self) -> Catalog {
        self.load_catalog_with_report().await.0
    }

    /// Load the merged catalog along with per-file diagnostics
    pub async fn load_catalog_with_report(&self) -> (Catalog, LoadReport) {
        let mut packs = self.baseline.clone();
        let mut report = LoadReport::default();

        if let Err(e) = self.directory.ensure().await {
            warn!(
                "Could not create overlay directory {}: {}",
                self.directory.describe(),
                e
            );
        }

        let files = match self.directory.list().await {
            Ok(files) => files,
            Err(e) => {
                warn!(
                    "Error reading overlay directory {}, using baseline only: {}",
                    self.directory.describe(),
                    e
                );
                report.directory_unavailable = true;
                return (Catalog::new(packs), report);
            }
        };

        for file in files {
            let status = self.merge_overlay(&file, &mut packs).await;
            report.overlays.push(OverlayOutcome { file, status });
        }

        info!(
            "Loaded catalog: {} packs ({} overlays loaded, {} skipped, {} quarantined)",
            packs.len(),
            report.loaded().len(),
            report.skipped().len(),
            report.quarantined().len()
        );

        (Catalog::new(packs), report)
    }

    async fn merge_overlay(&self, file: &str, packs: &mut Vec<LanguagePack>) -> OverlayStatus {
        let content = match self.directory.read(file).await {
            Ok(content) => content,
            Err(StorageError::NotText(_)) => {
                return self.quarantine(file, "content is not UTF-8 text".to_string()).await;
            }
            Err(e) => {
                warn!("Could not read overlay file {}: {}", file, e);
                return OverlayStatus::Unreadable {
                    reason: e.to_string(),
                };
            }
        };

        match parse_overlay(&content) {
            OverlayParse::Valid(pack) => {
                let pack_id = pack.id.clone();
                let before = packs.len();
                packs.retain(|p| p.id != pack_id);
                let replaced = packs.len() != before;
                packs.push(pack);

                if replaced {
                    debug!("Overlay {} replaces pack '{}'", file, pack_id);
                    OverlayStatus::Replaced { pack_id }
                } else {
                    debug!("Overlay {} adds pack '{}'", file, pack_id);
                    OverlayStatus::Loaded { pack_id }
                }
            }
            OverlayParse::Incomplete(reason) => {
                warn!("Skipping invalid pack file {}: {}", file, reason);
                OverlayStatus::Incomplete { reason }
            }
            OverlayParse::Corrupt(e) => self.quarantine(file, e.to_string()).await,
        }
    }

    async fn quarantine(&self, file: &str, reason: String) -> OverlayStatus {
        warn!("Corrupt pack file {} ({}), deleting", file, reason);

        match self.directory.remove(file).await {
            Ok(()) => OverlayStatus::Quarantined { reason },
            Err(e) => {
                warn!("Failed to delete corrupt pack file {}: {}", file, e);
                OverlayStatus::QuarantineFailed {
                    reason: format!("{reason}; delete failed: {e}"),
                }
            }
        }
    }
}

//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use devdex_core::catalog::{FetchResponse, PackFetcher};
use devdex_core::error::InstallError;
use devdex_core::storage::{FsPackDirectory, JsonFileStore};
use devdex_core::{FavoritesStore, FixedClock, PackInstaller, PackRepository, StreakTracker};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, Once};
use tempfile::TempDir;

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary
pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// In-process stand-in for the pack store, keyed by URL
#[derive(Default)]
pub struct StaticFetcher {
    routes: Mutex<HashMap<String, (u16, Vec<u8>)>>,
}

impl StaticFetcher {
    pub fn serve(&self, url: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), (status, body.as_bytes().to_vec()));
    }
}

#[async_trait]
impl PackFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, InstallError> {
        let routes = self.routes.lock().unwrap();
        match routes.get(url) {
            Some((status, body)) => Ok(FetchResponse {
                status: *status,
                body: if *status == 200 { body.clone() } else { Vec::new() },
            }),
            None => Err(InstallError::Transport {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }
}

/// Every component wired against one temporary data directory
pub struct TestApp {
    pub temp_dir: TempDir,
    pub fetcher: Arc<StaticFetcher>,
    pub clock: Arc<FixedClock>,
    pub repository: PackRepository,
    pub installer: PackInstaller,
    pub favorites: FavoritesStore,
    pub streak: StreakTracker,
}

impl TestApp {
    pub fn new() -> Self {
        init_test_logging();

        let temp_dir = TempDir::new().unwrap();
        let directory = Arc::new(FsPackDirectory::new(temp_dir.path().join("docs")));
        let store = Arc::new(JsonFileStore::new(temp_dir.path().join("store.json")));
        let fetcher = Arc::new(StaticFetcher::default());
        let clock = Arc::new(FixedClock::new(
            chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        ));

        Self {
            repository: PackRepository::new(directory.clone()),
            installer: PackInstaller::new(directory, fetcher.clone()),
            favorites: FavoritesStore::new(store.clone()),
            streak: StreakTracker::new(store, clock.clone()),
            temp_dir,
            fetcher,
            clock,
        }
    }

    pub fn overlay_path(&self, filename: &str) -> PathBuf {
        self.temp_dir.path().join("docs").join(filename)
    }
}

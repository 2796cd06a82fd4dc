//! DevDex core library exports

pub mod catalog;
pub mod config;
pub mod error;
pub mod favorites;
pub mod pack;
pub mod quiz;
pub mod storage;
pub mod streak;

pub use catalog::{Catalog, PackInstaller, PackRepository};
pub use config::DevdexConfig;
pub use error::{ConfigError, IndexError, InstallError, StorageError};
pub use favorites::FavoritesStore;
pub use pack::{LanguagePack, Topic};
pub use quiz::{generate_quiz, Quiz, QuizOption};
pub use streak::{Clock, FixedClock, Streak, StreakTracker, SystemClock};

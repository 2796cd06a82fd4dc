//! Daily streak tracking on the key-value store
//!
//! Two values are persisted: a completion count and the calendar day of the
//! last completion. Completing is a no-op when the last completion was
//! today, otherwise the count goes up by one. Days are not checked for
//! adjacency, so a missed day does not reset anything: the count is the
//! number of distinct days with a completed task.
//!
//! The read-modify-write in [`StreakTracker::complete_daily_task`] is not
//! atomic. Two concurrent completions on a fresh day can both increment.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::quiz::Quiz;
use crate::storage::KeyValueStore;

pub const STREAK_COUNT_KEY: &str = "@streak_count";
pub const LAST_COMPLETED_KEY: &str = "@last_completed_date";

/// Locale-independent day key
const DAY_FORMAT: &str = "%Y-%m-%d";

/// Source of "today"
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar day of the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Settable clock for tests
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        *self.today.lock().unwrap_or_else(|p| p.into_inner()) = today;
    }

    pub fn advance_days(&self, days: u64) {
        let mut today = self.today.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(next) = today.checked_add_days(chrono::Days::new(days)) {
            *today = next;
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Current streak as shown to the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub count: u64,
    pub completed_today: bool,
}

/// Outcome of a completion attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTransition {
    /// Today was already completed; nothing changed
    AlreadyCompleted(Streak),
    /// Count incremented and today recorded
    Advanced(Streak),
}

impl StreakTransition {
    pub fn streak(&self) -> Streak {
        match self {
            StreakTransition::AlreadyCompleted(s) | StreakTransition::Advanced(s) => *s,
        }
    }
}

pub struct StreakTracker {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl StreakTracker {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Tracker using the host's local day
    pub fn with_system_clock(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, Arc::new(SystemClock))
    }

    fn today_key(&self) -> String {
        self.clock.today().format(DAY_FORMAT).to_string()
    }

    async fn read_state(&self) -> Result<(u64, Option<String>), StorageError> {
        let count = self
            .store
            .get(STREAK_COUNT_KEY)
            .await?
            .and_then(|raw| match raw.trim().parse::<u64>() {
                Ok(n) => Some(n),
                Err(_) => {
                    warn!("Ignoring unreadable streak count '{}'", raw);
                    None
                }
            })
            .unwrap_or(0);
        let last = self.store.get(LAST_COMPLETED_KEY).await?;
        Ok((count, last))
    }

    /// Read the streak; store failures read as a fresh streak
    pub async fn get_streak(&self) -> Streak {
        match self.try_get_streak().await {
            Ok(streak) => streak,
            Err(e) => {
                warn!("Could not read streak, showing defaults: {}", e);
                Streak::default()
            }
        }
    }

    pub async fn try_get_streak(&self) -> Result<Streak, StorageError> {
        let (count, last) = self.read_state().await?;
        Ok(Streak {
            count,
            completed_today: last.as_deref() == Some(self.today_key().as_str()),
        })
    }

    /// Mark today as completed, at most once per calendar day
    ///
    /// Store failures are logged and leave the streak as it was read.
    pub async fn complete_daily_task(&self) -> Streak {
        match self.try_complete_daily_task().await {
            Ok(transition) => transition.streak(),
            Err(e) => {
                warn!("Could not record daily completion: {}", e);
                self.get_streak().await
            }
        }
    }

    pub async fn try_complete_daily_task(&self) -> Result<StreakTransition, StorageError> {
        let today = self.today_key();
        let (count, last) = self.read_state().await?;

        if last.as_deref() == Some(today.as_str()) {
            debug!("Daily task already completed for {}", today);
            return Ok(StreakTransition::AlreadyCompleted(Streak {
                count,
                completed_today: true,
            }));
        }

        let next = count.saturating_add(1);
        // Day first: a failed count write must not allow a second increment today
        self.store.set(LAST_COMPLETED_KEY, &today).await?;
        self.store.set(STREAK_COUNT_KEY, &next.to_string()).await?;

        debug!("Streak advanced to {} on {}", next, today);
        Ok(StreakTransition::Advanced(Streak {
            count: next,
            completed_today: true,
        }))
    }

    /// Check a quiz answer, completing today's task when it is correct
    pub async fn record_answer(&self, quiz: &Quiz, option_id: &str) -> bool {
        let correct = quiz.is_correct(option_id);
        if correct {
            self.complete_daily_task().await;
        }
        correct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tracker() -> (Arc<MemoryStore>, Arc<FixedClock>, StreakTracker) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(day(2025, 3, 14)));
        let tracker = StreakTracker::new(store.clone(), clock.clone());
        (store, clock, tracker)
    }

    #[tokio::test]
    async fn test_initial_state() {
        let (_, _, tracker) = tracker();
        assert_eq!(tracker.get_streak().await, Streak::default());
    }

    #[tokio::test]
    async fn test_same_day_is_idempotent() {
        let (_, _, tracker) = tracker();

        let first = tracker.try_complete_daily_task().await.unwrap();
        let second = tracker.try_complete_daily_task().await.unwrap();

        assert!(matches!(first, StreakTransition::Advanced(_)));
        assert!(matches!(second, StreakTransition::AlreadyCompleted(_)));
        assert_eq!(
            tracker.get_streak().await,
            Streak {
                count: 1,
                completed_today: true
            }
        );
    }

    #[tokio::test]
    async fn test_two_days_count_two() {
        let (_, clock, tracker) = tracker();

        tracker.complete_daily_task().await;
        clock.advance_days(1);
        assert!(!tracker.get_streak().await.completed_today);

        let streak = tracker.complete_daily_task().await;
        assert_eq!(streak.count, 2);
        assert!(streak.completed_today);
    }

    #[tokio::test]
    async fn test_missed_days_do_not_reset() {
        let (_, clock, tracker) = tracker();

        tracker.complete_daily_task().await;
        clock.advance_days(10);
        let streak = tracker.complete_daily_task().await;

        assert_eq!(streak.count, 2);
    }

    #[tokio::test]
    async fn test_persisted_format() {
        let (store, _, tracker) = tracker();
        tracker.complete_daily_task().await;

        assert_eq!(
            store.get(LAST_COMPLETED_KEY).await.unwrap().as_deref(),
            Some("2025-03-14")
        );
        assert_eq!(
            store.get(STREAK_COUNT_KEY).await.unwrap().as_deref(),
            Some("1")
        );
    }

    #[tokio::test]
    async fn test_unreadable_count_treated_as_zero() {
        let (store, _, tracker) = tracker();
        store.set(STREAK_COUNT_KEY, "lots").await.unwrap();

        assert_eq!(tracker.get_streak().await.count, 0);
        assert_eq!(tracker.complete_daily_task().await.count, 1);
    }

    #[tokio::test]
    async fn test_store_outage_degrades() {
        let (store, _, tracker) = tracker();
        tracker.complete_daily_task().await;
        store.set_unavailable(true);

        assert_eq!(tracker.get_streak().await, Streak::default());
        assert_eq!(tracker.complete_daily_task().await, Streak::default());
        assert!(tracker.try_complete_daily_task().await.is_err());

        store.set_unavailable(false);
        assert_eq!(tracker.get_streak().await.count, 1);
    }

    #[tokio::test]
    async fn test_record_answer_only_completes_when_correct() {
        let (_, _, tracker) = tracker();
        let quiz = Quiz {
            question: crate::quiz::QUIZ_QUESTION.to_string(),
            snippet: "Single owner".to_string(),
            language: "Rust".to_string(),
            options: Vec::new(),
            correct_option_id: "rs-ownership".to_string(),
        };

        assert!(!tracker.record_answer(&quiz, "rs-borrowing").await);
        assert_eq!(tracker.get_streak().await.count, 0);

        assert!(tracker.record_answer(&quiz, "rs-ownership").await);
        assert_eq!(tracker.get_streak().await.count, 1);
    }
}

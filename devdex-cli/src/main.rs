//! DevDex - offline programming-concept reference with a daily quiz
//!
//! Main entry point: parses flags, resolves configuration, wires the core
//! components onto the data directory and dispatches the subcommand.

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use devdex_core::catalog::search::{
    filter_favorites, filter_sections, group_favorites, group_topics, search_topics,
};
use devdex_core::catalog::views::{categorize, find_language, find_topic};
use devdex_core::catalog::{HttpFetcher, PackFetcher};
use devdex_core::storage::{FsPackDirectory, JsonFileStore};
use devdex_core::{
    generate_quiz, Catalog, Clock, DevdexConfig, FavoritesStore, PackInstaller, PackRepository,
    StreakTracker, SystemClock,
};

mod store_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "devdex",
    about = "Browse programming concepts, take the daily quiz, manage downloaded packs",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level (RUST_LOG takes precedence)
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Override the data directory holding packs and saved state
    #[clap(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this YAML file
    #[clap(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List language packs by category
    List {
        /// Filter by pack name or category
        #[clap(long, short)]
        search: Option<String>,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// List the topics of one language pack
    Topics {
        /// Language pack id (e.g. "rust")
        language: String,

        /// Filter by topic title or description
        #[clap(long, short)]
        search: Option<String>,
    },

    /// Show one topic with its example code
    Show {
        /// Topic id (e.g. "rs-ownership")
        topic: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Today's quiz question, or check an answer to it
    Quiz {
        /// Option id to submit as the answer
        #[clap(long)]
        answer: Option<String>,

        /// Seed for question selection (defaults to today's date)
        #[clap(long)]
        seed: Option<u64>,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show the daily streak
    Streak {
        /// Mark today's task as completed
        #[clap(long)]
        complete: bool,
    },

    /// Manage favorite topics
    Fav {
        #[clap(subcommand)]
        command: FavCommand,
    },

    /// Browse and manage downloadable packs
    Store(store_cli::StoreCommand),
}

#[derive(Subcommand, Debug)]
enum FavCommand {
    /// Add or remove a topic from favorites
    Toggle { topic: String },

    /// Favorites grouped by language
    List {
        #[clap(long, short)]
        search: Option<String>,
    },

    /// Exit status tells whether the topic is a favorite
    Check { topic: String },
}

/// Components wired onto one data directory
pub(crate) struct AppContext {
    pub config: DevdexConfig,
    pub repository: PackRepository,
    pub installer: PackInstaller,
    pub fetcher: Arc<dyn PackFetcher>,
    pub favorites: FavoritesStore,
    pub streak: StreakTracker,
    pub clock: Arc<dyn Clock>,
}

impl AppContext {
    fn new(config: DevdexConfig) -> Result<Self> {
        let directory = Arc::new(FsPackDirectory::new(config.overlay_dir()));
        let store = Arc::new(JsonFileStore::new(config.store_path()));
        let fetcher: Arc<dyn PackFetcher> = Arc::new(
            HttpFetcher::new(config.http_timeout()).context("Failed to build HTTP client")?,
        );
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        Ok(Self {
            repository: PackRepository::new(directory.clone()),
            installer: PackInstaller::new(directory, fetcher.clone()),
            favorites: FavoritesStore::new(store.clone()),
            streak: StreakTracker::new(store, clock.clone()),
            fetcher,
            clock,
            config,
        })
    }

    pub async fn catalog(&self) -> Catalog {
        self.repository.load_catalog().await
    }
}

fn resolve_config(cli: &Cli) -> Result<DevdexConfig> {
    let mut config =
        DevdexConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    debug!("Using data directory {}", config.data_dir.display());
    Ok(config)
}

/// Logs go to stderr so stdout stays clean for `--json`
fn initialize_tracing(log_level: &LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level);

    let config = resolve_config(&cli)?;
    let app = AppContext::new(config)?;

    match cli.command {
        Command::List { search, json } => list_command(&app, search.as_deref(), json).await,
        Command::Topics { language, search } => {
            topics_command(&app, &language, search.as_deref()).await
        }
        Command::Show { topic, json } => show_command(&app, &topic, json).await,
        Command::Quiz { answer, seed, json } => {
            quiz_command(&app, answer.as_deref(), seed, json).await
        }
        Command::Streak { complete } => streak_command(&app, complete).await,
        Command::Fav { command } => fav_command(&app, command).await,
        Command::Store(command) => command.execute(&app).await,
    }
}

#[derive(Tabled)]
struct PackRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Topics")]
    topics: usize,
}

pub(crate) fn render_table<T: Tabled>(rows: &[T]) -> String {
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string()
}

async fn list_command(app: &AppContext, search: Option<&str>, json: bool) -> Result<()> {
    let catalog = app.catalog().await;
    let sections = filter_sections(&categorize(&catalog), search.unwrap_or(""));

    if json {
        println!("{}", serde_json::to_string_pretty(&sections)?);
        return Ok(());
    }

    if sections.is_empty() {
        println!("No language packs found.");
        return Ok(());
    }

    let rows: Vec<PackRow> = sections
        .iter()
        .flat_map(|section| {
            section.packs.iter().map(|pack| PackRow {
                category: section.title.clone(),
                id: pack.id.clone(),
                name: format!("{} {}", pack.icon, pack.name).trim().to_string(),
                topics: pack.topics.len(),
            })
        })
        .collect();

    println!("{}", render_table(&rows));
    Ok(())
}

async fn topics_command(app: &AppContext, language: &str, search: Option<&str>) -> Result<()> {
    let catalog = app.catalog().await;
    let pack = find_language(&catalog, language)
        .with_context(|| format!("Language pack '{language}' not found"))?;

    let hits = search_topics(&pack.topics, search.unwrap_or(""));
    if hits.is_empty() {
        println!("No topics found.");
        return Ok(());
    }

    println!("{} {}\n", pack.icon, pack.name);
    for group in group_topics(hits) {
        println!("{}", group.title);
        for topic in group.topics {
            println!("  {:<28} {}", topic.id, topic.title);
        }
        println!();
    }
    Ok(())
}

async fn show_command(app: &AppContext, topic_id: &str, json: bool) -> Result<()> {
    let catalog = app.catalog().await;
    let view = find_topic(&catalog, topic_id)
        .with_context(|| format!("Topic '{topic_id}' not found"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let starred = if app.favorites.is_favorite(topic_id).await {
        " ★"
    } else {
        ""
    };
    println!("{}{}", view.topic.title, starred);
    println!("{} {} / {}", view.language_icon, view.language_name, view.topic.group());
    println!();
    if !view.topic.description.is_empty() {
        println!("{}\n", view.topic.description);
    }
    if !view.topic.code.is_empty() {
        for line in view.topic.code.lines() {
            println!("    {line}");
        }
    }
    Ok(())
}

async fn quiz_command(
    app: &AppContext,
    answer: Option<&str>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    // Same seed all day, so an answer refers to the question shown earlier
    let seed =
        seed.unwrap_or_else(|| u64::from(app.clock.today().num_days_from_ce().unsigned_abs()));
    let catalog = app.catalog().await;
    let quiz = generate_quiz(&catalog, &mut StdRng::seed_from_u64(seed))
        .context("Not enough topics installed to build a quiz")?;

    match answer {
        None => {
            if json {
                println!("{}", serde_json::to_string_pretty(&quiz)?);
                return Ok(());
            }
            println!("{}\n", quiz.question);
            println!("  \"{}\"  ({})\n", quiz.snippet, quiz.language);
            for option in &quiz.options {
                println!("  {:<28} {}", option.id, option.title);
            }
            println!("\nAnswer with: devdex quiz --answer <id>");
        }
        Some(option_id) => {
            if app.streak.record_answer(&quiz, option_id).await {
                let streak = app.streak.get_streak().await;
                println!("Correct! Streak: {} day(s)", streak.count);
            } else {
                let title = quiz
                    .correct_option()
                    .map(|o| o.title.as_str())
                    .unwrap_or(quiz.correct_option_id.as_str());
                println!("Not quite. The answer was: {title}");
            }
        }
    }
    Ok(())
}

async fn streak_command(app: &AppContext, complete: bool) -> Result<()> {
    let streak = if complete {
        app.streak.complete_daily_task().await
    } else {
        app.streak.get_streak().await
    };

    let today = if streak.completed_today {
        "completed"
    } else {
        "not completed"
    };
    println!("Streak: {} day(s), today {}", streak.count, today);
    Ok(())
}

/// Store failures are reported, never shown as a removal
async fn toggle_favorite(favorites: &FavoritesStore, topic: &str) -> Result<String> {
    let ids = favorites
        .try_toggle(topic)
        .await
        .context("Failed to update favorites")?;

    if ids.iter().any(|id| id == topic) {
        Ok(format!("Added '{topic}' to favorites"))
    } else {
        Ok(format!("Removed '{topic}' from favorites"))
    }
}

async fn fav_command(app: &AppContext, command: FavCommand) -> Result<()> {
    match command {
        FavCommand::Toggle { topic } => {
            println!("{}", toggle_favorite(&app.favorites, &topic).await?);
        }
        FavCommand::List { search } => {
            let catalog = app.catalog().await;
            let views = app.favorites.list_favorites(&catalog).await;
            let hits = filter_favorites(&views, search.as_deref().unwrap_or(""));

            if hits.is_empty() {
                println!("No favorites yet.");
                return Ok(());
            }
            for section in group_favorites(hits) {
                println!("{} {}", section.icon, section.title);
                for view in section.topics {
                    println!("  {:<28} {}", view.topic.id, view.topic.title);
                }
                println!();
            }
        }
        FavCommand::Check { topic } => {
            if app.favorites.is_favorite(&topic).await {
                println!("'{topic}' is a favorite");
            } else {
                println!("'{topic}' is not a favorite");
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

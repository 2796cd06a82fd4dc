//! DevDex store CLI commands
//!
//! Browse the remote pack index, download packs into the overlay
//! directory and remove them again.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tabled::Tabled;

use devdex_core::catalog::{OverlayStatus, RemoteIndex, RemoteIndexEntry};

use crate::{render_table, AppContext};

/// Store subcommand for browsing and managing downloadable packs
#[derive(Parser, Debug)]
pub struct StoreCommand {
    #[clap(subcommand)]
    pub command: StoreSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum StoreSubcommand {
    /// Search the store (matches name and category)
    Search {
        query: Option<String>,

        /// Output results as JSON
        #[clap(long)]
        json: bool,
    },

    /// Download a pack by id
    Install { id: String },

    /// Remove a downloaded pack by id or file name
    Remove { name: String },

    /// List downloaded pack files and how they loaded
    List,
}

impl StoreCommand {
    pub async fn execute(self, app: &AppContext) -> Result<()> {
        match self.command {
            StoreSubcommand::Search { query, json } => {
                execute_search(app, query.as_deref(), json).await
            }
            StoreSubcommand::Install { id } => execute_install(app, &id).await,
            StoreSubcommand::Remove { name } => execute_remove(app, &name).await,
            StoreSubcommand::List => execute_list(app).await,
        }
    }
}

/// Progress goes to stderr so `--json` output stays parseable
async fn fetch_index(app: &AppContext) -> Result<RemoteIndex> {
    eprintln!("Fetching store index...");
    RemoteIndex::fetch(app.fetcher.as_ref(), &app.config.index_url)
        .await
        .with_context(|| format!("Failed to fetch store index from {}", app.config.index_url))
}

/// Table row for search results
#[derive(Tabled)]
struct SearchResultRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Installed")]
    installed: String,
}

async fn execute_search(app: &AppContext, query: Option<&str>, json_output: bool) -> Result<()> {
    let index = fetch_index(app).await?;
    let catalog = app.catalog().await;

    let mut results: Vec<(&RemoteIndexEntry, bool)> = index
        .search(query.unwrap_or(""))
        .into_iter()
        .map(|entry| (entry, catalog.contains(&entry.id)))
        .collect();
    results.sort_by(|a, b| a.0.name.cmp(&b.0.name));

    if json_output {
        println!("{}", serde_json::to_string_pretty(&search_results_json(&results))?);
        return Ok(());
    }

    if results.is_empty() {
        println!("\nNo packs found.");
        return Ok(());
    }

    println!("\nFound {} pack(s):\n", results.len());

    let rows: Vec<SearchResultRow> = results
        .iter()
        .map(|(entry, installed)| SearchResultRow {
            id: entry.id.clone(),
            name: format!("{} {}", entry.icon, entry.name).trim().to_string(),
            category: entry.category.clone(),
            installed: if *installed { "yes" } else { "" }.to_string(),
        })
        .collect();

    println!("{}", render_table(&rows));
    Ok(())
}

fn search_results_json(results: &[(&RemoteIndexEntry, bool)]) -> serde_json::Value {
    results
        .iter()
        .map(|(entry, installed)| {
            serde_json::json!({
                "id": entry.id,
                "name": entry.name,
                "category": entry.category,
                "filename": entry.filename,
                "installed": installed,
            })
        })
        .collect()
}

async fn execute_install(app: &AppContext, id: &str) -> Result<()> {
    let index = fetch_index(app).await?;
    let entry = index
        .get(id)
        .with_context(|| format!("Pack '{id}' not found in the store"))?;

    println!("\nInstalling {} ({})...", entry.name, entry.filename);

    if !app.installer.install_entry(entry).await {
        anyhow::bail!("Failed to install '{}'", entry.id);
    }

    // Report what the next load makes of the file
    let (_, report) = app.repository.load_catalog_with_report().await;
    match report.overlays.iter().find(|o| o.file == entry.filename) {
        Some(outcome) => match &outcome.status {
            OverlayStatus::Loaded { pack_id } => println!("Installed '{pack_id}'"),
            OverlayStatus::Replaced { pack_id } => {
                println!("Installed '{pack_id}', replacing the bundled version")
            }
            OverlayStatus::Incomplete { reason } => {
                println!("Downloaded, but the pack is incomplete and was skipped: {reason}")
            }
            OverlayStatus::Quarantined { reason } => {
                anyhow::bail!("Downloaded pack was unreadable and has been removed: {reason}")
            }
            OverlayStatus::QuarantineFailed { reason } | OverlayStatus::Unreadable { reason } => {
                anyhow::bail!("Downloaded pack could not be loaded: {reason}")
            }
        },
        None => println!("Installed {}", entry.filename),
    }

    Ok(())
}

async fn execute_remove(app: &AppContext, name: &str) -> Result<()> {
    let installed = app.installer.list_installed_files().await;

    let filename = if installed.iter().any(|f| f == name) {
        name.to_string()
    } else {
        let index = fetch_index(app).await?;
        index
            .get(name)
            .map(|entry| entry.filename.clone())
            .with_context(|| format!("'{name}' is neither an installed file nor a store pack"))?
    };

    if !app.installer.remove_pack(&filename).await {
        anyhow::bail!("'{}' is not installed", filename);
    }

    println!("Removed {filename}");
    Ok(())
}

/// Table row for installed files
#[derive(Tabled)]
struct InstalledRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Status")]
    status: String,
}

async fn execute_list(app: &AppContext) -> Result<()> {
    let (_, report) = app.repository.load_catalog_with_report().await;

    if report.directory_unavailable {
        println!("Pack directory {} is not readable.", app.config.overlay_dir().display());
        return Ok(());
    }

    if report.overlays.is_empty() {
        println!("No downloaded packs.");
        println!("\nUse 'devdex store search' to browse available packs.");
        return Ok(());
    }

    let rows: Vec<InstalledRow> = report
        .overlays
        .iter()
        .map(|outcome| InstalledRow {
            file: outcome.file.clone(),
            status: match &outcome.status {
                OverlayStatus::Loaded { pack_id } => pack_id.clone(),
                OverlayStatus::Replaced { pack_id } => format!("{pack_id} (replaces bundled)"),
                OverlayStatus::Incomplete { reason } => format!("skipped: {reason}"),
                OverlayStatus::Quarantined { .. } => "removed: unreadable".to_string(),
                OverlayStatus::QuarantineFailed { reason }
                | OverlayStatus::Unreadable { reason } => format!("error: {reason}"),
            },
        })
        .collect();

    println!("{}", render_table(&rows));
    Ok(())
}

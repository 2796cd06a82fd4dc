//! Remote pack index
//!
//! The store serves a JSON array listing every downloadable pack with the
//! URL to fetch it from and the file name to save it under.

use serde::{Deserialize, Serialize};

use super::{Catalog, PackFetcher};
use crate::error::IndexError;

/// Default store index location
pub const DEFAULT_INDEX_URL: &str = "https://gist.githubusercontent.com/Lokesh-Sai-Srinivas/35667dd39d77ef76cdd7b0bdda28b239/raw/40300a88e65bb707c38d98be01580e6921ede915/catalog.json";

/// One downloadable pack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIndexEntry {
    /// Pack id the downloaded file will declare
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub icon: String,

    #[serde(default)]
    pub color: String,

    #[serde(default)]
    pub category: String,

    /// Where to download the pack document
    pub url: String,

    /// File name inside the overlay directory
    pub filename: String,

    /// Optional `sha256:<hex>` of the pack document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Index entry annotated with local install state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexListing<'a> {
    pub entry: &'a RemoteIndexEntry,
    pub installed: bool,
}

/// The store's list of packs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteIndex {
    pub entries: Vec<RemoteIndexEntry>,
}

impl RemoteIndex {
    /// Parse the JSON array served by the store
    pub fn from_json(content: &str) -> Result<Self, IndexError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Fetch and parse the index from `url`
    pub async fn fetch(fetcher: &dyn PackFetcher, url: &str) -> Result<Self, IndexError> {
        let response = fetcher.fetch(url).await?;

        if response.status != 200 {
            return Err(IndexError::Http {
                status: response.status,
                url: url.to_string(),
            });
        }

        let index: RemoteIndex = serde_json::from_slice(&response.body)?;
        tracing::debug!("Fetched pack index from {}: {} entries", url, index.entries.len());
        Ok(index)
    }

    pub fn get(&self, id: &str) -> Option<&RemoteIndexEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Case-insensitive match on name or category; empty query matches all
    pub fn search(&self, query: &str) -> Vec<&RemoteIndexEntry> {
        let query = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                query.is_empty()
                    || e.name.to_lowercase().contains(&query)
                    || e.category.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Pair every entry with whether its pack id is present in `catalog`
    pub fn with_installed<'a>(&'a self, catalog: &Catalog) -> Vec<IndexListing<'a>> {
        self.entries
            .iter()
            .map(|entry| IndexListing {
                entry,
                installed: catalog.contains(&entry.id),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FetchResponse;
    use crate::error::InstallError;
    use crate::pack::LanguagePack;
    use async_trait::async_trait;

    const INDEX: &str = r##"[
        {"id": "zig", "name": "Zig", "icon": "⚡", "color": "#F7A41D", "category": "Systems",
         "url": "https://packs.test/zig.json", "filename": "zig.json"},
        {"id": "kotlin", "name": "Kotlin", "category": "Mobile",
         "url": "https://packs.test/kotlin.json", "filename": "kotlin.json",
         "digest": "sha256:abc123"}
    ]"##;

    struct StaticFetcher(u16, &'static str);

    #[async_trait]
    impl PackFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<FetchResponse, InstallError> {
            Ok(FetchResponse {
                status: self.0,
                body: self.1.as_bytes().to_vec(),
            })
        }
    }

    #[test]
    fn test_parse_index() {
        let index = RemoteIndex::from_json(INDEX).unwrap();
        assert_eq!(index.entries.len(), 2);
        assert_eq!(index.get("kotlin").unwrap().digest.as_deref(), Some("sha256:abc123"));
        assert_eq!(index.get("kotlin").unwrap().icon, "");
        assert_eq!(index.get("zig").unwrap().color, "#F7A41D");
        assert!(index.get("swift").is_none());
    }

    #[test]
    fn test_search_by_name_or_category() {
        let index = RemoteIndex::from_json(INDEX).unwrap();

        let ids = |q: &str| -> Vec<String> {
            index.search(q).into_iter().map(|e| e.id.clone()).collect()
        };

        assert_eq!(ids("ZIG"), vec!["zig"]);
        assert_eq!(ids("mobile"), vec!["kotlin"]);
        assert_eq!(ids(""), vec!["zig", "kotlin"]);
        assert!(ids("cobol").is_empty());
    }

    #[test]
    fn test_with_installed() {
        let index = RemoteIndex::from_json(INDEX).unwrap();
        let zig: LanguagePack =
            serde_json::from_str(r#"{"id": "zig", "topics": []}"#).unwrap();
        let catalog = Catalog::new(vec![zig]);

        let listing = index.with_installed(&catalog);
        assert!(listing[0].installed);
        assert!(!listing[1].installed);
    }

    #[tokio::test]
    async fn test_fetch_requires_success() {
        let index = RemoteIndex::fetch(&StaticFetcher(200, INDEX), "https://index.test")
            .await
            .unwrap();
        assert_eq!(index.entries.len(), 2);

        let err = RemoteIndex::fetch(&StaticFetcher(503, ""), "https://index.test")
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::Http { status: 503, .. }));

        let err = RemoteIndex::fetch(&StaticFetcher(200, "<html>"), "https://index.test")
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::Parse(_)));
    }
}

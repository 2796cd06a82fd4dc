//! Pack and topic types

use serde::{Deserialize, Deserializer, Serialize};

/// Category bucket for packs that do not declare one
pub const FALLBACK_CATEGORY: &str = "Downloaded";

/// Group bucket for topics that do not declare one
pub const FALLBACK_GROUP: &str = "General";

/// One programming language's content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePack {
    /// Stable unique key across the merged catalog
    pub id: String,

    /// Display name
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,

    /// Glyph, emoji or URI
    #[serde(default, deserialize_with = "nullable")]
    pub icon: String,

    /// Display color as hex
    #[serde(default, deserialize_with = "nullable")]
    pub color: String,

    /// Listing category; see [`LanguagePack::category`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Reference entries in authoring order
    pub topics: Vec<Topic>,
}

/// One reference entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Unique within its pack. Also used as the favorites and quiz key,
    /// so ids shared between packs resolve to the first pack in catalog order.
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,

    #[serde(default, deserialize_with = "nullable")]
    pub title: String,

    #[serde(default, deserialize_with = "nullable")]
    pub description: String,

    /// Snippet text
    #[serde(default, deserialize_with = "nullable")]
    pub code: String,

    /// Section within the pack; see [`Topic::group`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl LanguagePack {
    /// Category with the fallback bucket applied (absent or empty)
    pub fn category(&self) -> &str {
        match self.category.as_deref() {
            Some(category) if !category.is_empty() => category,
            _ => FALLBACK_CATEGORY,
        }
    }

    /// Look up a topic of this pack by id
    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == topic_id)
    }
}

impl Topic {
    /// Group with the fallback bucket applied (absent or empty)
    pub fn group(&self) -> &str {
        match self.group.as_deref() {
            Some(group) if !group.is_empty() => group,
            _ => FALLBACK_GROUP,
        }
    }
}

/// Treat an explicit `null` the same as a missing field
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

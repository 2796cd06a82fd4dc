//! Read views over a loaded catalog
//!
//! All functions here are pure. When a topic id appears in more than one
//! pack, the first pack in catalog order wins.

use serde::Serialize;

use super::Catalog;
use crate::pack::{LanguagePack, Topic};

/// Packs sharing a category, in catalog order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySection<'a> {
    pub title: String,
    pub packs: Vec<&'a LanguagePack>,
}

/// A topic enriched with its owning pack's display metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicView {
    #[serde(flatten)]
    pub topic: Topic,
    pub language_id: String,
    pub language_name: String,
    pub language_color: String,
    pub language_icon: String,
}

impl TopicView {
    pub fn new(pack: &LanguagePack, topic: &Topic) -> Self {
        Self {
            topic: topic.clone(),
            language_id: pack.id.clone(),
            language_name: pack.name.clone(),
            language_color: pack.color.clone(),
            language_icon: pack.icon.clone(),
        }
    }
}

/// Group packs by category, sections in first-seen order
pub fn categorize(catalog: &Catalog) -> Vec<CategorySection<'_>> {
    let mut sections: Vec<CategorySection<'_>> = Vec::new();

    for pack in catalog {
        let category = pack.category();
        match sections.iter_mut().find(|s| s.title == category) {
            Some(section) => section.packs.push(pack),
            None => sections.push(CategorySection {
                title: category.to_string(),
                packs: vec![pack],
            }),
        }
    }

    sections
}

/// First topic with `topic_id` in catalog order
pub fn find_topic(catalog: &Catalog, topic_id: &str) -> Option<TopicView> {
    catalog.iter().find_map(|pack| {
        pack.topic(topic_id)
            .map(|topic| TopicView::new(pack, topic))
    })
}

pub fn find_language<'a>(catalog: &'a Catalog, language_id: &str) -> Option<&'a LanguagePack> {
    catalog.iter().find(|p| p.id == language_id)
}

/// Topics of one pack; empty when the pack is absent
pub fn topics_of<'a>(catalog: &'a Catalog, language_id: &str) -> &'a [Topic] {
    find_language(catalog, language_id)
        .map(|p| p.topics.as_slice())
        .unwrap_or(&[])
}

/// Resolve favorite ids to topics, dropping ids nothing in the catalog owns
pub fn enrich_favorites<S: AsRef<str>>(catalog: &Catalog, favorite_ids: &[S]) -> Vec<TopicView> {
    favorite_ids
        .iter()
        .filter_map(|id| find_topic(catalog, id.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog() -> Catalog {
        let packs: Vec<LanguagePack> = serde_json::from_str(
            r##"[
                {"id": "js", "name": "JavaScript", "color": "#F7DF1E", "icon": "🟨", "category": "Web",
                 "topics": [{"id": "closures", "title": "Closures"}, {"id": "shared", "title": "JS shared"}]},
                {"id": "rust", "name": "Rust", "color": "#DEA584", "icon": "🦀", "category": "Systems",
                 "topics": [{"id": "ownership", "title": "Ownership"}]},
                {"id": "ts", "name": "TypeScript", "category": "Web",
                 "topics": [{"id": "shared", "title": "TS shared"}]},
                {"id": "local", "name": "Local", "topics": []}
            ]"##,
        )
        .unwrap();
        Catalog::new(packs)
    }

    #[test]
    fn test_categorize_first_seen_order() {
        let catalog = catalog();
        let sections = categorize(&catalog);

        let summary: Vec<(&str, Vec<&str>)> = sections
            .iter()
            .map(|s| {
                (
                    s.title.as_str(),
                    s.packs.iter().map(|p| p.id.as_str()).collect(),
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("Web", vec!["js", "ts"]),
                ("Systems", vec!["rust"]),
                ("Downloaded", vec!["local"]),
            ]
        );
    }

    #[test]
    fn test_find_topic_enriches() {
        let catalog = catalog();
        let view = find_topic(&catalog, "ownership").unwrap();

        assert_eq!(view.topic.title, "Ownership");
        assert_eq!(view.language_name, "Rust");
        assert_eq!(view.language_color, "#DEA584");
        assert_eq!(view.language_icon, "🦀");
        assert!(find_topic(&catalog, "missing").is_none());
    }

    #[test]
    fn test_find_topic_first_match_wins() {
        let catalog = catalog();
        let view = find_topic(&catalog, "shared").unwrap();
        assert_eq!(view.language_id, "js");
        assert_eq!(view.topic.title, "JS shared");
    }

    #[test]
    fn test_topics_of() {
        let catalog = catalog();
        assert_eq!(topics_of(&catalog, "js").len(), 2);
        assert!(topics_of(&catalog, "cobol").is_empty());
    }

    #[test]
    fn test_enrich_favorites_drops_unknown() {
        let catalog = catalog();
        let favorites = ["ownership", "gone", "closures"];

        let views = enrich_favorites(&catalog, &favorites);
        let ids: Vec<_> = views.iter().map(|v| v.topic.id.as_str()).collect();
        assert_eq!(ids, vec!["ownership", "closures"]);
    }

    #[test]
    fn test_topic_view_serializes_flat() {
        let catalog = catalog();
        let view = find_topic(&catalog, "closures").unwrap();
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["id"], "closures");
        assert_eq!(json["language_name"], "JavaScript");
    }
}

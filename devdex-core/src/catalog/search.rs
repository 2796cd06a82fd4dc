//! Text filters and grouping used by the listing screens
//!
//! Matching is a case-insensitive substring test. An empty (or all
//! whitespace) query matches everything.

use serde::Serialize;

use super::views::{CategorySection, TopicView};
use crate::pack::Topic;

/// Icon shown for a favorites section whose pack has none
const FALLBACK_ICON: &str = "📄";

/// Topics of one pack sharing a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicGroup<'a> {
    pub title: String,
    pub topics: Vec<&'a Topic>,
}

/// Favorites belonging to one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteSection<'a> {
    pub title: String,
    pub icon: String,
    pub topics: Vec<&'a TopicView>,
}

fn normalize(query: &str) -> Option<String> {
    let query = query.trim();
    (!query.is_empty()).then(|| query.to_lowercase())
}

fn matches(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Keep packs whose name or section title matches; drop emptied sections
pub fn filter_sections<'a>(
    sections: &[CategorySection<'a>],
    query: &str,
) -> Vec<CategorySection<'a>> {
    let Some(needle) = normalize(query) else {
        return sections.to_vec();
    };

    sections
        .iter()
        .filter_map(|section| {
            let title_matches = matches(&section.title, &needle);
            let packs: Vec<_> = section
                .packs
                .iter()
                .copied()
                .filter(|p| title_matches || matches(&p.name, &needle))
                .collect();

            (!packs.is_empty()).then(|| CategorySection {
                title: section.title.clone(),
                packs,
            })
        })
        .collect()
}

/// Topics whose title or description matches
pub fn search_topics<'a>(topics: &'a [Topic], query: &str) -> Vec<&'a Topic> {
    let needle = normalize(query);
    topics
        .iter()
        .filter(|t| match &needle {
            None => true,
            Some(n) => matches(&t.title, n) || matches(&t.description, n),
        })
        .collect()
}

/// Sections by topic group, first-seen order
pub fn group_topics<'a, I>(topics: I) -> Vec<TopicGroup<'a>>
where
    I: IntoIterator<Item = &'a Topic>,
{
    let mut groups: Vec<TopicGroup<'a>> = Vec::new();

    for topic in topics {
        let group = topic.group();
        match groups.iter_mut().find(|g| g.title == group) {
            Some(existing) => existing.topics.push(topic),
            None => groups.push(TopicGroup {
                title: group.to_string(),
                topics: vec![topic],
            }),
        }
    }

    groups
}

/// Favorites whose title, description, group or language name matches
pub fn filter_favorites<'a>(views: &'a [TopicView], query: &str) -> Vec<&'a TopicView> {
    let needle = normalize(query);
    views
        .iter()
        .filter(|v| match &needle {
            None => true,
            Some(n) => {
                matches(&v.topic.title, n)
                    || matches(&v.topic.description, n)
                    || matches(v.topic.group(), n)
                    || matches(&v.language_name, n)
            }
        })
        .collect()
}

/// Favorites grouped by language name, first-seen order
pub fn group_favorites<'a, I>(views: I) -> Vec<FavoriteSection<'a>>
where
    I: IntoIterator<Item = &'a TopicView>,
{
    let mut sections: Vec<FavoriteSection<'a>> = Vec::new();

    for view in views {
        match sections
            .iter_mut()
            .find(|s| s.title == view.language_name)
        {
            Some(section) => section.topics.push(view),
            None => {
                let icon = if view.language_icon.is_empty() {
                    FALLBACK_ICON.to_string()
                } else {
                    view.language_icon.clone()
                };
                sections.push(FavoriteSection {
                    title: view.language_name.clone(),
                    icon,
                    topics: vec![view],
                });
            }
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::views::{categorize, enrich_favorites};
    use crate::catalog::Catalog;
    use crate::pack::LanguagePack;
    use pretty_assertions::assert_eq;

    fn catalog() -> Catalog {
        let packs: Vec<LanguagePack> = serde_json::from_str(
            r#"[
                {"id": "js", "name": "JavaScript", "icon": "🟨", "category": "Web",
                 "topics": [
                    {"id": "closures", "title": "Closures", "description": "Functions capturing scope", "group": "Functions"},
                    {"id": "promises", "title": "Promises", "description": "Eventual values", "group": "Async"},
                    {"id": "arrows", "title": "Arrow functions", "description": "Compact syntax", "group": "Functions"}
                 ]},
                {"id": "rust", "name": "Rust", "category": "Systems",
                 "topics": [{"id": "ownership", "title": "Ownership", "description": "Single owner"}]}
            ]"#,
        )
        .unwrap();
        Catalog::new(packs)
    }

    #[test]
    fn test_filter_sections_by_name_and_title() {
        let catalog = catalog();
        let sections = categorize(&catalog);

        let by_name = filter_sections(&sections, "rus");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].title, "Systems");

        let by_title = filter_sections(&sections, "WEB");
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].packs[0].id, "js");

        assert!(filter_sections(&sections, "haskell").is_empty());
        assert_eq!(filter_sections(&sections, "  ").len(), 2);
    }

    #[test]
    fn test_search_topics() {
        let catalog = catalog();
        let topics = &catalog.packs()[0].topics;

        let hits: Vec<_> = search_topics(topics, "function")
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(hits, vec!["closures", "arrows"]);

        assert_eq!(search_topics(topics, "").len(), 3);
    }

    #[test]
    fn test_group_topics_uses_fallback() {
        let catalog = catalog();
        let groups = group_topics(catalog.iter().flat_map(|p| p.topics.iter()));

        let titles: Vec<_> = groups.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Functions", "Async", "General"]);
        assert_eq!(groups[0].topics.len(), 2);
    }

    #[test]
    fn test_group_and_filter_favorites() {
        let catalog = catalog();
        let views = enrich_favorites(&catalog, &["ownership", "promises", "closures"]);

        let sections = group_favorites(&views);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Rust");
        assert_eq!(sections[0].icon, "📄");
        assert_eq!(sections[1].title, "JavaScript");
        assert_eq!(sections[1].icon, "🟨");
        assert_eq!(sections[1].topics.len(), 2);

        let hits: Vec<_> = filter_favorites(&views, "general")
            .iter()
            .map(|v| v.topic.id.as_str())
            .collect();
        assert_eq!(hits, vec!["ownership"]);

        assert_eq!(filter_favorites(&views, "javascript").len(), 2);
    }
}

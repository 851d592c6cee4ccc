// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{CategoryFilter, Topic};

/// Topics admitted by `category` whose title or category label contains
/// `query`, ignoring case. Catalog order is preserved.
pub fn filter_topics<'a>(
    topics: &'a [Topic],
    query: &str,
    category: CategoryFilter,
) -> Vec<&'a Topic> {
    let needle = query.to_lowercase();
    topics
        .iter()
        .filter(|topic| category.admits(topic.category) && matches_query(topic, &needle))
        .collect()
}

fn matches_query(topic: &Topic, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    topic.title.to_lowercase().contains(needle)
        || topic.category.label().to_lowercase().contains(needle)
}

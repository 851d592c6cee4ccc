// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::Topic;

pub fn snippet_text(topic: &Topic) -> &str {
    &topic.code_snippet
}

/// Every snippet prefixed with a `// title` comment, separated by a blank
/// line. Empty input yields an empty string.
pub fn visible_snippets_text(topics: &[&Topic]) -> String {
    topics
        .iter()
        .map(|topic| format!("// {}\n{}", topic.title, topic.code_snippet))
        .collect::<Vec<_>>()
        .join("\n\n")
}

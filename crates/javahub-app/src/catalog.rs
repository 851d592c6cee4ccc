// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Deserialize;
use std::collections::HashMap;

use crate::error::CatalogError;
use crate::ids::TopicId;
use crate::model::{Category, Topic, VersionUpdate};

const BUILTIN_CATALOG: &str = include_str!("../data/topics.toml");

/// The immutable, ordered topic list. Construction validates every record, so
/// a `Catalog` value always holds at least one topic with unique ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    topics: Vec<Topic>,
    index: HashMap<TopicId, usize>,
}

impl Catalog {
    pub fn new(topics: Vec<Topic>) -> Result<Self, CatalogError> {
        if topics.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut index = HashMap::with_capacity(topics.len());
        for (position, topic) in topics.iter().enumerate() {
            if topic.id.as_str().trim().is_empty() {
                return Err(CatalogError::EmptyId { index: position });
            }
            if topic.title.trim().is_empty() {
                return Err(CatalogError::EmptyField {
                    id: topic.id.clone(),
                    field: "title",
                });
            }
            if topic.description.trim().is_empty() {
                return Err(CatalogError::EmptyField {
                    id: topic.id.clone(),
                    field: "description",
                });
            }
            if index.insert(topic.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId {
                    id: topic.id.clone(),
                });
            }
        }

        log::debug!("catalog loaded with {} topics", topics.len());
        Ok(Self { topics, index })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument =
            toml::from_str(raw).map_err(|error| CatalogError::Parse(error.to_string()))?;

        let topics = document
            .topics
            .into_iter()
            .map(TopicRecord::into_topic)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(topics)
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn first(&self) -> &Topic {
        &self.topics[0]
    }

    pub fn get(&self, id: &TopicId) -> Option<&Topic> {
        self.index.get(id).map(|position| &self.topics[*position])
    }

    pub fn contains(&self, id: &TopicId) -> bool {
        self.index.contains_key(id)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    topics: Vec<TopicRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TopicRecord {
    id: String,
    title: String,
    category: String,
    version: Option<String>,
    description: String,
    code_snippet: String,
    explanation: String,
    expected_output: Option<String>,
    #[serde(default)]
    version_history: Vec<VersionUpdate>,
}

impl TopicRecord {
    fn into_topic(self) -> Result<Topic, CatalogError> {
        let id = TopicId::new(self.id);
        let category =
            Category::parse(&self.category).ok_or_else(|| CatalogError::UnknownCategory {
                id: id.clone(),
                category: self.category.clone(),
            })?;

        Ok(Topic {
            id,
            title: self.title,
            category,
            version: self.version.filter(|version| !version.trim().is_empty()),
            description: self.description,
            code_snippet: self.code_snippet,
            explanation: self.explanation,
            expected_output: self
                .expected_output
                .filter(|output| !output.trim().is_empty()),
            version_history: self.version_history,
        })
    }
}

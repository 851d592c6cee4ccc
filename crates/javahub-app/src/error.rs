// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::ids::TopicId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog is empty; at least one topic is required")]
    Empty,

    #[error("topic #{index} has an empty id")]
    EmptyId { index: usize },

    #[error("duplicate topic id \"{id}\"")]
    DuplicateId { id: TopicId },

    #[error(
        "topic \"{id}\" has unknown category {category:?}; expected one of Basics, Modern Java, GUI, Networking, Enterprise, Architecture"
    )]
    UnknownCategory { id: TopicId, category: String },

    #[error("topic \"{id}\" has an empty {field}")]
    EmptyField { id: TopicId, field: &'static str },

    #[error("parse catalog: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unknown topic \"{0}\"")]
    UnknownTopic(TopicId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChatRejection {
    #[error("question is empty")]
    EmptyQuestion,

    #[error("a question is already waiting for a reply")]
    Pending,
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use javahub_app::{Catalog, Category, ChatMessage, Topic, TopicId, TutorClient, VersionUpdate};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

const TITLE_SUBJECTS: [&str; 14] = [
    "Records",
    "Sealed Interfaces",
    "Virtual Threads",
    "Pattern Matching",
    "Streams",
    "Swing Layouts",
    "JavaFX Bindings",
    "Sockets",
    "HTTP Client",
    "Servlets",
    "JPA Entities",
    "Dependency Injection",
    "Modules",
    "Generics",
];

const TITLE_PREFIXES: [&str; 8] = [
    "Introduction to",
    "Mastering",
    "Deep Dive:",
    "Practical",
    "Modern",
    "Legacy",
    "Advanced",
    "Java",
];

const VERSIONS: [&str; 6] = ["8", "11", "17", "21", "22", "24"];

const OUTPUTS: [&str; 5] = [
    "Hello, World!",
    "Point[x=1, y=2]",
    "Started 10000 threads",
    "HTTP 200",
    "BUILD SUCCESSFUL",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator for plausible topics. The same seed always yields the
/// same sequence.
#[derive(Debug, Clone)]
pub struct TopicFaker {
    rng: DeterministicRng,
    counter: usize,
}

impl TopicFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            counter: 0,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn topic(&mut self) -> Topic {
        let category = *self.pick(&Category::ALL);
        self.topic_in(category)
    }

    pub fn topic_in(&mut self, category: Category) -> Topic {
        self.counter += 1;
        let subject = *self.pick(&TITLE_SUBJECTS);
        let prefix = *self.pick(&TITLE_PREFIXES);
        let title = format!("{prefix} {subject}");
        let version = self.rng.bool().then(|| self.pick(&VERSIONS).to_string());
        let expected_output = self.rng.bool().then(|| self.pick(&OUTPUTS).to_string());

        let mut version_history = Vec::new();
        for _ in 0..self.rng.int_n(3) {
            let version = self.pick(&VERSIONS).to_string();
            version_history.push(VersionUpdate {
                description: format!("{subject} revised in Java {version}"),
                version,
            });
        }

        Topic {
            id: TopicId::new(format!("topic-{}", self.counter)),
            category,
            version,
            description: format!("How {subject} works in practice."),
            code_snippet: format!(
                "public class Demo{} {{\n    // {subject}\n}}",
                self.counter
            ),
            explanation: format!("{subject} explained step by step."),
            expected_output,
            version_history,
            title,
        }
    }

    pub fn topics(&mut self, count: usize) -> Vec<Topic> {
        (0..count).map(|_| self.topic()).collect()
    }

    pub fn catalog(&mut self, count: usize) -> Result<Catalog> {
        Catalog::new(self.topics(count.max(1))).context("build faked catalog")
    }

    fn pick<'a, T>(&mut self, values: &'a [T]) -> &'a T {
        &values[self.rng.int_n(values.len())]
    }
}

pub fn topic(id: &str, title: &str, category: Category) -> Topic {
    Topic {
        id: TopicId::from(id),
        title: title.to_owned(),
        category,
        version: None,
        description: format!("About {title}."),
        code_snippet: format!("// {id}\nSystem.out.println(\"{title}\");"),
        explanation: format!("{title} in detail."),
        expected_output: Some(title.to_owned()),
        version_history: Vec::new(),
    }
}

/// Four topics: `a` (Basics), `b` and `c` (GUI), `d` (Networking).
pub fn sample_catalog() -> Catalog {
    Catalog::new(vec![
        topic("a", "Alpha", Category::Basics),
        topic("b", "Bravo", Category::Gui),
        topic("c", "Charlie", Category::Gui),
        topic("d", "Delta", Category::Networking),
    ])
    .unwrap_or_else(|error| panic!("sample catalog must be valid: {error}"))
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

/// One queued answer for [`ScriptedTutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scripted {
    Answer(String),
    Failure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub history: Vec<ChatMessage>,
    pub question: String,
}

/// Replays queued answers in order and records every call. Once the queue is
/// drained each call fails.
#[derive(Debug, Default)]
pub struct ScriptedTutor {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTutor {
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(answers: &[&str]) -> Self {
        Self::new(
            answers
                .iter()
                .map(|answer| Scripted::Answer((*answer).to_owned())),
        )
    }

    pub fn failing(message: &str) -> Self {
        Self::new([Scripted::Failure(message.to_owned())])
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl TutorClient for ScriptedTutor {
    fn ask(&self, history: &[ChatMessage], question: &str) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                history: history.to_vec(),
                question: question.to_owned(),
            });
        }

        let next = self
            .script
            .lock()
            .map_err(|_| anyhow!("tutor script lock poisoned"))?
            .pop_front();
        match next {
            Some(Scripted::Answer(answer)) => Ok(answer),
            Some(Scripted::Failure(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("tutor script exhausted")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Scripted, ScriptedTutor, TopicFaker, sample_catalog, temp_config_path};
    use javahub_app::{Category, ChatMessage, TutorClient};
    use std::collections::BTreeSet;

    #[test]
    fn new_deterministic_seed() {
        let mut left = TopicFaker::new(42);
        let mut right = TopicFaker::new(42);
        assert_eq!(left.topics(5), right.topics(5));
    }

    #[test]
    fn faked_ids_are_unique() {
        let mut faker = TopicFaker::new(7);
        let topics = faker.topics(50);
        let ids: BTreeSet<_> = topics.iter().map(|topic| topic.id.clone()).collect();
        assert_eq!(ids.len(), topics.len());
    }

    #[test]
    fn faked_catalog_is_valid() {
        let mut faker = TopicFaker::new(9);
        let catalog = faker.catalog(30).expect("faked catalog");
        assert_eq!(catalog.len(), 30);
        for topic in catalog.topics() {
            assert!(!topic.title.is_empty());
            assert!(!topic.code_snippet.is_empty());
        }
    }

    #[test]
    fn topic_in_respects_category() {
        let mut faker = TopicFaker::new(3);
        for category in Category::ALL {
            assert_eq!(faker.topic_in(category).category, category);
        }
    }

    #[test]
    fn sample_catalog_shape() {
        let catalog = sample_catalog();
        let ids: Vec<_> = catalog
            .topics()
            .iter()
            .map(|topic| topic.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn scripted_tutor_replays_in_order() {
        let tutor = ScriptedTutor::new([
            Scripted::Answer("first".to_owned()),
            Scripted::Failure("boom".to_owned()),
        ]);
        let history = [ChatMessage::assistant("hi")];

        assert_eq!(tutor.ask(&history, "q1").expect("first answer"), "first");
        let error = tutor.ask(&history, "q2").expect_err("scripted failure");
        assert_eq!(error.to_string(), "boom");
        assert!(tutor.ask(&history, "q3").is_err());

        let calls = tutor.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].question, "q2");
        assert_eq!(calls[0].history, history.to_vec());
    }

    #[test]
    fn temp_config_path_lives_in_temp_dir() {
        let (dir, path) = temp_config_path().expect("temp path");
        assert!(path.starts_with(dir.path()));
        assert!(!path.exists());
    }
}

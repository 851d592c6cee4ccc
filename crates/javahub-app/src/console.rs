// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::Duration;

use crate::ids::TopicId;
use crate::model::Topic;

pub const DEFAULT_RUN_DELAY: Duration = Duration::from_millis(1200);
pub const FALLBACK_OUTPUT: &str = "Program finished with exit code 0.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
}

/// Identifies one scheduled completion. Only the ticket handed out by the
/// latest `start` can complete a run; every reset invalidates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunTicket {
    pub topic_id: TopicId,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionSimulator {
    state: RunState,
    output: Option<String>,
    generation: u64,
    pending: Option<RunTicket>,
}

impl ExecutionSimulator {
    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Returns `None` while a run is already in flight.
    pub fn start(&mut self, topic_id: &TopicId) -> Option<RunTicket> {
        if self.state == RunState::Running {
            return None;
        }

        self.generation = self.generation.wrapping_add(1);
        let ticket = RunTicket {
            topic_id: topic_id.clone(),
            generation: self.generation,
        };
        self.state = RunState::Running;
        self.output = None;
        self.pending = Some(ticket.clone());
        Some(ticket)
    }

    /// Applies a completion for `topic`. Stale tickets, and tickets whose
    /// topic differs from `topic`, are discarded and return `false`.
    pub fn complete(&mut self, ticket: &RunTicket, topic: &Topic) -> bool {
        if self.pending.as_ref() != Some(ticket) || ticket.topic_id != topic.id {
            return false;
        }

        self.pending = None;
        self.state = RunState::Completed;
        self.output = Some(
            topic
                .expected_output
                .as_deref()
                .filter(|output| !output.trim().is_empty())
                .unwrap_or(FALLBACK_OUTPUT)
                .to_owned(),
        );
        true
    }

    /// Drops the in-flight run for `ticket` when its completion can never
    /// arrive. Any other ticket leaves the console alone.
    pub fn abort(&mut self, ticket: &RunTicket) -> bool {
        if self.pending.as_ref() != Some(ticket) {
            return false;
        }
        self.reset();
        true
    }

    /// Closes a completed console. A run in flight keeps going.
    pub fn dismiss(&mut self) -> bool {
        if self.state != RunState::Completed {
            return false;
        }
        self.state = RunState::Idle;
        self.output = None;
        true
    }

    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending = None;
        self.state = RunState::Idle;
        self.output = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{ExecutionSimulator, FALLBACK_OUTPUT, RunState};
    use crate::ids::TopicId;
    use crate::model::{Category, Topic};

    fn topic(id: &str, expected_output: Option<&str>) -> Topic {
        Topic {
            id: TopicId::from(id),
            title: id.to_owned(),
            category: Category::Basics,
            version: None,
            description: "summary".to_owned(),
            code_snippet: String::new(),
            explanation: String::new(),
            expected_output: expected_output.map(str::to_owned),
            version_history: Vec::new(),
        }
    }

    #[test]
    fn run_completes_with_expected_output() {
        let hello = topic("hello", Some("Hello"));
        let mut console = ExecutionSimulator::default();

        let ticket = console.start(&hello.id).expect("idle console should start");
        assert_eq!(console.state(), RunState::Running);
        assert_eq!(console.output(), None);

        assert!(console.complete(&ticket, &hello));
        assert_eq!(console.state(), RunState::Completed);
        assert_eq!(console.output(), Some("Hello"));
    }

    #[test]
    fn missing_expected_output_uses_fallback() {
        let silent = topic("silent", None);
        let mut console = ExecutionSimulator::default();

        let ticket = console.start(&silent.id).expect("start");
        assert!(console.complete(&ticket, &silent));
        assert_eq!(console.output(), Some(FALLBACK_OUTPUT));
    }

    #[test]
    fn blank_expected_output_uses_fallback() {
        let blank = topic("blank", Some("  \n"));
        let mut console = ExecutionSimulator::default();

        let ticket = console.start(&blank.id).expect("start");
        assert!(console.complete(&ticket, &blank));
        assert_eq!(console.output(), Some(FALLBACK_OUTPUT));
    }

    #[test]
    fn abort_returns_console_to_idle_and_allows_restart() {
        let hello = topic("hello", Some("Hello"));
        let mut console = ExecutionSimulator::default();

        let ticket = console.start(&hello.id).expect("start");
        assert!(console.abort(&ticket));
        assert_eq!(console.state(), RunState::Idle);
        assert!(!console.complete(&ticket, &hello));

        let retry = console.start(&hello.id).expect("aborted console restarts");
        assert!(!console.abort(&ticket));
        assert_eq!(console.state(), RunState::Running);
        assert!(console.complete(&retry, &hello));
    }

    #[test]
    fn second_start_while_running_is_ignored() {
        let hello = topic("hello", Some("Hello"));
        let mut console = ExecutionSimulator::default();

        let first = console.start(&hello.id).expect("start");
        assert!(console.start(&hello.id).is_none());

        assert!(console.complete(&first, &hello));
        assert!(!console.complete(&first, &hello));
    }

    #[test]
    fn reset_discards_in_flight_ticket() {
        let hello = topic("hello", Some("Hello"));
        let mut console = ExecutionSimulator::default();

        let ticket = console.start(&hello.id).expect("start");
        console.reset();
        assert_eq!(console.state(), RunState::Idle);

        assert!(!console.complete(&ticket, &hello));
        assert_eq!(console.state(), RunState::Idle);
        assert_eq!(console.output(), None);
    }

    #[test]
    fn stale_ticket_cannot_complete_a_newer_run() {
        let hello = topic("hello", Some("Hello"));
        let mut console = ExecutionSimulator::default();

        let stale = console.start(&hello.id).expect("start");
        console.reset();
        let fresh = console.start(&hello.id).expect("restart");
        assert_ne!(stale, fresh);

        assert!(!console.complete(&stale, &hello));
        assert_eq!(console.state(), RunState::Running);
        assert!(console.complete(&fresh, &hello));
    }

    #[test]
    fn ticket_for_other_topic_is_discarded() {
        let hello = topic("hello", Some("Hello"));
        let other = topic("other", Some("Other"));
        let mut console = ExecutionSimulator::default();

        let ticket = console.start(&hello.id).expect("start");
        assert!(!console.complete(&ticket, &other));
        assert_eq!(console.state(), RunState::Running);
    }

    #[test]
    fn dismiss_only_closes_completed_output() {
        let hello = topic("hello", Some("Hello"));
        let mut console = ExecutionSimulator::default();

        assert!(!console.dismiss());
        let ticket = console.start(&hello.id).expect("start");
        assert!(!console.dismiss());
        assert_eq!(console.state(), RunState::Running);

        console.complete(&ticket, &hello);
        assert!(console.dismiss());
        assert_eq!(console.state(), RunState::Idle);
        assert_eq!(console.output(), None);
    }

    #[test]
    fn rerun_after_completion_clears_previous_output() {
        let hello = topic("hello", Some("Hello"));
        let mut console = ExecutionSimulator::default();

        let first = console.start(&hello.id).expect("start");
        console.complete(&first, &hello);

        let second = console.start(&hello.id).expect("completed console restarts");
        assert_eq!(console.output(), None);
        assert!(console.complete(&second, &hello));
        assert_eq!(console.output(), Some("Hello"));
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::console::{ExecutionSimulator, RunState, RunTicket};
use crate::error::SelectionError;
use crate::filter::filter_topics;
use crate::ids::TopicId;
use crate::model::{AppMode, CategoryFilter, CopyTarget, Topic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatVisibility {
    Hidden,
    Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CopyIndicator {
    pub snippet: bool,
    pub all_visible: bool,
}

impl CopyIndicator {
    fn set(&mut self, target: CopyTarget, value: bool) {
        match target {
            CopyTarget::Snippet => self.snippet = value,
            CopyTarget::AllVisible => self.all_visible = value,
        }
    }

    pub fn get(&self, target: CopyTarget) -> bool {
        match target {
            CopyTarget::Snippet => self.snippet,
            CopyTarget::AllVisible => self.all_visible,
        }
    }
}

/// The browser's single live view state. The selected topic always resolves
/// in the catalog; it is never cleared and is not changed by filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    catalog: Arc<Catalog>,
    selected: TopicId,
    search_query: String,
    active_category: CategoryFilter,
    console: ExecutionSimulator,
    pub mode: AppMode,
    pub chat: ChatVisibility,
    pub copied: CopyIndicator,
    pub status_line: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    SelectTopic(TopicId),
    MoveSelection(isize),
    SetSearchQuery(String),
    ClearSearch,
    SetCategory(CategoryFilter),
    CycleCategory(isize),
    EnterSearch,
    ExitSearch,
    RunSelected,
    CompleteRun(RunTicket),
    AbortRun(RunTicket),
    DismissOutput,
    MarkCopied(CopyTarget),
    ClearCopied(CopyTarget),
    OpenChat,
    CloseChat,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    TopicSelected(TopicId),
    SelectionRejected(TopicId),
    SearchChanged(String),
    CategoryChanged(CategoryFilter),
    ModeChanged(AppMode),
    RunScheduled(RunTicket),
    RunIgnored,
    RunCompleted(TopicId),
    RunDiscarded(RunTicket),
    RunAborted(RunTicket),
    OutputDismissed,
    CopyIndicatorChanged(CopyTarget, bool),
    ChatVisibilityChanged(ChatVisibility),
    StatusUpdated(String),
    StatusCleared,
}

impl ViewState {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let selected = catalog.first().id.clone();
        Self {
            catalog,
            selected,
            search_query: String::new(),
            active_category: CategoryFilter::All,
            console: ExecutionSimulator::default(),
            mode: AppMode::Browse,
            chat: ChatVisibility::Hidden,
            copied: CopyIndicator::default(),
            status_line: None,
        }
    }

    pub fn with_selection(catalog: Arc<Catalog>, id: &TopicId) -> Result<Self, SelectionError> {
        let mut state = Self::new(catalog);
        state.select_topic(id)?;
        Ok(state)
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn selected_id(&self) -> &TopicId {
        &self.selected
    }

    pub fn selected_topic(&self) -> &Topic {
        match self.catalog.get(&self.selected) {
            Some(topic) => topic,
            None => self.catalog.first(),
        }
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn active_category(&self) -> CategoryFilter {
        self.active_category
    }

    pub fn run_state(&self) -> RunState {
        self.console.state()
    }

    pub fn console_output(&self) -> Option<&str> {
        self.console.output()
    }

    pub fn visible_topics(&self) -> Vec<&Topic> {
        filter_topics(
            self.catalog.topics(),
            &self.search_query,
            self.active_category,
        )
    }

    pub fn selection_visible(&self) -> bool {
        self.visible_topics()
            .iter()
            .any(|topic| topic.id == self.selected)
    }

    /// Rejects unknown ids and leaves the state untouched. Selecting any
    /// topic, including the current one, resets the console.
    pub fn select_topic(&mut self, id: &TopicId) -> Result<(), SelectionError> {
        if !self.catalog.contains(id) {
            return Err(SelectionError::UnknownTopic(id.clone()));
        }
        self.selected = id.clone();
        self.console.reset();
        log::debug!("selected topic {id}");
        Ok(())
    }

    pub fn set_search_query(&mut self, text: impl Into<String>) {
        self.search_query = text.into();
    }

    pub fn clear_search(&mut self) {
        self.set_search_query("");
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.active_category = category;
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::SelectTopic(id) => match self.select_topic(&id) {
                Ok(()) => vec![AppEvent::TopicSelected(id)],
                Err(error) => {
                    let status = self.set_status(&error.to_string());
                    vec![AppEvent::SelectionRejected(id), status]
                }
            },
            AppCommand::MoveSelection(delta) => self.move_selection(delta),
            AppCommand::SetSearchQuery(text) => {
                self.set_search_query(text);
                vec![AppEvent::SearchChanged(self.search_query.clone())]
            }
            AppCommand::ClearSearch => {
                self.clear_search();
                vec![AppEvent::SearchChanged(String::new())]
            }
            AppCommand::SetCategory(category) => {
                self.set_category(category);
                vec![AppEvent::CategoryChanged(category)]
            }
            AppCommand::CycleCategory(delta) => self.cycle_category(delta),
            AppCommand::EnterSearch => {
                self.mode = AppMode::Search;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ExitSearch => {
                self.mode = AppMode::Browse;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::RunSelected => {
                let id = self.selected.clone();
                match self.console.start(&id) {
                    Some(ticket) => {
                        log::debug!("run scheduled for {id} (generation {})", ticket.generation);
                        vec![AppEvent::RunScheduled(ticket)]
                    }
                    None => vec![AppEvent::RunIgnored],
                }
            }
            AppCommand::CompleteRun(ticket) => {
                let completed = match self.catalog.get(&ticket.topic_id) {
                    Some(topic) => self.console.complete(&ticket, topic),
                    None => false,
                };
                if completed {
                    vec![AppEvent::RunCompleted(ticket.topic_id)]
                } else {
                    log::debug!(
                        "discarded stale run for {} (generation {})",
                        ticket.topic_id,
                        ticket.generation
                    );
                    vec![AppEvent::RunDiscarded(ticket)]
                }
            }
            AppCommand::AbortRun(ticket) => {
                if self.console.abort(&ticket) {
                    log::debug!("aborted run for {}", ticket.topic_id);
                    vec![AppEvent::RunAborted(ticket)]
                } else {
                    Vec::new()
                }
            }
            AppCommand::DismissOutput => {
                if self.console.dismiss() {
                    vec![AppEvent::OutputDismissed]
                } else {
                    Vec::new()
                }
            }
            AppCommand::MarkCopied(target) => {
                self.copied.set(target, true);
                let label = match target {
                    CopyTarget::Snippet => "copied snippet",
                    CopyTarget::AllVisible => "copied all visible snippets",
                };
                vec![
                    AppEvent::CopyIndicatorChanged(target, true),
                    self.set_status(label),
                ]
            }
            AppCommand::ClearCopied(target) => {
                self.copied.set(target, false);
                vec![AppEvent::CopyIndicatorChanged(target, false)]
            }
            AppCommand::OpenChat => {
                self.chat = ChatVisibility::Visible;
                vec![
                    AppEvent::ChatVisibilityChanged(self.chat),
                    self.set_status("chat open"),
                ]
            }
            AppCommand::CloseChat => {
                self.chat = ChatVisibility::Hidden;
                vec![
                    AppEvent::ChatVisibilityChanged(self.chat),
                    self.set_status("chat hidden"),
                ]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    /// Steps through the visible list. When the selection is filtered out the
    /// step lands on the first (or last) visible topic instead.
    fn move_selection(&mut self, delta: isize) -> Vec<AppEvent> {
        let visible = self.visible_topics();
        if visible.is_empty() || delta == 0 {
            return Vec::new();
        }

        let last = visible.len() as isize - 1;
        let next = match visible.iter().position(|topic| topic.id == self.selected) {
            Some(current) => (current as isize).saturating_add(delta).clamp(0, last),
            None if delta > 0 => 0,
            None => last,
        };

        let target = visible[next as usize].id.clone();
        if target == self.selected {
            return Vec::new();
        }

        self.selected = target.clone();
        self.console.reset();
        vec![AppEvent::TopicSelected(target)]
    }

    fn cycle_category(&mut self, delta: isize) -> Vec<AppEvent> {
        let filters = CategoryFilter::ALL;
        let current = filters
            .iter()
            .position(|filter| *filter == self.active_category)
            .unwrap_or(0) as isize;
        let len = filters.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_category = filters[next];
        vec![AppEvent::CategoryChanged(self.active_category)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod clipboard;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use javahub_app::{
    Accent, AppCommand, AppEvent, AppMode, CategoryFilter, ChatRejection, ChatVisibility,
    ConversationState, CopyTarget, DEFAULT_RUN_DELAY, PendingQuestion, Role, RunState, RunTicket,
    TutorReply, ViewState, snippet_text, tutor_reply, visible_snippets_text,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const APP_TITLE: &str = "Java Mastery Hub";
const SEARCH_PLACEHOLDER: &str = "Search core concepts...";
const NO_TOPICS: &str = "No topics found.";
const THINKING: &str = "Mentor is thinking...";
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const COPIED_CLEAR_AFTER: Duration = Duration::from_secs(2);
const PAGE_ROWS: u16 = 10;
const SIDEBAR_HEADER_ROWS: usize = 4;
const CHAT_TRANSCRIPT_KEEP: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TutorEvent {
    Chunk { request_id: u64, chunk: String },
    Finished { request_id: u64, reply: TutorReply },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    ClearCopied { target: CopyTarget, token: u64 },
    RunFinished(RunTicket),
    Tutor(TutorEvent),
}

/// Side effects the browser needs from its host: timers, the tutor and the
/// clipboard.
pub trait AppRuntime {
    fn run_delay(&self) -> Duration {
        DEFAULT_RUN_DELAY
    }

    /// Delivers `ticket` back as [`InternalEvent::RunFinished`] once the run
    /// delay has elapsed.
    fn schedule_run_completion(
        &mut self,
        ticket: RunTicket,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let delay = self.run_delay();
        thread::Builder::new()
            .name("javahub-run".to_owned())
            .spawn(move || {
                thread::sleep(delay);
                let _ = tx.send(InternalEvent::RunFinished(ticket));
            })
            .context("spawn run timer")?;
        Ok(())
    }

    /// Answers `pending` off the UI thread. Implementations send any
    /// [`TutorEvent::Chunk`]s followed by exactly one [`TutorEvent::Finished`]
    /// whose reply went through [`tutor_reply`].
    fn spawn_tutor_request(
        &mut self,
        pending: &PendingQuestion,
        tx: Sender<InternalEvent>,
    ) -> Result<()>;

    fn copy_to_clipboard(&mut self, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    conversation: ConversationState,
    chat_input: String,
    help_visible: bool,
    content_scroll: u16,
    status_token: u64,
    snippet_copy_token: u64,
    all_copy_token: u64,
}

impl ViewData {
    fn bump_copy_token(&mut self, target: CopyTarget) -> u64 {
        let token = match target {
            CopyTarget::Snippet => &mut self.snippet_copy_token,
            CopyTarget::AllVisible => &mut self.all_copy_token,
        };
        *token = token.saturating_add(1);
        *token
    }

    fn copy_token(&self, target: CopyTarget) -> u64 {
        match target {
            CopyTarget::Snippet => self.snippet_copy_token,
            CopyTarget::AllVisible => self.all_copy_token,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct StyledLine {
    text: String,
    style: Style,
}

impl StyledLine {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::default(),
        }
    }

    fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    fn blank() -> Self {
        Self::plain(String::new())
    }
}

pub fn run_app<R: AppRuntime>(state: &mut ViewState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let result = event_loop(
        &mut terminal,
        state,
        runtime,
        &mut view_data,
        &internal_tx,
        &internal_rx,
    );

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn event_loop<R: AppRuntime>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut ViewState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    internal_rx: &Receiver<InternalEvent>,
) -> Result<()> {
    loop {
        process_internal_events(state, view_data, internal_tx, internal_rx);

        terminal
            .draw(|frame| render(frame, state, view_data))
            .context("draw frame")?;

        if event::poll(Duration::from_millis(100)).context("poll event")?
            && let Event::Key(key) = event::read().context("read event")?
            && handle_key_event(state, runtime, view_data, internal_tx, key)
        {
            return Ok(());
        }
    }
}

fn process_internal_events(
    state: &mut ViewState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::ClearCopied { target, token } if token == view_data.copy_token(target) => {
                state.dispatch(AppCommand::ClearCopied(target));
            }
            InternalEvent::ClearCopied { .. } => {}
            InternalEvent::RunFinished(ticket) => {
                state.dispatch(AppCommand::CompleteRun(ticket));
            }
            InternalEvent::Tutor(event) => handle_tutor_event(state, view_data, tx, event),
        }
    }
}

fn handle_tutor_event(
    state: &mut ViewState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    event: TutorEvent,
) {
    match event {
        TutorEvent::Chunk { request_id, chunk } => {
            view_data.conversation.append_chunk(request_id, &chunk);
        }
        TutorEvent::Finished { request_id, reply } => {
            let cause = reply.as_ref().err().map(|fallback| fallback.cause.clone());
            if view_data.conversation.finish(request_id, reply)
                && let Some(cause) = cause
            {
                emit_status(state, view_data, tx, format!("mentor unreachable: {cause}"));
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn schedule_copied_clear(internal_tx: &Sender<InternalEvent>, target: CopyTarget, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(COPIED_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearCopied { target, token });
    });
}

fn emit_status(
    state: &mut ViewState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn dispatch_and_track<R: AppRuntime>(
    state: &mut ViewState,
    runtime: &mut R,
    view_data: &mut ViewData,
    command: AppCommand,
    internal_tx: &Sender<InternalEvent>,
) {
    let events = state.dispatch(command);
    let mut follow_up = None;
    for event in &events {
        match event {
            AppEvent::TopicSelected(_) => view_data.content_scroll = 0,
            AppEvent::RunScheduled(ticket) => {
                if let Err(error) =
                    runtime.schedule_run_completion(ticket.clone(), internal_tx.clone())
                {
                    log::warn!("run timer for {} not started: {error:#}", ticket.topic_id);
                    state.dispatch(AppCommand::AbortRun(ticket.clone()));
                    follow_up = Some(format!("run failed to start: {error:#}"));
                }
            }
            AppEvent::RunIgnored => follow_up = Some("already running".to_owned()),
            _ => {}
        }
    }

    if let Some(message) = follow_up {
        emit_status(state, view_data, internal_tx, message);
    } else if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut ViewState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
            emit_status(state, view_data, internal_tx, "help hidden");
        }
        return false;
    }

    if state.chat == ChatVisibility::Visible {
        handle_chat_overlay_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if state.mode == AppMode::Search {
        handle_search_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    let command = match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
            AppCommand::MoveSelection(1)
        }
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
            AppCommand::MoveSelection(-1)
        }
        (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => {
            match state.visible_topics().first() {
                Some(topic) => AppCommand::SelectTopic(topic.id.clone()),
                None => return false,
            }
        }
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => match state.visible_topics().last() {
            Some(topic) => AppCommand::SelectTopic(topic.id.clone()),
            None => return false,
        },
        (KeyCode::Char('/'), _) => AppCommand::EnterSearch,
        (KeyCode::Char('x'), KeyModifiers::NONE) => AppCommand::ClearSearch,
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            AppCommand::ClearSearch
        }
        (KeyCode::Tab, _) | (KeyCode::Char('f'), KeyModifiers::NONE) => {
            AppCommand::CycleCategory(1)
        }
        (KeyCode::BackTab, _) | (KeyCode::Char('b'), KeyModifiers::NONE) => {
            AppCommand::CycleCategory(-1)
        }
        (KeyCode::Char(digit @ '0'..='6'), KeyModifiers::NONE) => {
            let index = usize::from(digit as u8 - b'0');
            AppCommand::SetCategory(CategoryFilter::ALL[index])
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => AppCommand::RunSelected,
        (KeyCode::Char('d'), KeyModifiers::NONE) => AppCommand::DismissOutput,
        (KeyCode::Char('c'), KeyModifiers::NONE) => {
            copy_target(state, runtime, view_data, internal_tx, CopyTarget::Snippet);
            return false;
        }
        (KeyCode::Char('C'), _) => {
            copy_target(state, runtime, view_data, internal_tx, CopyTarget::AllVisible);
            return false;
        }
        (KeyCode::Char('@'), _) => AppCommand::OpenChat,
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
            return false;
        }
        (KeyCode::PageDown, _) | (KeyCode::Char('J'), _) => {
            view_data.content_scroll = view_data.content_scroll.saturating_add(PAGE_ROWS);
            return false;
        }
        (KeyCode::PageUp, _) | (KeyCode::Char('K'), _) => {
            view_data.content_scroll = view_data.content_scroll.saturating_sub(PAGE_ROWS);
            return false;
        }
        _ => return false,
    };

    dispatch_and_track(state, runtime, view_data, command, internal_tx);
    false
}

fn handle_search_key<R: AppRuntime>(
    state: &mut ViewState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let command = match (key.code, key.modifiers) {
        (KeyCode::Esc, _) | (KeyCode::Enter, _) => AppCommand::ExitSearch,
        (KeyCode::Down, _) => AppCommand::MoveSelection(1),
        (KeyCode::Up, _) => AppCommand::MoveSelection(-1),
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            AppCommand::ClearSearch
        }
        (KeyCode::Backspace, _) => {
            let mut query = state.search_query().to_owned();
            if query.pop().is_none() {
                return;
            }
            AppCommand::SetSearchQuery(query)
        }
        (KeyCode::Char(ch), modifiers)
            if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT =>
        {
            let mut query = state.search_query().to_owned();
            query.push(ch);
            AppCommand::SetSearchQuery(query)
        }
        _ => return,
    };
    dispatch_and_track(state, runtime, view_data, command, internal_tx);
}

fn handle_chat_overlay_key<R: AppRuntime>(
    state: &mut ViewState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            dispatch_and_track(
                state,
                runtime,
                view_data,
                AppCommand::CloseChat,
                internal_tx,
            );
        }
        (KeyCode::Enter, _) => submit_chat_input(state, runtime, view_data, internal_tx),
        (KeyCode::Backspace, _) => {
            view_data.chat_input.pop();
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.chat_input.clear();
        }
        (KeyCode::Char(ch), modifiers) => {
            if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT {
                view_data.chat_input.push(ch);
            }
        }
        _ => {}
    }
}

fn submit_chat_input<R: AppRuntime>(
    state: &mut ViewState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let pending = match view_data.conversation.begin(&view_data.chat_input) {
        Ok(pending) => pending,
        Err(ChatRejection::EmptyQuestion) => return,
        Err(ChatRejection::Pending) => {
            emit_status(
                state,
                view_data,
                internal_tx,
                "mentor is still answering; wait for the reply",
            );
            return;
        }
    };
    view_data.chat_input.clear();

    if let Err(error) = runtime.spawn_tutor_request(&pending, internal_tx.clone()) {
        let event = TutorEvent::Finished {
            request_id: pending.request_id,
            reply: tutor_reply(Err(error)),
        };
        handle_tutor_event(state, view_data, internal_tx, event);
    }
}

fn copy_target<R: AppRuntime>(
    state: &mut ViewState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    target: CopyTarget,
) {
    let text = match target {
        CopyTarget::Snippet => Some(snippet_text(state.selected_topic()).to_owned()),
        CopyTarget::AllVisible => {
            let visible = state.visible_topics();
            (!visible.is_empty()).then(|| visible_snippets_text(&visible))
        }
    };
    let Some(text) = text else {
        emit_status(state, view_data, internal_tx, "no visible topics to copy");
        return;
    };

    if let Err(error) = runtime.copy_to_clipboard(&text) {
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("copy failed: {error:#}"),
        );
        return;
    }

    let token = view_data.bump_copy_token(target);
    dispatch_and_track(
        state,
        runtime,
        view_data,
        AppCommand::MarkCopied(target),
        internal_tx,
    );
    schedule_copied_clear(internal_tx, target, token);
}

fn render(frame: &mut ratatui::Frame<'_>, state: &ViewState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(state)).block(
        Block::default()
            .title(APP_TITLE)
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::White)),
    );
    frame.render_widget(header, layout[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(20)])
        .split(layout[1]);

    let sidebar = sidebar_lines(state);
    let inner_height = usize::from(body[0].height.saturating_sub(2));
    let sidebar_scroll = sidebar_scroll_offset(state, inner_height);
    let sidebar_widget = Paragraph::new(to_widget_lines(&sidebar))
        .scroll((sidebar_scroll, 0))
        .block(Block::default().title("syllabus").borders(Borders::ALL));
    frame.render_widget(sidebar_widget, body[0]);

    let topic = state.selected_topic();
    let content = Paragraph::new(to_widget_lines(&content_lines(state)))
        .wrap(Wrap { trim: false })
        .scroll((view_data.content_scroll, 0))
        .block(
            Block::default()
                .title(topic.title.as_str())
                .borders(Borders::ALL),
        );
    frame.render_widget(content, body[1]);

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if state.chat == ChatVisibility::Visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let chat = Paragraph::new(render_chat_overlay_text(
            &view_data.conversation,
            &view_data.chat_input,
        ))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title("Java AI Mentor")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(chat, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn header_text(state: &ViewState) -> String {
    let search = match (state.mode, state.search_query().is_empty()) {
        (AppMode::Search, _) => format!("search: {}_", state.search_query()),
        (AppMode::Browse, true) => format!("/ {SEARCH_PLACEHOLDER}"),
        (AppMode::Browse, false) => format!("search: {} (x clear)", state.search_query()),
    };
    let copy_all = if state.copied.all_visible {
        "Copied All"
    } else {
        "C Copy All Snippets"
    };
    format!("{search} | {copy_all}")
}

fn sidebar_lines(state: &ViewState) -> Vec<StyledLine> {
    let active = state.active_category();
    let filters = CategoryFilter::ALL
        .iter()
        .map(|filter| {
            if *filter == active {
                format!("[{}]", filter.label())
            } else {
                filter.label().to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let mut lines = vec![
        StyledLine::styled("FILTER PATH", Style::default().fg(Color::DarkGray)),
        StyledLine::plain(filters),
        StyledLine::blank(),
        StyledLine::styled("MASTERY SYLLABUS", Style::default().fg(Color::DarkGray)),
    ];

    let visible = state.visible_topics();
    if visible.is_empty() {
        lines.push(StyledLine::blank());
        lines.push(StyledLine::styled(
            NO_TOPICS,
            Style::default().fg(Color::DarkGray),
        ));
        return lines;
    }

    for topic in visible {
        let selected = topic.id == *state.selected_id();
        let style = topic.category.style();
        let marker = if selected { ">" } else { " " };
        let title_style = if selected {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(StyledLine::styled(
            format!("{marker} {} {}", style.icon, topic.title),
            title_style,
        ));
        lines.push(StyledLine::styled(
            format!("    {}", topic.subtitle().to_uppercase()),
            Style::default().fg(accent_color(style.accent)),
        ));
    }
    lines
}

fn sidebar_scroll_offset(state: &ViewState, height: usize) -> u16 {
    let Some(position) = state
        .visible_topics()
        .iter()
        .position(|topic| topic.id == *state.selected_id())
    else {
        return 0;
    };
    let bottom = SIDEBAR_HEADER_ROWS + position * 2 + 2;
    u16::try_from(bottom.saturating_sub(height)).unwrap_or(u16::MAX)
}

fn content_lines(state: &ViewState) -> Vec<StyledLine> {
    let topic = state.selected_topic();
    let style = topic.category.style();
    let accent = Style::default().fg(accent_color(style.accent));
    let heading = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let muted = Style::default().fg(Color::DarkGray);

    let mut tags = format!("{} {}", style.icon, topic.category.label().to_uppercase());
    if let Some(version) = &topic.version {
        tags.push_str(&format!(" | {}", version.to_uppercase()));
    }

    let mut lines = vec![
        StyledLine::styled(tags, accent),
        StyledLine::styled(topic.title.clone(), heading),
        StyledLine::blank(),
        StyledLine::plain(topic.description.clone()),
        StyledLine::blank(),
    ];

    let run_hint = if state.run_state() == RunState::Running {
        "Executing..."
    } else {
        "r Run"
    };
    let copy_hint = if state.copied.snippet {
        "Copied"
    } else {
        "c Copy"
    };
    lines.push(StyledLine::styled(
        format!("── Source.java ── {run_hint} | {copy_hint}"),
        muted,
    ));
    for code_line in topic.code_snippet.lines() {
        lines.push(StyledLine::styled(
            code_line.to_owned(),
            Style::default().fg(Color::LightBlue),
        ));
    }

    match (state.run_state(), state.console_output()) {
        (RunState::Running, _) => {
            lines.push(StyledLine::blank());
            lines.push(StyledLine::styled("── Output Console ──", muted));
            lines.push(StyledLine::styled(
                format!("_ Compiling {}...", topic.title),
                muted,
            ));
        }
        (RunState::Completed, Some(output)) => {
            lines.push(StyledLine::blank());
            lines.push(StyledLine::styled("── Output Console ── d dismiss", muted));
            lines.push(StyledLine::styled("EXECUTION RESULT:", muted));
            for output_line in output.lines() {
                lines.push(StyledLine::styled(
                    output_line.to_owned(),
                    Style::default().fg(Color::Green),
                ));
            }
        }
        _ => {}
    }

    lines.push(StyledLine::blank());
    lines.push(StyledLine::styled("Detailed Explanation", heading));
    lines.push(StyledLine::plain(topic.explanation.clone()));

    if !topic.version_history.is_empty() {
        lines.push(StyledLine::blank());
        lines.push(StyledLine::styled("Evolutionary Path", heading));
        for update in &topic.version_history {
            lines.push(StyledLine::styled(
                format!("  {:<10} {}", update.version, update.description),
                Style::default().fg(Color::Green),
            ));
        }
    }
    lines
}

fn render_chat_overlay_text(conversation: &ConversationState, input: &str) -> String {
    let mut lines = Vec::new();
    let messages = conversation.messages();
    let keep = messages.len().saturating_sub(CHAT_TRANSCRIPT_KEEP);
    for message in messages.iter().skip(keep) {
        let label = match message.role {
            Role::User => "you",
            Role::Assistant => "mentor",
        };
        lines.push(format!("{label}: {}", message.content));
    }

    if conversation.is_pending() {
        if !conversation.draft().is_empty() {
            lines.push(format!("mentor: {}", conversation.draft()));
        }
        lines.push(THINKING.to_owned());
    }

    lines.push(String::new());
    lines.push(format!("> {input}"));
    lines.push("enter send | ctrl+u clear | esc close".to_owned());
    lines.join("\n")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
browse: j/k or up/down move | g/G first/last | pgup/pgdn or J/K scroll | q quit\n\
filter: / search | x or ctrl+u clear search | tab/b/f cycle category | 0-6 pick category\n\
console: r run | d dismiss output\n\
copy: c snippet | C all visible snippets\n\
search: type to filter | backspace delete | up/down move | enter/esc done\n\
chat: @ open | enter send | ctrl+u clear | esc close"
}

fn status_text(state: &ViewState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }

    let (mode, hints) = if state.chat == ChatVisibility::Visible {
        ("CHAT", "enter send | esc close | ctrl+q quit")
    } else if state.mode == AppMode::Search {
        ("SEARCH", "type to filter | ctrl+u clear | enter/esc done")
    } else {
        (
            "BROWSE",
            "j/k move | / search | tab category | r run | d dismiss | c/C copy | @ chat | ? help | q quit",
        )
    };
    let counts = format!(
        "{}/{} topics",
        state.visible_topics().len(),
        state.catalog().len()
    );
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {counts} | {hints}"),
        None => format!("{mode} | {counts} | {hints}"),
    }
}

fn to_widget_lines(lines: &[StyledLine]) -> Vec<Line<'static>> {
    lines
        .iter()
        .map(|line| Line::styled(line.text.clone(), line.style))
        .collect()
}

#[cfg(test)]
fn plain_text(lines: &[StyledLine]) -> String {
    lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

const fn accent_color(accent: Accent) -> Color {
    match accent {
        Accent::Slate => Color::Rgb(148, 163, 184),
        Accent::Orange => Color::Rgb(251, 146, 60),
        Accent::Blue => Color::Rgb(96, 165, 250),
        Accent::Emerald => Color::Rgb(52, 211, 153),
        Accent::Purple => Color::Rgb(192, 132, 252),
        Accent::Red => Color::Rgb(248, 113, 113),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

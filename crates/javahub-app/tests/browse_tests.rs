// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use javahub_app::{
    AppCommand, AppEvent, Catalog, Category, CategoryFilter, ChatMessage, ConversationState,
    FAILURE_REPLY, GREETING, RunState, TopicId, TutorClient, ViewState, ask_with_fallback,
    filter_topics, visible_snippets_text,
};
use javahub_testkit::{ScriptedTutor, TopicFaker, sample_catalog};
use std::sync::Arc;

fn ask(chat: &mut ConversationState, tutor: &dyn TutorClient, question: &str) -> ChatMessage {
    let pending = chat.begin(question).expect("question accepted");
    let reply = ask_with_fallback(tutor, &pending.history, &pending.question);
    assert!(chat.finish(pending.request_id, reply));
    chat.messages().last().cloned().expect("reply recorded")
}

fn scheduled(events: Vec<AppEvent>) -> javahub_app::RunTicket {
    match events.as_slice() {
        [AppEvent::RunScheduled(ticket)] => ticket.clone(),
        other => panic!("expected one scheduled run, got {other:?}"),
    }
}

#[test]
fn builtin_catalog_browses_end_to_end() -> Result<()> {
    let catalog = Arc::new(Catalog::builtin()?);
    let mut state = ViewState::new(Arc::clone(&catalog));
    assert_eq!(state.selected_id().as_str(), "java-basics-intro");

    state.dispatch(AppCommand::SetSearchQuery("java".to_owned()));
    let titles: Vec<_> = state
        .visible_topics()
        .iter()
        .map(|topic| topic.title.to_lowercase())
        .collect();
    assert!(!titles.is_empty());
    for (topic, title) in state.visible_topics().iter().zip(&titles) {
        assert!(
            title.contains("java") || topic.category == Category::ModernJava,
            "unexpected match {title}"
        );
    }

    state.dispatch(AppCommand::ClearSearch);
    state.dispatch(AppCommand::SetCategory(CategoryFilter::Only(
        Category::Networking,
    )));
    assert!(
        state
            .visible_topics()
            .iter()
            .all(|topic| topic.category == Category::Networking)
    );
    Ok(())
}

#[test]
fn gui_filter_over_sample_catalog_keeps_stale_selection() {
    let mut state = ViewState::new(Arc::new(sample_catalog()));
    state.dispatch(AppCommand::SetCategory(CategoryFilter::Only(Category::Gui)));

    let ids: Vec<_> = state
        .visible_topics()
        .iter()
        .map(|topic| topic.id.as_str())
        .collect();
    assert_eq!(ids, vec!["b", "c"]);
    assert_eq!(state.selected_id().as_str(), "a");
    assert!(!state.selection_visible());
}

#[test]
fn run_then_switch_discards_first_completion() {
    let mut state = ViewState::new(Arc::new(sample_catalog()));
    let first = scheduled(state.dispatch(AppCommand::RunSelected));

    state.dispatch(AppCommand::SelectTopic(TopicId::from("c")));
    let events = state.dispatch(AppCommand::CompleteRun(first.clone()));
    assert_eq!(events, vec![AppEvent::RunDiscarded(first)]);
    assert_eq!(state.run_state(), RunState::Idle);

    let second = scheduled(state.dispatch(AppCommand::RunSelected));
    state.dispatch(AppCommand::CompleteRun(second));
    assert_eq!(state.console_output(), Some("Charlie"));
}

#[test]
fn copy_all_exports_only_visible_topics() {
    let mut state = ViewState::new(Arc::new(sample_catalog()));
    state.dispatch(AppCommand::SetCategory(CategoryFilter::Only(Category::Gui)));

    let text = visible_snippets_text(&state.visible_topics());
    assert!(text.starts_with("// Bravo\n"));
    assert!(text.contains("\n\n// Charlie\n"));
    assert!(!text.contains("Alpha"));
}

#[test]
fn faked_catalog_filter_invariants() -> Result<()> {
    let mut faker = TopicFaker::new(2026);
    let catalog = faker.catalog(120)?;

    for query in ["", "java", "RECORDS", "deep dive", "zzz"] {
        for category in CategoryFilter::ALL {
            let visible = filter_topics(catalog.topics(), query, category);
            let needle = query.to_lowercase();

            let positions: Vec<usize> = visible
                .iter()
                .map(|topic| {
                    catalog
                        .topics()
                        .iter()
                        .position(|candidate| candidate.id == topic.id)
                        .unwrap_or(usize::MAX)
                })
                .collect();
            assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

            for topic in catalog.topics() {
                let expected = category.admits(topic.category)
                    && (topic.title.to_lowercase().contains(&needle)
                        || topic.category.label().to_lowercase().contains(&needle));
                let shown = visible.iter().any(|candidate| candidate.id == topic.id);
                assert_eq!(shown, expected, "{} for {query:?}", topic.id);
            }
        }
    }
    Ok(())
}

#[test]
fn conversation_with_scripted_tutor_falls_back_on_failure() {
    let tutor = ScriptedTutor::answering(&["Records are immutable carriers."]);
    let mut chat = ConversationState::default();

    let first = ask(&mut chat, &tutor, "What is a record?");
    assert_eq!(first.content, "Records are immutable carriers.");

    let second = ask(&mut chat, &tutor, "And sealed?");
    assert_eq!(second.content, FAILURE_REPLY);

    let calls = tutor.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].history, vec![ChatMessage::assistant(GREETING)]);
    assert_eq!(calls[1].history.len(), 3);
    assert_eq!(chat.messages().len(), 5);
}

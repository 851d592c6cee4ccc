// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::error::ChatRejection;

pub const GREETING: &str = "Hi! I'm your Java Mentor. Ask me anything about Java 17/21/24, Swing, Networking, or Enterprise Java!";
pub const EMPTY_REPLY: &str = "I'm sorry, I couldn't process that Java question.";
pub const FAILURE_REPLY: &str =
    "Error: Could not reach the Java Mentor. Check console for details.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The external text-generation capability.
pub trait TutorClient {
    fn ask(&self, history: &[ChatMessage], question: &str) -> anyhow::Result<String>;

    /// Like `ask`, handing partial text to `on_chunk` as it arrives. The
    /// default delivers the whole answer as a single chunk.
    fn ask_streaming(
        &self,
        history: &[ChatMessage],
        question: &str,
        on_chunk: &mut dyn FnMut(&str),
    ) -> anyhow::Result<String> {
        let answer = self.ask(history, question)?;
        if !answer.is_empty() {
            on_chunk(&answer);
        }
        Ok(answer)
    }
}

/// A failed call, carrying the text shown to the user and the cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackText {
    pub text: String,
    pub cause: String,
}

impl FallbackText {
    pub fn from_error(error: &anyhow::Error) -> Self {
        Self {
            text: FAILURE_REPLY.to_owned(),
            cause: format!("{error:#}"),
        }
    }
}

pub type TutorReply = Result<String, FallbackText>;

/// Maps a raw tutor result to what the conversation shows: blank answers
/// become the apology and failures become the fallback text.
pub fn tutor_reply(result: anyhow::Result<String>) -> TutorReply {
    match result {
        Ok(answer) => Ok(normalize_answer(answer)),
        Err(error) => {
            log::warn!("tutor request failed: {error:#}");
            Err(FallbackText::from_error(&error))
        }
    }
}

pub fn ask_with_fallback<C>(client: &C, history: &[ChatMessage], question: &str) -> TutorReply
where
    C: TutorClient + ?Sized,
{
    tutor_reply(client.ask(history, question))
}

pub fn ask_streaming_with_fallback<C>(
    client: &C,
    history: &[ChatMessage],
    question: &str,
    on_chunk: &mut dyn FnMut(&str),
) -> TutorReply
where
    C: TutorClient + ?Sized,
{
    tutor_reply(client.ask_streaming(history, question, on_chunk))
}

pub fn normalize_answer(answer: String) -> String {
    if answer.trim().is_empty() {
        EMPTY_REPLY.to_owned()
    } else {
        answer
    }
}

/// An accepted question waiting for its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuestion {
    pub request_id: u64,
    pub question: String,
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    messages: Vec<ChatMessage>,
    pending: Option<u64>,
    draft: String,
    next_request_id: u64,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING)],
            pending: None,
            draft: String::new(),
            next_request_id: 0,
        }
    }
}

impl ConversationState {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_request(&self) -> Option<u64> {
        self.pending
    }

    /// Partial text streamed so far for the in-flight request.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Records the question and marks the conversation pending. The returned
    /// history is the conversation as it stood before the question.
    pub fn begin(&mut self, question: &str) -> Result<PendingQuestion, ChatRejection> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ChatRejection::EmptyQuestion);
        }
        if self.pending.is_some() {
            return Err(ChatRejection::Pending);
        }

        let history = self.messages.clone();
        self.messages.push(ChatMessage::user(question));
        let request_id = self.next_request_id();
        self.pending = Some(request_id);
        self.draft.clear();

        Ok(PendingQuestion {
            request_id,
            question: question.to_owned(),
            history,
        })
    }

    pub fn append_chunk(&mut self, request_id: u64, chunk: &str) -> bool {
        if self.pending != Some(request_id) {
            return false;
        }
        self.draft.push_str(chunk);
        true
    }

    /// Appends the reply (or its fallback text) and clears `pending`.
    /// Replies for any request other than the pending one are ignored.
    pub fn finish(&mut self, request_id: u64, reply: TutorReply) -> bool {
        if self.pending != Some(request_id) {
            return false;
        }

        let content = match reply {
            Ok(answer) => answer,
            Err(fallback) => fallback.text,
        };
        self.messages.push(ChatMessage::assistant(content));
        self.pending = None;
        self.draft.clear();
        true
    }

    fn next_request_id(&mut self) -> u64 {
        self.next_request_id = self.next_request_id.saturating_add(1);
        if self.next_request_id == 0 {
            self.next_request_id = 1;
        }
        self.next_request_id
    }
}

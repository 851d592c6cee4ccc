// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, Response};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Lines};
use std::time::Duration;
use time::OffsetDateTime;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";
pub const DEFAULT_MODEL: &str = "qwen3";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 0.95;

const MENTOR_INSTRUCTION: &str = "You are a World-Class Java Mentor. Help the user with their question about Java. Use Java 17+ conventions when possible. Be concise but deep.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamChunk {
    pub content: String,
    pub done: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    model: String,
    sampling: Sampling,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let base_url = validate_base_url(base_url)?;
        if model.trim().is_empty() {
            bail!("llm.model must not be empty");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            model: model.to_owned(),
            sampling: Sampling::default(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .http
            .get(format!("{}/models", self.base_url))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        let response = check_status(response)?;

        let parsed: ModelsResponse = response.json().context("decode model list")?;
        Ok(parsed.data.into_iter().map(|model| model.id).collect())
    }

    /// Confirms the endpoint answers and serves the configured model.
    pub fn ping(&self) -> Result<()> {
        let models = self.list_models()?;
        let exists = models
            .iter()
            .any(|name| name == &self.model || name.starts_with(&format!("{}:", self.model)));
        if !exists {
            bail!(
                "model {:?} not found -- pull it with `ollama pull {}`",
                self.model,
                self.model
            );
        }
        Ok(())
    }

    pub fn chat_complete(&self, messages: &[Message]) -> Result<String> {
        let response = self.post_chat(messages, false)?;
        let parsed: ChatCompletionResponse = response.json().context("decode chat response")?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| anyhow!("no choices in chat response"))?;
        Ok(content)
    }

    pub fn chat_stream(&self, messages: &[Message]) -> Result<ChatStream> {
        let response = self.post_chat(messages, true)?;
        Ok(ChatStream {
            done: false,
            lines: BufReader::new(response).lines(),
        })
    }

    fn post_chat(&self, messages: &[Message], stream: bool) -> Result<Response> {
        let request = ChatRequest::new(&self.model, messages, stream, self.sampling);
        log::debug!(
            "chat request to {} with {} messages (stream={stream})",
            self.base_url,
            messages.len()
        );
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        check_status(response)
    }
}

/// Server-sent event stream of `/chat/completions` deltas.
pub struct ChatStream {
    done: bool,
    lines: Lines<BufReader<Response>>,
}

impl ChatStream {
    /// Drains the stream and joins every delta.
    pub fn collect_text(self) -> Result<String> {
        let mut out = String::new();
        for chunk in self {
            out.push_str(&chunk?.content);
        }
        Ok(out)
    }
}

impl Iterator for ChatStream {
    type Item = Result<StreamChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let line = match self.lines.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Ok(line)) => line,
                Some(Err(error)) => {
                    self.done = true;
                    return Some(Err(error).context("read stream"));
                }
            };

            let trimmed = line.trim();
            let Some(payload) = trimmed.strip_prefix("data:") else {
                continue;
            };
            let payload = payload.trim_start();

            if payload == "[DONE]" {
                self.done = true;
                return Some(Ok(StreamChunk {
                    content: String::new(),
                    done: true,
                }));
            }

            let chunk: ChatCompletionChunk = match serde_json::from_str(payload) {
                Ok(chunk) => chunk,
                Err(error) => {
                    self.done = true;
                    return Some(Err(error).context("decode stream chunk"));
                }
            };

            let Some(choice) = chunk.choices.into_iter().next() else {
                continue;
            };

            let content = choice.delta.content.unwrap_or_default();
            let done = choice.finish_reason.is_some();
            if done {
                self.done = true;
            }

            if content.is_empty() && !done {
                continue;
            }

            return Some(Ok(StreamChunk { content, done }));
        }
    }
}

/// System prompt for the Java mentor.
pub fn build_tutor_prompt(now: OffsetDateTime, extra_context: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(MENTOR_INSTRUCTION);
    out.push('\n');
    out.push_str(&format!("Current date: {}\n", format_human_date(now)));
    if let Some(context) = extra_context
        && !context.trim().is_empty()
    {
        out.push_str("\n## Additional context\n\n");
        out.push_str(context.trim());
        out.push('\n');
    }
    out
}

/// Full request: system prompt, then prior turns in order, then the new
/// question as the final user turn.
pub fn tutor_conversation(system_prompt: &str, history: &[Message], question: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::new(Role::System, system_prompt));
    messages.extend(history.iter().cloned());
    messages.push(Message::new(Role::User, question));
    messages
}

fn format_human_date(now: OffsetDateTime) -> String {
    now.date()
        .format(&time::macros::format_description!(
            "[weekday repr:long], [month repr:long] [day], [year]"
        ))
        .unwrap_or_else(|_| now.date().to_string())
}

fn validate_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("llm.base_url must not be empty");
    }
    let parsed = Url::parse(trimmed).with_context(|| format!("llm.base_url {trimmed:?} is not a URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "llm.base_url must use http or https, got {:?}",
            parsed.scheme()
        );
    }
    Ok(trimmed.to_owned())
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(clean_error_response(status, &body))
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("request to {base_url} timed out ({error})");
    }
    anyhow!("cannot reach {base_url} -- start it with `ollama serve` ({error})")
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<OpenAIErrorEnvelope>(body)
        && let Some(error) = parsed.error
        && !error.message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), error.message);
    }

    if let Ok(parsed) = serde_json::from_str::<OllamaErrorEnvelope>(body)
        && let Some(error) = parsed.error
        && !error.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), error);
    }

    let body = body.trim();
    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
    temperature: f32,
    top_p: f32,
}

impl<'a> ChatRequest<'a> {
    fn new(model: &'a str, messages: &'a [Message], stream: bool, sampling: Sampling) -> Self {
        Self {
            model,
            messages: messages
                .iter()
                .map(|message| WireMessage {
                    role: message.role.as_str(),
                    content: &message.content,
                })
                .collect(),
            stream,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
        }
    }
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelRow>,
}

#[derive(Debug, Deserialize)]
struct ModelRow {
    id: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorEnvelope {
    error: Option<OpenAIErrorBody>,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorEnvelope {
    error: Option<String>,
}

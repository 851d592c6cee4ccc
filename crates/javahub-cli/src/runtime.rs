// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use javahub_app::{ChatMessage, PendingQuestion, Role, TutorClient, ask_streaming_with_fallback};
use javahub_llm::{Client, Message, build_tutor_prompt, tutor_conversation};
use javahub_tui::clipboard::{self, Passthrough};
use javahub_tui::{AppRuntime, InternalEvent, TutorEvent};
use std::io;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;

/// Java mentor backed by an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct LlmTutor {
    client: Client,
    system_prompt: String,
}

impl LlmTutor {
    pub fn new(client: Client, extra_context: &str) -> Self {
        Self {
            client,
            system_prompt: build_tutor_prompt(OffsetDateTime::now_utc(), Some(extra_context)),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn conversation(&self, history: &[ChatMessage], question: &str) -> Vec<Message> {
        let history = history.iter().map(wire_message).collect::<Vec<_>>();
        tutor_conversation(&self.system_prompt, &history, question)
    }
}

impl TutorClient for LlmTutor {
    fn ask(&self, history: &[ChatMessage], question: &str) -> Result<String> {
        self.client
            .chat_complete(&self.conversation(history, question))
    }

    fn ask_streaming(
        &self,
        history: &[ChatMessage],
        question: &str,
        on_chunk: &mut dyn FnMut(&str),
    ) -> Result<String> {
        let mut answer = String::new();
        for chunk in self.client.chat_stream(&self.conversation(history, question))? {
            let chunk = chunk?;
            if chunk.content.is_empty() {
                continue;
            }
            on_chunk(&chunk.content);
            answer.push_str(&chunk.content);
        }
        Ok(answer)
    }
}

fn wire_message(message: &ChatMessage) -> Message {
    let role = match message.role {
        Role::User => javahub_llm::Role::User,
        Role::Assistant => javahub_llm::Role::Assistant,
    };
    Message::new(role, message.content.clone())
}

pub struct TerminalRuntime {
    tutor: Option<LlmTutor>,
    run_delay: Duration,
    passthrough: Passthrough,
}

impl TerminalRuntime {
    pub fn new(tutor: Option<LlmTutor>, run_delay: Duration, passthrough: Passthrough) -> Self {
        Self {
            tutor,
            run_delay,
            passthrough,
        }
    }

    fn tutor(&self) -> Result<&LlmTutor> {
        match &self.tutor {
            Some(tutor) => Ok(tutor),
            None => bail!("mentor is disabled; set [llm].enabled = true to chat"),
        }
    }
}

impl AppRuntime for TerminalRuntime {
    fn run_delay(&self) -> Duration {
        self.run_delay
    }

    fn spawn_tutor_request(
        &mut self,
        pending: &PendingQuestion,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let tutor = self.tutor()?.clone();
        let PendingQuestion {
            request_id,
            question,
            history,
        } = pending.clone();

        thread::Builder::new()
            .name("javahub-tutor".to_owned())
            .spawn(move || {
                let mut forward = |chunk: &str| {
                    let _ = tx.send(InternalEvent::Tutor(TutorEvent::Chunk {
                        request_id,
                        chunk: chunk.to_owned(),
                    }));
                };
                let reply = ask_streaming_with_fallback(&tutor, &history, &question, &mut forward);
                let _ = tx.send(InternalEvent::Tutor(TutorEvent::Finished { request_id, reply }));
            })
            .context("spawn tutor request")?;
        Ok(())
    }

    fn copy_to_clipboard(&mut self, text: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        clipboard::write_osc52(&mut stdout, text, self.passthrough)
    }
}

#[cfg(test)]
mod tests {
    use super::{LlmTutor, TerminalRuntime};
    use anyhow::{Result, anyhow};
    use javahub_app::{
        ChatMessage, ConversationState, EMPTY_REPLY, FAILURE_REPLY, GREETING, TutorClient,
    };
    use javahub_llm::Client;
    use javahub_tui::clipboard::Passthrough;
    use javahub_tui::{AppRuntime, InternalEvent, TutorEvent};
    use std::io::Read;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use tiny_http::{Header, Response, Server};

    fn mock_server() -> Result<(Server, String)> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}/v1", server.server_addr());
        Ok((server, addr))
    }

    fn header(value: &str) -> Header {
        Header::from_bytes("Content-Type", value).expect("valid content type header")
    }

    fn collect_until_finished(rx: &mpsc::Receiver<InternalEvent>) -> Result<Vec<InternalEvent>> {
        let mut events = Vec::new();
        loop {
            let event = rx.recv_timeout(Duration::from_secs(5))?;
            let done = matches!(event, InternalEvent::Tutor(TutorEvent::Finished { .. }));
            events.push(event);
            if done {
                return Ok(events);
            }
        }
    }

    fn stream_response(server: Server, body: &'static str) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let request = server.recv().expect("request expected");
            let response = Response::from_string(body)
                .with_status_code(200)
                .with_header(header("text/event-stream"));
            request.respond(response).expect("response should succeed");
        })
    }

    #[test]
    fn ask_sends_prompt_history_then_question() -> Result<()> {
        let (server, addr) = mock_server()?;

        let handle = thread::spawn(move || {
            let mut request = server.recv().expect("request expected");
            let mut body = String::new();
            request
                .as_reader()
                .read_to_string(&mut body)
                .expect("request body");
            let payload: serde_json::Value = serde_json::from_str(&body).expect("json body");
            let messages = payload["messages"].as_array().expect("messages").clone();

            let response = Response::from_string(
                r#"{"choices":[{"message":{"role":"assistant","content":"Use records."}}]}"#,
            )
            .with_status_code(200)
            .with_header(header("application/json"));
            request.respond(response).expect("response should succeed");
            messages
        });

        let tutor = LlmTutor::new(
            Client::new(&addr, "qwen3", Duration::from_secs(1))?,
            "Prefer Java 21.",
        );
        let answer = tutor.ask(&[ChatMessage::assistant(GREETING)], "Model a point?")?;
        assert_eq!(answer, "Use records.");

        let messages = handle.join().expect("server thread should join");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "system");
        let system = messages[0]["content"].as_str().unwrap_or_default();
        assert!(system.starts_with("You are a World-Class Java Mentor."));
        assert!(system.contains("Prefer Java 21."));
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["content"], GREETING);
        assert_eq!(messages[2]["role"], "user");
        assert_eq!(messages[2]["content"], "Model a point?");
        Ok(())
    }

    #[test]
    fn spawned_request_streams_chunks_then_completes() -> Result<()> {
        let (server, addr) = mock_server()?;
        let handle = stream_response(
            server,
            concat!(
                "data: {\"choices\":[{\"delta\":{\"content\":\"Virtual \"},\"finish_reason\":null}]}\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"threads\"},\"finish_reason\":\"stop\"}]}\n",
                "data: [DONE]\n",
            ),
        );

        let tutor = LlmTutor::new(Client::new(&addr, "qwen3", Duration::from_secs(1))?, "");
        let mut runtime =
            TerminalRuntime::new(Some(tutor), Duration::from_millis(10), Passthrough::None);
        let mut conversation = ConversationState::default();
        let pending = conversation
            .begin("Loom?")
            .map_err(|error| anyhow!("{error}"))?;

        let (tx, rx) = mpsc::channel();
        runtime.spawn_tutor_request(&pending, tx)?;
        let events = collect_until_finished(&rx)?;
        handle.join().expect("server thread should join");

        let id = pending.request_id;
        assert_eq!(
            events,
            vec![
                InternalEvent::Tutor(TutorEvent::Chunk {
                    request_id: id,
                    chunk: "Virtual ".to_owned(),
                }),
                InternalEvent::Tutor(TutorEvent::Chunk {
                    request_id: id,
                    chunk: "threads".to_owned(),
                }),
                InternalEvent::Tutor(TutorEvent::Finished {
                    request_id: id,
                    reply: Ok("Virtual threads".to_owned()),
                }),
            ]
        );
        Ok(())
    }

    #[test]
    fn blank_streamed_answer_finishes_with_apology() -> Result<()> {
        let (server, addr) = mock_server()?;
        let handle = stream_response(
            server,
            concat!(
                "data: {\"choices\":[{\"delta\":{\"content\":\"  \"},\"finish_reason\":\"stop\"}]}\n",
                "data: [DONE]\n",
            ),
        );

        let tutor = LlmTutor::new(Client::new(&addr, "qwen3", Duration::from_secs(1))?, "");
        let mut runtime =
            TerminalRuntime::new(Some(tutor), Duration::from_millis(10), Passthrough::None);
        let mut conversation = ConversationState::default();
        let pending = conversation
            .begin("Say nothing")
            .map_err(|error| anyhow!("{error}"))?;

        let (tx, rx) = mpsc::channel();
        runtime.spawn_tutor_request(&pending, tx)?;
        let events = collect_until_finished(&rx)?;
        handle.join().expect("server thread should join");

        assert_eq!(
            events.last(),
            Some(&InternalEvent::Tutor(TutorEvent::Finished {
                request_id: pending.request_id,
                reply: Ok(EMPTY_REPLY.to_owned()),
            }))
        );
        Ok(())
    }

    #[test]
    fn unreachable_endpoint_reports_failure_event() -> Result<()> {
        let tutor = LlmTutor::new(
            Client::new("http://127.0.0.1:1/v1", "qwen3", Duration::from_millis(50))?,
            "",
        );
        let mut runtime =
            TerminalRuntime::new(Some(tutor), Duration::from_millis(10), Passthrough::None);
        let mut conversation = ConversationState::default();
        let pending = conversation
            .begin("anyone there?")
            .map_err(|error| anyhow!("{error}"))?;

        let (tx, rx) = mpsc::channel();
        runtime.spawn_tutor_request(&pending, tx)?;
        match rx.recv_timeout(Duration::from_secs(5))? {
            InternalEvent::Tutor(TutorEvent::Finished {
                request_id,
                reply: Err(fallback),
            }) => {
                assert_eq!(request_id, pending.request_id);
                assert_eq!(fallback.text, FAILURE_REPLY);
                assert!(
                    fallback.cause.contains("127.0.0.1:1"),
                    "unexpected error: {}",
                    fallback.cause
                );
            }
            other => panic!("expected failure, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn disabled_mentor_refuses_requests() {
        let mut runtime = TerminalRuntime::new(None, Duration::from_millis(10), Passthrough::None);
        let mut conversation = ConversationState::default();
        let pending = conversation.begin("hello").expect("question accepted");

        let (tx, rx) = mpsc::channel();
        let error = runtime
            .spawn_tutor_request(&pending, tx)
            .expect_err("disabled mentor should fail");
        assert!(error.to_string().contains("[llm].enabled"));
        assert!(rx.try_recv().is_err());
        assert_eq!(runtime.run_delay(), Duration::from_millis(10));
    }
}

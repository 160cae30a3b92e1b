// src/services/conversation.rs
//! Chat log state machine.
//!
//! [`Conversation`] is a pure reducer: [`Conversation::apply`] takes an
//! [`Event`] and returns the [`Command`] the caller must run, if any.
//! [`ChatSession`] wires it to a [`ChatBackend`].

use std::fmt;
use std::time::Instant;

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ClientError;
use crate::services::client::ChatBackend;

pub const GREETING: &str = "Greetings! 👋\n\nReady to dive in? Choose a question to get started!";

pub const SUGGESTED_QUESTIONS: [&str; 3] = [
    "What is Humanoid Robotics?",
    "What are the main topics covered?",
    "How do I access the resources?",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Clone, Debug)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: Instant,
}

impl Message {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            role,
            content: content.into(),
            timestamp: Instant::now(),
        }
    }
}

/// Correlates a backend reply with the submission that caused it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Submit(String),
    Resolved {
        request: RequestId,
        outcome: Result<String, ClientError>,
    },
}

/// Side effect requested by a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    SendChat { request: RequestId, query: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingResponse(RequestId),
}

#[derive(Clone, Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    phase: Phase,
    next_request: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Fresh log holding only the greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![Message::new(MessageRole::Assistant, GREETING)],
            phase: Phase::Idle,
            next_request: 1,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_awaiting_response(&self) -> bool {
        matches!(self.phase, Phase::AwaitingResponse(_))
    }

    /// Suggested prompts, shown only before the first exchange.
    pub fn suggestions(&self) -> &'static [&'static str] {
        if self.messages.len() == 1 && !self.is_awaiting_response() {
            &SUGGESTED_QUESTIONS
        } else {
            &[]
        }
    }

    pub fn apply(&mut self, event: Event) -> Option<Command> {
        match event {
            Event::Submit(text) => self.submit(text),
            Event::Resolved { request, outcome } => {
                self.resolve(request, outcome);
                None
            }
        }
    }

    fn submit(&mut self, text: String) -> Option<Command> {
        if text.trim().is_empty() {
            return None;
        }
        if let Phase::AwaitingResponse(pending) = self.phase {
            debug!(%pending, "submit ignored, request already in flight");
            return None;
        }

        let request = RequestId(self.next_request);
        self.next_request += 1;
        self.messages.push(Message::new(MessageRole::User, text.clone()));
        self.phase = Phase::AwaitingResponse(request);
        Some(Command::SendChat { request, query: text })
    }

    fn resolve(&mut self, request: RequestId, outcome: Result<String, ClientError>) {
        match self.phase {
            Phase::AwaitingResponse(pending) if pending == request => {}
            _ => {
                debug!(%request, "discarding stale response");
                return;
            }
        }

        let content = match outcome {
            Ok(answer) => answer,
            Err(err) => error_reply(&err),
        };
        self.messages.push(Message::new(MessageRole::Assistant, content));
        self.phase = Phase::Idle;
    }
}

/// Text shown in the log when a turn fails.
pub fn error_reply(err: &ClientError) -> String {
    format!("Sorry, I encountered an error: {err}. Please try again.")
}

/// Owns a [`Conversation`] and runs its commands against a backend.
pub struct ChatSession<B> {
    backend: B,
    conversation: Conversation,
    chapter_slug: Option<String>,
}

impl<B: ChatBackend> ChatSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            conversation: Conversation::new(),
            chapter_slug: None,
        }
    }

    /// Scope every question to one chapter.
    pub fn with_chapter(mut self, chapter_slug: impl Into<String>) -> Self {
        self.chapter_slug = Some(chapter_slug.into());
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Submit one turn and wait for its reply.
    ///
    /// Returns the assistant message appended, or `None` when the input was
    /// blank or a request was already in flight.
    pub async fn submit(&mut self, text: &str) -> Option<&Message> {
        let Command::SendChat { request, query } =
            self.conversation.apply(Event::Submit(text.to_string()))?;

        info!(%request, "sending chat turn");
        let outcome = self
            .backend
            .send_chat_message(&query, None, self.chapter_slug.as_deref())
            .await
            .map(|response| response.answer);

        self.conversation.apply(Event::Resolved { request, outcome });
        self.conversation.messages().last()
    }

    /// Submit one of the suggested prompts by index.
    pub async fn submit_suggestion(&mut self, index: usize) -> Option<&Message> {
        let question = *self.conversation.suggestions().get(index)?;
        self.submit(question).await
    }
}

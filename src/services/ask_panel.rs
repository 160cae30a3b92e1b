// src/services/ask_panel.rs
use tracing::{info, warn};

use crate::error::ClientError;
use crate::message::{AskSelectionResponse, SelectionContext};
use crate::services::client::ChatBackend;
use crate::services::selection::{SelectionSource, SelectionTracker};

pub const MAX_QUESTION_CHARS: usize = 500;
pub const EMPTY_QUESTION_ERROR: &str = "Please enter a question";

/// The "Ask AI about Selection" form.
///
/// Holds its own copy of the selected text: the live selection may be gone
/// by the time the question is submitted.
#[derive(Debug, Clone, Default)]
pub struct AskPanel {
    selected_text: String,
    chapter_slug: Option<String>,
    question: String,
    answer: Option<String>,
    contexts: Vec<SelectionContext>,
    error: Option<String>,
    loading: bool,
}

impl AskPanel {
    pub fn open(selected_text: impl Into<String>) -> Self {
        Self {
            selected_text: selected_text.into(),
            ..Self::default()
        }
    }

    /// Open from the tracker's current state. `None` if nothing is selected.
    pub fn from_tracker(tracker: &SelectionTracker) -> Option<Self> {
        tracker.snapshot().map(Self::open)
    }

    pub fn with_chapter(mut self, chapter_slug: impl Into<String>) -> Self {
        self.chapter_slug = Some(chapter_slug.into());
        self
    }

    pub fn selected_text(&self) -> &str {
        &self.selected_text
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn contexts(&self) -> &[SelectionContext] {
        &self.contexts
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Replace the question, keeping at most [`MAX_QUESTION_CHARS`].
    pub fn set_question(&mut self, question: &str) {
        self.question = question.chars().take(MAX_QUESTION_CHARS).collect();
    }

    /// Validate and mark loading. Returns the question to send, or `None`
    /// when the input was rejected or a request is already running.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.loading {
            return None;
        }
        if self.question.trim().is_empty() {
            self.error = Some(EMPTY_QUESTION_ERROR.to_string());
            return None;
        }
        self.loading = true;
        self.error = None;
        Some(self.question.clone())
    }

    pub fn finish_submit(&mut self, outcome: Result<AskSelectionResponse, ClientError>) {
        self.loading = false;
        match outcome {
            Ok(response) => {
                self.answer = Some(response.answer);
                self.contexts = response.contexts.unwrap_or_default();
            }
            Err(err) => {
                warn!(error = %err, "ask-selection failed");
                self.error = Some(err.to_string());
            }
        }
    }

    pub async fn submit<B: ChatBackend>(&mut self, backend: &B) {
        let Some(question) = self.begin_submit() else {
            return;
        };
        info!(chars = self.selected_text.chars().count(), "asking about selection");
        let outcome = backend
            .ask_selection(&self.selected_text, &question, self.chapter_slug.as_deref())
            .await;
        self.finish_submit(outcome);
    }

    /// Dismiss the panel and drop the document selection with it.
    pub fn close<S: SelectionSource + ?Sized>(self, tracker: &SelectionTracker, source: &mut S) {
        tracker.clear_selection(source);
    }
}

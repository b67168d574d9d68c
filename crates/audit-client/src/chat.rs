//! Document-scoped chat transcript
//!
//! A session is either idle or awaiting one backend reply. The transcript is
//! persisted after every change under `chatMessages_<id>` and reloaded when
//! the session is opened.

use tracing::{debug, warn};

use audit_types::{ChatMessage, ChatRequest};

use crate::backend::AuditBackend;
use crate::error::{ClientError, Result};
use crate::storage::{keys, load_json, save_json, KeyValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatPhase {
    #[default]
    Idle,
    AwaitingResponse,
}

pub struct ChatSession<S> {
    document_id: String,
    store: S,
    transcript: Vec<ChatMessage>,
    phase: ChatPhase,
    input: String,
}

impl<S: KeyValueStore> ChatSession<S> {
    /// Open the session for `document_id`, restoring any saved transcript
    pub fn open(document_id: impl Into<String>, store: S) -> Self {
        let document_id = document_id.into();
        let transcript = match load_json(&store, &keys::chat_transcript(&document_id)) {
            Ok(Some(messages)) => messages,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(document = %document_id, "Ignoring unreadable chat transcript: {}", e);
                Vec::new()
            }
        };

        Self {
            document_id,
            store,
            transcript,
            phase: ChatPhase::Idle,
            input: String::new(),
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn is_awaiting(&self) -> bool {
        self.phase == ChatPhase::AwaitingResponse
    }

    /// Input and send control are disabled while a reply is pending
    pub fn can_send(&self) -> bool {
        self.phase == ChatPhase::Idle
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Send the current input buffer
    pub fn submit_input(&mut self) -> Result<Option<ChatRequest>> {
        let input = self.input.clone();
        self.begin_send(&input)
    }

    /// Append the user's turn and build the request for it.
    ///
    /// Blank input is ignored (`Ok(None)`). While a reply is pending the
    /// call fails with [`ClientError::Busy`] and nothing changes.
    pub fn begin_send(&mut self, text: &str) -> Result<Option<ChatRequest>> {
        let query = text.trim();
        if query.is_empty() {
            return Ok(None);
        }
        if self.is_awaiting() {
            return Err(ClientError::Busy);
        }

        self.transcript.push(ChatMessage::user(query));
        self.persist();
        self.input.clear();
        self.phase = ChatPhase::AwaitingResponse;

        debug!(document = %self.document_id, turns = self.transcript.len(), "Sending chat message");
        Ok(Some(ChatRequest {
            id: self.document_id.clone(),
            query: query.to_string(),
            history: self.transcript.clone(),
        }))
    }

    /// Record the reply, or the fallback message if the request failed.
    /// A reply with no message awaiting it is dropped and yields `None`.
    pub fn complete(&mut self, reply: Result<String>) -> Option<&ChatMessage> {
        if !self.is_awaiting() {
            warn!(document = %self.document_id, "Dropping chat reply that arrived while idle");
            return None;
        }

        let message = match reply {
            Ok(text) => ChatMessage::assistant(text),
            Err(e) => {
                warn!(document = %self.document_id, "Error sending chat message: {}", e);
                ChatMessage::fallback()
            }
        };
        self.transcript.push(message);
        self.persist();
        self.phase = ChatPhase::Idle;

        self.transcript.last()
    }

    /// Send `text` and wait for the reply.
    ///
    /// Backend failures are absorbed into the fallback message; only blank
    /// input (`Ok(None)`) and a pending reply (`Busy`) are reported.
    pub async fn send<B: AuditBackend + ?Sized>(
        &mut self,
        backend: &B,
        text: &str,
    ) -> Result<Option<&ChatMessage>> {
        let Some(request) = self.begin_send(text)? else {
            return Ok(None);
        };
        let reply = backend.chat(&request).await;
        Ok(self.complete(reply))
    }

    /// Empty the transcript and delete its saved copy
    pub fn clear(&mut self) {
        self.transcript.clear();
        if let Err(e) = self.store.remove(&keys::chat_transcript(&self.document_id)) {
            warn!(document = %self.document_id, "Failed to clear chat transcript: {}", e);
        }
    }

    fn persist(&self) {
        let key = keys::chat_transcript(&self.document_id);
        if let Err(e) = save_json(&self.store, &key, &self.transcript) {
            warn!(document = %self.document_id, "Failed to save chat transcript: {}", e);
        }
    }
}

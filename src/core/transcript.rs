//! Persisted chat transcript.
//!
//! The whole log is re-encoded and written on every append. Transcripts stay
//! small enough that the overwrite is cheaper than any incremental format.

use tracing::warn;

use crate::core::message::ChatMessage;
use crate::core::storage::{SharedStore, StorageError, KEY_CHAT_HISTORY};

/// How [`TranscriptStore::load_or_init`] populated the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptLoad {
    /// Persisted entries were replayed.
    Restored(usize),
    /// Nothing usable was stored; the greeting was seeded.
    Seeded,
}

pub struct TranscriptStore {
    storage: SharedStore,
    messages: Vec<ChatMessage>,
}

impl TranscriptStore {
    pub fn new(storage: SharedStore) -> Self {
        Self {
            storage,
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Replay the stored log, or seed the greeting when it is absent, empty
    /// or unreadable.
    pub fn load_or_init(&mut self) -> Result<TranscriptLoad, StorageError> {
        self.messages = self.read_persisted();
        if self.messages.is_empty() {
            self.append(ChatMessage::greeting())?;
            return Ok(TranscriptLoad::Seeded);
        }
        Ok(TranscriptLoad::Restored(self.messages.len()))
    }

    /// Read the stored log without writing anything; an empty log shows
    /// just the greeting.
    pub fn load_read_only(&mut self) {
        self.messages = self.read_persisted();
        if self.messages.is_empty() {
            self.messages.push(ChatMessage::greeting());
        }
    }

    /// Append and persist. On a write error the entry stays in memory so the
    /// session keeps showing it.
    pub fn append(&mut self, message: ChatMessage) -> Result<usize, StorageError> {
        self.messages.push(message);
        self.persist()?;
        Ok(self.messages.len() - 1)
    }

    /// Drop every entry, then seed the greeting again. The greeting is
    /// seeded even when removing the stored log fails; the first storage
    /// error is returned.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        let removed = self.storage.remove(KEY_CHAT_HISTORY);
        self.messages = vec![ChatMessage::greeting()];
        let seeded = self.persist();
        removed.and(seeded)
    }

    fn read_persisted(&self) -> Vec<ChatMessage> {
        let Some(raw) = self.storage.get(KEY_CHAT_HISTORY) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<ChatMessage>>(&raw) {
            Ok(messages) => messages,
            Err(err) => {
                warn!(error = %err, "discarding malformed chat history");
                Vec::new()
            }
        }
    }

    fn persist(&self) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(&self.messages).map_err(StorageError::Encode)?;
        self.storage.set(KEY_CHAT_HISTORY, &encoded)
    }
}

//! Application state for an interactive session.
//!
//! [`App`] owns every piece of mutable state: preferences, the transcript,
//! UI state and the endpoint session. All mutation goes through
//! [`apply_action`], which returns the render effects the view must apply
//! and, optionally, a background command for the event loop.

use reqwest::Client;
use tracing::error;

use crate::core::catalog::{filter_topics, Topic};
use crate::core::preferences::PreferenceStore;
use crate::core::storage::{SharedStore, StorageError};
use crate::core::transcript::{TranscriptLoad, TranscriptStore};

pub mod actions;
pub mod session;
pub mod ui_state;

pub use actions::{apply_action, apply_actions, ActionOutcome, AppAction, AppCommand, UiEffect};
pub use session::SessionContext;
pub use ui_state::{UiFocus, UiState};

pub struct App {
    pub prefs: PreferenceStore,
    pub transcript: TranscriptStore,
    pub ui: UiState,
    pub session: SessionContext,
}

impl App {
    pub fn new(storage: SharedStore, endpoint: String, client: Client) -> Self {
        Self {
            prefs: PreferenceStore::load(storage.clone()),
            transcript: TranscriptStore::new(storage),
            ui: UiState::new(),
            session: SessionContext::new(endpoint, client),
        }
    }

    /// Load the transcript (seeding the greeting if needed) and return the
    /// effects that paint the initial view.
    pub fn initialize(&mut self) -> Vec<UiEffect> {
        match self.transcript.load_or_init() {
            Ok(TranscriptLoad::Restored(count)) => {
                tracing::debug!(count, "restored chat history");
            }
            Ok(TranscriptLoad::Seeded) => {}
            Err(err) => self.report_storage_error(&err),
        }
        vec![
            UiEffect::Restyle,
            UiEffect::ResetTranscript(self.transcript.messages().to_vec()),
            UiEffect::RefreshTopics,
            UiEffect::RefreshFavorites,
            UiEffect::ScrollToBottom,
        ]
    }

    pub fn visible_topics(&self) -> Vec<(&'static str, Vec<Topic>)> {
        filter_topics(&self.ui.search_query)
    }

    pub fn visible_topic_count(&self) -> usize {
        self.visible_topics()
            .iter()
            .map(|(_, topics)| topics.len())
            .sum()
    }

    pub fn highlighted_topic(&self) -> Option<Topic> {
        self.visible_topics()
            .into_iter()
            .flat_map(|(_, topics)| topics)
            .nth(self.ui.topic_cursor)
    }

    /// Keep the topic cursor inside the filtered list.
    pub fn clamp_topic_cursor(&mut self) {
        let count = self.visible_topic_count();
        self.ui.topic_cursor = self.ui.topic_cursor.min(count.saturating_sub(1));
    }

    pub(crate) fn report_storage_error(&mut self, err: &StorageError) {
        error!(error = %err, "failed to persist state");
        self.ui.set_status(format!("Storage error: {err}"));
    }
}

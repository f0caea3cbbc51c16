use tracing::{debug, warn};

use super::App;
use crate::core::chat_stream::{StreamMessage, StreamParams};
use crate::core::message::{ChatMessage, ERROR_REPLY};
use crate::core::storage::StorageError;

pub enum AppAction {
    /// Send the trimmed contents of the input box.
    SubmitInput,
    /// Ask a question on the user's behalf (topic cards, CLI).
    Ask {
        question: String,
    },
    SelectTopic {
        name: String,
    },
    SelectFavorite {
        index: usize,
    },
    ActivateHighlightedTopic,
    ToggleFavorite {
        name: String,
    },
    ToggleHighlightedFavorite,
    ToggleTheme,
    ChangeFontSize {
        delta: i32,
    },
    ClearHistory,
    NewChat,
    OpenPanel,
    ClosePanel,
    TogglePanel,
    CycleFocus,
    SetSearchQuery {
        query: String,
    },
    MoveTopicCursor {
        delta: i32,
    },
    StreamStarted {
        stream_id: u64,
    },
    AppendResponseChunk {
        content: String,
        stream_id: u64,
    },
    StreamCompleted {
        stream_id: u64,
    },
    StreamErrored {
        message: String,
        stream_id: u64,
    },
}

impl AppAction {
    pub fn from_stream(message: StreamMessage, stream_id: u64) -> Self {
        match message {
            StreamMessage::Started => AppAction::StreamStarted { stream_id },
            StreamMessage::Chunk(content) => AppAction::AppendResponseChunk { content, stream_id },
            StreamMessage::Error(message) => AppAction::StreamErrored { message, stream_id },
            StreamMessage::End => AppAction::StreamCompleted { stream_id },
        }
    }
}

/// View updates produced by an action, applied in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Replace every transcript entry (startup and clear).
    ResetTranscript(Vec<ChatMessage>),
    /// Render one new persisted entry after the existing ones.
    AppendEntry(ChatMessage),
    ShowTyping,
    HideTyping,
    /// Add the empty, unpersisted entry that a stream fills in.
    BeginPendingReply,
    /// Re-render the pending entry from the full text received so far.
    UpdatePendingReply(String),
    /// Replace the pending entry's text; it stays on screen but was never
    /// persisted.
    FailPendingReply(String),
    /// The pending entry is now this persisted message.
    CommitPendingReply(ChatMessage),
    ScrollToBottom,
    /// Theme or font size changed; every entry must be re-rendered.
    Restyle,
    RefreshTopics,
    RefreshFavorites,
}

pub enum AppCommand {
    SpawnStream(StreamParams),
}

#[derive(Default)]
pub struct ActionOutcome {
    pub effects: Vec<UiEffect>,
    pub command: Option<AppCommand>,
}

impl ActionOutcome {
    fn effects(effects: impl IntoIterator<Item = UiEffect>) -> Self {
        Self {
            effects: effects.into_iter().collect(),
            command: None,
        }
    }
}

pub fn apply_actions(
    app: &mut App,
    actions: impl IntoIterator<Item = AppAction>,
) -> ActionOutcome {
    let mut combined = ActionOutcome::default();
    for action in actions {
        let outcome = apply_action(app, action);
        combined.effects.extend(outcome.effects);
        if outcome.command.is_some() {
            combined.command = outcome.command;
        }
    }
    combined
}

pub fn apply_action(app: &mut App, action: AppAction) -> ActionOutcome {
    match action {
        AppAction::SubmitInput => {
            let text = app.ui.input_text().trim().to_string();
            if text.is_empty() {
                return ActionOutcome::default();
            }
            app.ui.clear_input();
            ask_question(app, text)
        }
        AppAction::Ask { question } => {
            let question = question.trim().to_string();
            if question.is_empty() {
                return ActionOutcome::default();
            }
            ask_question(app, question)
        }
        AppAction::SelectTopic { name } => ask_question(app, name),
        AppAction::SelectFavorite { index } => match app.prefs.favorites().get(index).cloned() {
            Some(name) => ask_question(app, name),
            None => ActionOutcome::default(),
        },
        AppAction::ActivateHighlightedTopic => match app.highlighted_topic() {
            Some(topic) => ask_question(app, topic.name.to_string()),
            None => ActionOutcome::default(),
        },
        AppAction::ToggleFavorite { name } => toggle_favorite(app, &name),
        // The highlighted row is only meaningful while the panel shows it.
        AppAction::ToggleHighlightedFavorite if !app.ui.panel_open => ActionOutcome::default(),
        AppAction::ToggleHighlightedFavorite => match app.highlighted_topic() {
            Some(topic) => toggle_favorite(app, topic.name),
            None => ActionOutcome::default(),
        },
        AppAction::ToggleTheme => {
            let result = app.prefs.toggle_theme();
            persist_or_report(app, result.map(|_| ()));
            app.ui
                .set_status(format!("Theme: {}", app.prefs.theme()));
            ActionOutcome::effects([UiEffect::Restyle])
        }
        AppAction::ChangeFontSize { delta } => {
            let result = app.prefs.change_font_size(delta);
            persist_or_report(app, result.map(|_| ()));
            app.ui
                .set_status(format!("Font size: {}px", app.prefs.font_size_px()));
            ActionOutcome::effects([UiEffect::Restyle, UiEffect::ScrollToBottom])
        }
        AppAction::ClearHistory | AppAction::NewChat => clear_history(app),
        AppAction::OpenPanel => {
            app.ui.panel_open = true;
            ActionOutcome::effects([UiEffect::RefreshTopics])
        }
        AppAction::ClosePanel => {
            close_panel(app);
            ActionOutcome::default()
        }
        AppAction::TogglePanel => {
            if app.ui.panel_open {
                close_panel(app);
                ActionOutcome::default()
            } else {
                app.ui.panel_open = true;
                ActionOutcome::effects([UiEffect::RefreshTopics])
            }
        }
        AppAction::CycleFocus => {
            app.ui.cycle_focus();
            ActionOutcome::default()
        }
        AppAction::SetSearchQuery { query } => {
            app.ui.search_query = query;
            app.ui.topic_cursor = 0;
            ActionOutcome::effects([UiEffect::RefreshTopics])
        }
        AppAction::MoveTopicCursor { delta } => {
            let count = app.visible_topic_count();
            if count == 0 {
                app.ui.topic_cursor = 0;
            } else {
                let next = app.ui.topic_cursor as i64 + delta as i64;
                app.ui.topic_cursor = next.clamp(0, count as i64 - 1) as usize;
            }
            ActionOutcome::default()
        }
        AppAction::StreamStarted { stream_id } => {
            if !app.session.is_current_stream(stream_id) {
                return ActionOutcome::default();
            }
            let mut effects = Vec::new();
            if app.ui.typing {
                app.ui.typing = false;
                effects.push(UiEffect::HideTyping);
            }
            app.ui.pending_reply = Some(String::new());
            effects.push(UiEffect::BeginPendingReply);
            effects.push(UiEffect::ScrollToBottom);
            ActionOutcome::effects(effects)
        }
        AppAction::AppendResponseChunk { content, stream_id } => {
            if !app.session.is_current_stream(stream_id) {
                return ActionOutcome::default();
            }
            let Some(pending) = app.ui.pending_reply.as_mut() else {
                warn!(stream_id, "chunk received without a pending reply");
                return ActionOutcome::default();
            };
            pending.push_str(&content);
            let full = pending.clone();
            ActionOutcome::effects([
                UiEffect::UpdatePendingReply(full),
                UiEffect::ScrollToBottom,
            ])
        }
        AppAction::StreamCompleted { stream_id } => {
            if !app.session.is_current_stream(stream_id) {
                return ActionOutcome::default();
            }
            finalize_stream(app)
        }
        AppAction::StreamErrored { message, stream_id } => {
            if !app.session.is_current_stream(stream_id) {
                return ActionOutcome::default();
            }
            handle_stream_error(app, &message)
        }
    }
}

fn persist_or_report(app: &mut App, result: Result<(), StorageError>) {
    if let Err(err) = result {
        app.report_storage_error(&err);
    }
}

fn append_message(app: &mut App, message: ChatMessage) -> UiEffect {
    let result = app.transcript.append(message.clone());
    persist_or_report(app, result.map(|_| ()));
    UiEffect::AppendEntry(message)
}

/// Record the user's question, show the typing placeholder, and ask the
/// loop to start streaming the answer.
fn ask_question(app: &mut App, question: String) -> ActionOutcome {
    let mut effects = vec![append_message(app, ChatMessage::user(question.clone()))];

    // A reply still streaming is abandoned where it stands.
    if app.ui.pending_reply.take().is_some() {
        effects.push(UiEffect::FailPendingReply(ERROR_REPLY.to_string()));
    }
    if !app.ui.typing {
        app.ui.typing = true;
        effects.push(UiEffect::ShowTyping);
    }
    effects.push(UiEffect::ScrollToBottom);

    let params = app.session.stream_parameters(question);
    debug!(stream_id = params.stream_id, "asking question");
    ActionOutcome {
        effects,
        command: Some(AppCommand::SpawnStream(params)),
    }
}

fn finalize_stream(app: &mut App) -> ActionOutcome {
    let mut effects = Vec::new();
    if app.ui.typing {
        app.ui.typing = false;
        effects.push(UiEffect::HideTyping);
    }
    if let Some(text) = app.ui.pending_reply.take() {
        let message = ChatMessage::bot(text);
        let result = app.transcript.append(message.clone());
        persist_or_report(app, result.map(|_| ()));
        effects.push(UiEffect::CommitPendingReply(message));
        effects.push(UiEffect::ScrollToBottom);
    }
    app.session.retire_stream();
    ActionOutcome::effects(effects)
}

fn handle_stream_error(app: &mut App, message: &str) -> ActionOutcome {
    warn!(error = %message, "assistant reply failed");
    let mut effects = Vec::new();
    if app.ui.typing {
        app.ui.typing = false;
        effects.push(UiEffect::HideTyping);
    }
    if app.ui.pending_reply.take().is_some() {
        effects.push(UiEffect::FailPendingReply(ERROR_REPLY.to_string()));
    } else {
        effects.push(append_message(app, ChatMessage::bot(ERROR_REPLY)));
    }
    effects.push(UiEffect::ScrollToBottom);
    app.session.retire_stream();
    ActionOutcome::effects(effects)
}

fn toggle_favorite(app: &mut App, name: &str) -> ActionOutcome {
    match app.prefs.toggle_favorite(name) {
        Ok(true) => app.ui.set_status(format!("Added to favorites: {name}")),
        Ok(false) => app.ui.set_status(format!("Removed from favorites: {name}")),
        Err(err) => app.report_storage_error(&err),
    }
    ActionOutcome::effects([UiEffect::RefreshFavorites, UiEffect::RefreshTopics])
}

fn clear_history(app: &mut App) -> ActionOutcome {
    app.session.retire_stream();
    app.ui.typing = false;
    app.ui.pending_reply = None;
    let result = app.transcript.clear();
    persist_or_report(app, result);
    ActionOutcome::effects([
        UiEffect::ResetTranscript(app.transcript.messages().to_vec()),
        UiEffect::ScrollToBottom,
    ])
}

fn close_panel(app: &mut App) {
    app.ui.panel_open = false;
    if app.ui.focus != super::UiFocus::Input {
        app.ui.focus = super::UiFocus::Input;
    }
}

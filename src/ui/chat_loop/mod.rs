//! Main chat event loop
//!
//! [`ChatSession`] owns the application state and the two view caches. Key
//! presses and stream messages both become [`AppAction`]s; the resulting
//! effects are applied to the views and any spawn command is handed to the
//! stream service.

mod keybindings;
mod lifecycle;

pub use self::keybindings::{KeyBindings, KeyCommand, KeyContext, KeyPattern};
pub use self::lifecycle::{restore_terminal, setup_terminal, ChatTerminal};

use crate::core::app::{apply_action, App, AppAction, AppCommand, UiEffect, UiFocus};
use crate::core::chat_stream::{ChatStreamService, StreamMessage};
use crate::ui::chat_view::ChatView;
use crate::ui::panel::PanelView;
use crate::ui::renderer::{frame_layout, ui};
use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind,
};
use ratatui::layout::Rect;
use std::{error::Error, time::Duration};
use tokio::sync::mpsc;
use tracing::debug;
use tui_textarea::Input as TAInput;

const MOUSE_SCROLL_LINES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLoopAction {
    Continue,
    Break,
}

pub struct ChatSession {
    pub app: App,
    pub chat: ChatView,
    pub panel: PanelView,
    bindings: KeyBindings,
    stream_service: ChatStreamService,
    stream_rx: mpsc::UnboundedReceiver<(StreamMessage, u64)>,
}

impl ChatSession {
    pub fn new(app: App) -> Self {
        let (stream_service, stream_rx) = ChatStreamService::new();
        let mut session = Self {
            chat: ChatView::new(app.prefs.preferences()),
            panel: PanelView::new(),
            bindings: KeyBindings::new(),
            stream_service,
            stream_rx,
            app,
        };
        let effects = session.app.initialize();
        session.apply_effects(effects);
        session
    }

    pub fn dispatch(&mut self, action: AppAction) {
        let outcome = apply_action(&mut self.app, action);
        self.apply_effects(outcome.effects);
        if let Some(AppCommand::SpawnStream(params)) = outcome.command {
            debug!(stream_id = params.stream_id, "spawning stream");
            self.stream_service.spawn_stream(params);
        }
    }

    fn apply_effects(&mut self, effects: Vec<UiEffect>) {
        let prefs = self.app.prefs.preferences();
        for effect in effects {
            if effect == UiEffect::RefreshTopics {
                self.app.clamp_topic_cursor();
            }
            self.panel.apply(&effect, &self.app);
            self.chat.apply(effect, prefs);
        }
    }

    /// Apply every stream message that has already arrived.
    pub fn drain_stream_messages(&mut self) -> usize {
        let mut handled = 0;
        while let Ok((message, stream_id)) = self.stream_rx.try_recv() {
            self.dispatch(AppAction::from_stream(message, stream_id));
            handled += 1;
        }
        handled
    }

    pub fn handle_key(&mut self, key: &KeyEvent, area: Rect) -> KeyLoopAction {
        let context = KeyContext::from(self.app.ui.focus);
        let command = self.bindings.resolve(context, key);
        let (width, height) = frame_layout(area, &self.app, &self.panel).chat_viewport();
        let page = usize::from(height.saturating_sub(1).max(1));

        match command {
            KeyCommand::Quit => return KeyLoopAction::Break,
            KeyCommand::ScrollLines(delta) if delta < 0 => {
                self.chat
                    .scroll_up(delta.unsigned_abs() as usize, width, height)
            }
            KeyCommand::ScrollLines(delta) => self.chat.scroll_down(delta as usize, width, height),
            KeyCommand::PageUp => self.chat.scroll_up(page, width, height),
            KeyCommand::PageDown => self.chat.scroll_down(page, width, height),
            KeyCommand::ScrollTop => self.chat.scroll_to_top(),
            KeyCommand::ScrollBottom => self.chat.scroll_to_bottom(),
            KeyCommand::Edit => self.edit(context, key),
            other => {
                if let Some(action) = other.into_action() {
                    self.dispatch(action);
                }
            }
        }
        KeyLoopAction::Continue
    }

    fn edit(&mut self, context: KeyContext, key: &KeyEvent) {
        match context {
            KeyContext::Input => {
                self.app.ui.apply_textarea_edit(|ta| {
                    ta.input(TAInput::from(*key));
                });
            }
            KeyContext::Search => {
                let mut query = self.app.ui.search_query.clone();
                match key.code {
                    KeyCode::Char(c)
                        if !key
                            .modifiers
                            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                    {
                        query.push(c)
                    }
                    KeyCode::Backspace => {
                        if query.pop().is_none() {
                            return;
                        }
                    }
                    _ => return,
                }
                self.dispatch(AppAction::SetSearchQuery { query });
            }
            KeyContext::Topics => {}
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        match self.app.ui.focus {
            UiFocus::Input => {
                let text = text.replace("\r\n", "\n").replace('\r', "\n");
                self.app.ui.apply_textarea_edit(|ta| {
                    ta.insert_str(&text);
                });
            }
            UiFocus::Search => {
                let query = format!(
                    "{}{}",
                    self.app.ui.search_query,
                    text.replace(['\r', '\n'], " ")
                );
                self.dispatch(AppAction::SetSearchQuery { query });
            }
            UiFocus::Topics => {}
        }
    }

    pub fn handle_mouse(&mut self, kind: MouseEventKind, area: Rect) {
        let (width, height) = frame_layout(area, &self.app, &self.panel).chat_viewport();
        match kind {
            MouseEventKind::ScrollUp => self.chat.scroll_up(MOUSE_SCROLL_LINES, width, height),
            MouseEventKind::ScrollDown => {
                self.chat.scroll_down(MOUSE_SCROLL_LINES, width, height)
            }
            _ => {}
        }
    }

    #[cfg(test)]
    async fn next_stream_message(&mut self) -> bool {
        match self.stream_rx.recv().await {
            Some((message, stream_id)) => {
                self.dispatch(AppAction::from_stream(message, stream_id));
                true
            }
            None => false,
        }
    }
}

pub async fn run_chat(app: App) -> Result<(), Box<dyn Error>> {
    let mut terminal = setup_terminal()?;
    let result = run_event_loop(&mut terminal, ChatSession::new(app)).await;
    let restored = restore_terminal(&mut terminal);
    result.and(restored)
}

async fn run_event_loop(
    terminal: &mut ChatTerminal,
    mut session: ChatSession,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(f, &session.app, &session.chat, &session.panel))?;
        session.drain_stream_messages();

        if event::poll(Duration::from_millis(50))? {
            let size = terminal.size()?;
            let area = Rect::new(0, 0, size.width, size.height);
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if session.handle_key(&key, area) == KeyLoopAction::Break {
                        break;
                    }
                }
                Event::Paste(text) => session.handle_paste(&text),
                Event::Mouse(mouse) => session.handle_mouse(mouse.kind, area),
                _ => {}
            }
        }
        tokio::task::yield_now().await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::{ChatMessage, ERROR_REPLY};
    use crate::core::preferences::ThemeMode;
    use crate::core::storage::MemoryStore;
    use crate::utils::test_utils::{create_test_app, spawn_test_server, TestResponse};
    use std::sync::Arc;

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 120,
        height: 40,
    };

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(session: &mut ChatSession, text: &str) {
        for c in text.chars() {
            session.handle_key(&press(KeyCode::Char(c)), AREA);
        }
    }

    fn session_for(endpoint: &str) -> ChatSession {
        let app = App::new(
            Arc::new(MemoryStore::new()),
            endpoint.to_string(),
            reqwest::Client::new(),
        );
        ChatSession::new(app)
    }

    async fn run_until_reply_settles(session: &mut ChatSession) {
        while session.app.ui.typing || session.app.ui.pending_reply.is_some() {
            assert!(session.next_stream_message().await, "stream channel closed");
        }
    }

    #[tokio::test]
    async fn typed_question_streams_into_one_persisted_reply() {
        let server = spawn_test_server(TestResponse::chunked(&[b"Hello ", b"world"])).await;
        let mut session = session_for(&server.base_url);

        type_text(&mut session, "What is Mizaj?");
        assert_eq!(session.app.ui.input_text(), "What is Mizaj?");
        session.handle_key(&press(KeyCode::Enter), AREA);
        assert_eq!(session.app.ui.input_text(), "");
        assert!(session.chat.is_typing());

        run_until_reply_settles(&mut session).await;

        let messages = session.app.transcript.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], ChatMessage::user("What is Mizaj?"));
        assert_eq!(messages[2], ChatMessage::bot("Hello world"));
        assert_eq!(session.chat.entry_count(), 3);
        assert!(!session.chat.is_typing());
        assert!(!session.chat.has_pending_entry());
    }

    #[tokio::test]
    async fn server_error_leaves_one_error_entry_and_no_placeholder() {
        let server = spawn_test_server(TestResponse::status(500)).await;
        let mut session = session_for(&server.base_url);

        session.dispatch(AppAction::SelectTopic {
            name: "Fever (Humma)".into(),
        });
        run_until_reply_settles(&mut session).await;

        let messages = session.app.transcript.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2], ChatMessage::bot(ERROR_REPLY));
        assert!(!session.chat.is_typing());
        assert_eq!(session.chat.entry_count(), 3);
    }

    #[test]
    fn ctrl_c_breaks_the_loop() {
        let mut session = ChatSession::new(create_test_app());
        assert_eq!(
            session.handle_key(&ctrl('c'), AREA),
            KeyLoopAction::Break
        );
    }

    #[test]
    fn shortcuts_update_preferences_and_view() {
        let mut session = ChatSession::new(create_test_app());
        let dark_bg = session.chat.theme().background_color;
        session.handle_key(&ctrl('t'), AREA);
        assert_eq!(session.app.prefs.theme(), ThemeMode::Light);
        assert_ne!(session.chat.theme().background_color, dark_bg);

        session.handle_key(&KeyEvent::new(KeyCode::Up, KeyModifiers::CONTROL), AREA);
        assert_eq!(session.app.prefs.font_size_px(), 17);
    }

    #[test]
    fn search_typing_filters_the_panel() {
        let mut session = ChatSession::new(create_test_app());
        session.handle_key(&press(KeyCode::Tab), AREA);
        assert_eq!(session.app.ui.focus, UiFocus::Search);

        type_text(&mut session, "fever");
        assert_eq!(session.app.ui.search_query, "fever");
        assert_eq!(session.app.visible_topic_count(), 1);
        assert_eq!(session.panel.rows().len(), 2);

        session.handle_key(&press(KeyCode::Backspace), AREA);
        assert_eq!(session.app.ui.search_query, "feve");
    }

    #[test]
    fn topic_list_toggles_favorites_with_space() {
        let mut session = ChatSession::new(create_test_app());
        session.handle_key(&press(KeyCode::Tab), AREA);
        session.handle_key(&press(KeyCode::Tab), AREA);
        assert_eq!(session.app.ui.focus, UiFocus::Topics);

        session.handle_key(&press(KeyCode::Down), AREA);
        session.handle_key(&press(KeyCode::Char(' ')), AREA);
        let highlighted = session.app.highlighted_topic().expect("topic");
        assert!(session.app.prefs.is_favorite(highlighted.name));
        assert_eq!(session.panel.favorites(), &[highlighted.name.to_string()]);

        session.handle_key(&press(KeyCode::Esc), AREA);
        assert!(!session.app.ui.panel_open);
        assert_eq!(session.app.ui.focus, UiFocus::Input);
    }

    #[test]
    fn paste_goes_to_focused_field() {
        let mut session = ChatSession::new(create_test_app());
        session.handle_paste("line one\r\nline two");
        assert_eq!(session.app.ui.input_text(), "line one\nline two");

        session.handle_key(&press(KeyCode::Tab), AREA);
        session.handle_paste("cough\n");
        assert_eq!(session.app.ui.search_query, "cough ");
    }

    #[test]
    fn clear_shortcut_resets_view_to_greeting() {
        let mut session = ChatSession::new(create_test_app());
        session.chat.apply(
            UiEffect::AppendEntry(ChatMessage::user("stray")),
            session.app.prefs.preferences(),
        );
        session.handle_key(&ctrl('l'), AREA);
        assert_eq!(session.chat.entry_count(), 1);
        assert_eq!(session.app.transcript.len(), 1);
    }
}

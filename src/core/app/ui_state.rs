use tui_textarea::TextArea;

/// Which pane receives plain keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiFocus {
    #[default]
    Input,
    Search,
    Topics,
}

impl UiFocus {
    /// Next focus target; the panel targets are skipped while it is hidden.
    pub fn next(self, panel_open: bool) -> Self {
        match (self, panel_open) {
            (_, false) => UiFocus::Input,
            (UiFocus::Input, true) => UiFocus::Search,
            (UiFocus::Search, true) => UiFocus::Topics,
            (UiFocus::Topics, true) => UiFocus::Input,
        }
    }
}

pub struct UiState {
    pub panel_open: bool,
    pub focus: UiFocus,
    pub search_query: String,
    /// Index into the flattened list of visible topics.
    pub topic_cursor: usize,
    /// The typing placeholder is on screen.
    pub typing: bool,
    /// Accumulated text of the reply being streamed, not yet persisted.
    pub pending_reply: Option<String>,
    pub status: Option<String>,
    textarea: TextArea<'static>,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

impl UiState {
    pub fn new() -> Self {
        let mut state = Self {
            panel_open: true,
            focus: UiFocus::Input,
            search_query: String::new(),
            topic_cursor: 0,
            typing: false,
            pending_reply: None,
            status: None,
            textarea: TextArea::default(),
        };
        state.configure_textarea();
        state
    }

    fn configure_textarea(&mut self) {
        self.textarea
            .set_placeholder_text("Ask a question or pick a topic…");
        self.textarea
            .set_cursor_line_style(ratatui::style::Style::default());
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    pub fn input_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn set_input_text(&mut self, text: &str) {
        self.textarea = TextArea::from(text.split('\n').map(str::to_string));
        self.textarea.move_cursor(tui_textarea::CursorMove::End);
        self.configure_textarea();
    }

    pub fn clear_input(&mut self) {
        self.textarea = TextArea::default();
        self.configure_textarea();
    }

    pub fn apply_textarea_edit<F>(&mut self, f: F)
    where
        F: FnOnce(&mut TextArea<'static>),
    {
        f(&mut self.textarea);
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn cycle_focus(&mut self) {
        self.focus = self.focus.next(self.panel_open);
    }
}

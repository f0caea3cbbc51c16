//! Rendered transcript cache.
//!
//! The view keeps one entry per transcript message (plus the reply being
//! streamed) with its lines already rendered for the current theme. It is
//! updated only through [`UiEffect`]s, so a streamed chunk re-renders a
//! single entry instead of the whole transcript.

use crate::core::app::UiEffect;
use crate::core::message::{ChatMessage, Sender};
use crate::core::preferences::Preferences;
use crate::ui::markdown::{render_markdown, render_plain};
use crate::ui::theme::Theme;
use crate::ui::wrap::wrap_lines;
use ratatui::text::{Line, Span};

const USER_PREFIX: &str = "You: ";
const USER_CONTINUATION_INDENT: &str = "     ";
const TYPING_TEXT: &str = "● ● ●  thinking…";

/// Blank lines between entries for a font size preference.
pub fn entry_spacing(font_size_px: u8) -> usize {
    match font_size_px {
        0..=13 => 0,
        14..=18 => 1,
        _ => 2,
    }
}

struct RenderedEntry {
    message: ChatMessage,
    /// Shown as plain text; set when a streamed reply failed.
    failed: bool,
    lines: Vec<Line<'static>>,
}

pub struct ChatView {
    theme: Theme,
    spacing: usize,
    entries: Vec<RenderedEntry>,
    pending: Option<usize>,
    typing: bool,
    scroll_offset: usize,
    auto_scroll: bool,
}

impl ChatView {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            theme: Theme::for_mode(prefs.theme),
            spacing: entry_spacing(prefs.font_size_px),
            entries: Vec::new(),
            pending: None,
            typing: false,
            scroll_offset: 0,
            auto_scroll: true,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn has_pending_entry(&self) -> bool {
        self.pending.is_some()
    }

    pub fn apply_all<I>(&mut self, effects: I, prefs: Preferences)
    where
        I: IntoIterator<Item = UiEffect>,
    {
        for effect in effects {
            self.apply(effect, prefs);
        }
    }

    pub fn apply(&mut self, effect: UiEffect, prefs: Preferences) {
        match effect {
            UiEffect::ResetTranscript(messages) => {
                self.pending = None;
                self.typing = false;
                self.entries = messages
                    .into_iter()
                    .map(|message| self.render_entry(message, false))
                    .collect();
            }
            UiEffect::AppendEntry(message) => {
                let entry = self.render_entry(message, false);
                self.entries.push(entry);
            }
            UiEffect::ShowTyping => self.typing = true,
            UiEffect::HideTyping => self.typing = false,
            UiEffect::BeginPendingReply => {
                let entry = self.render_entry(ChatMessage::bot(""), false);
                self.entries.push(entry);
                self.pending = Some(self.entries.len() - 1);
            }
            UiEffect::UpdatePendingReply(text) => {
                if let Some(index) = self.pending {
                    self.replace_entry(index, ChatMessage::bot(text), false);
                }
            }
            UiEffect::FailPendingReply(text) => {
                if let Some(index) = self.pending.take() {
                    self.replace_entry(index, ChatMessage::bot(text), true);
                }
            }
            UiEffect::CommitPendingReply(message) => match self.pending.take() {
                Some(index) => self.replace_entry(index, message, false),
                None => {
                    let entry = self.render_entry(message, false);
                    self.entries.push(entry);
                }
            },
            UiEffect::ScrollToBottom => self.auto_scroll = true,
            UiEffect::Restyle => {
                self.theme = Theme::for_mode(prefs.theme);
                self.spacing = entry_spacing(prefs.font_size_px);
                let entries = std::mem::take(&mut self.entries);
                self.entries = entries
                    .into_iter()
                    .map(|entry| self.render_entry(entry.message, entry.failed))
                    .collect();
            }
            UiEffect::RefreshTopics | UiEffect::RefreshFavorites => {}
        }
    }

    fn replace_entry(&mut self, index: usize, message: ChatMessage, failed: bool) {
        let entry = self.render_entry(message, failed);
        if let Some(slot) = self.entries.get_mut(index) {
            *slot = entry;
        }
    }

    fn render_entry(&self, message: ChatMessage, failed: bool) -> RenderedEntry {
        let theme = &self.theme;
        let mut lines = match message.sender {
            Sender::User => {
                let mut lines = render_plain(&message.text, theme.user_text_style);
                for (idx, line) in lines.iter_mut().enumerate() {
                    let prefix = if idx == 0 {
                        Span::styled(USER_PREFIX, theme.user_prefix_style)
                    } else {
                        Span::raw(USER_CONTINUATION_INDENT)
                    };
                    line.spans.insert(0, prefix);
                }
                lines
            }
            Sender::Bot if failed => render_plain(&message.text, theme.assistant_text_style),
            Sender::Bot => render_markdown(&message.text, theme, theme.assistant_text_style),
            Sender::BotInitial => {
                render_markdown(&message.text, theme, theme.greeting_text_style)
            }
        };
        if lines.is_empty() {
            lines.push(Line::default());
        }
        RenderedEntry {
            message,
            failed,
            lines,
        }
    }

    /// Every transcript line wrapped to `width`, including the typing
    /// placeholder.
    pub fn display_lines(&self, width: u16) -> Vec<Line<'static>> {
        let width = width as usize;
        let mut out = Vec::new();
        for (idx, entry) in self.entries.iter().enumerate() {
            if idx > 0 {
                out.extend(std::iter::repeat_with(Line::default).take(self.spacing));
            }
            out.extend(wrap_lines(&entry.lines, width));
        }
        if self.typing {
            if !self.entries.is_empty() {
                out.extend(std::iter::repeat_with(Line::default).take(self.spacing));
            }
            out.push(Line::from(Span::styled(
                TYPING_TEXT,
                self.theme.typing_indicator_style,
            )));
        }
        out
    }

    pub fn max_scroll(&self, width: u16, height: u16) -> usize {
        self.display_lines(width)
            .len()
            .saturating_sub(height as usize)
    }

    /// Scroll offset to draw with; follows the tail while auto-scrolling.
    pub fn effective_scroll(&self, width: u16, height: u16) -> usize {
        let max = self.max_scroll(width, height);
        if self.auto_scroll {
            max
        } else {
            self.scroll_offset.min(max)
        }
    }

    pub fn scroll_up(&mut self, lines: usize, width: u16, height: u16) {
        let current = self.effective_scroll(width, height);
        self.auto_scroll = false;
        self.scroll_offset = current.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize, width: u16, height: u16) {
        let max = self.max_scroll(width, height);
        let next = self.effective_scroll(width, height).saturating_add(lines);
        if next >= max {
            self.auto_scroll = true;
        } else {
            self.scroll_offset = next;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.auto_scroll = false;
        self.scroll_offset = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.auto_scroll = true;
    }
}

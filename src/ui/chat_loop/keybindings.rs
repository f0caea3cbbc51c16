//! Keybinding registry
//!
//! Keys resolve to a [`KeyCommand`] in two steps: bindings specific to the
//! focused pane win over global ones, and anything unbound falls through to
//! text editing.

use crate::core::app::{AppAction, UiFocus};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Pattern for matching key events
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPattern {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyPattern {
    pub fn simple(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn with_modifiers(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code && self.modifiers == key.modifiers
    }
}

impl From<&KeyEvent> for KeyPattern {
    fn from(key: &KeyEvent) -> Self {
        Self {
            code: key.code,
            modifiers: key.modifiers,
        }
    }
}

/// Pane that receives plain keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Input,
    Search,
    Topics,
}

impl From<UiFocus> for KeyContext {
    fn from(focus: UiFocus) -> Self {
        match focus {
            UiFocus::Input => KeyContext::Input,
            UiFocus::Search => KeyContext::Search,
            UiFocus::Topics => KeyContext::Topics,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Quit,
    Submit,
    ActivateTopic,
    CycleFocus,
    ToggleTheme,
    FontSize(i32),
    ToggleFavorite,
    SelectFavorite(usize),
    NewChat,
    ClearHistory,
    TogglePanel,
    ClosePanel,
    TopicCursor(i32),
    ScrollLines(i32),
    PageUp,
    PageDown,
    ScrollTop,
    ScrollBottom,
    /// Not bound; forwarded to the focused text field.
    Edit,
}

impl KeyCommand {
    /// The state change this command requests, if it is not handled by the
    /// view itself.
    pub fn into_action(self) -> Option<AppAction> {
        let action = match self {
            KeyCommand::Submit => AppAction::SubmitInput,
            KeyCommand::ActivateTopic => AppAction::ActivateHighlightedTopic,
            KeyCommand::CycleFocus => AppAction::CycleFocus,
            KeyCommand::ToggleTheme => AppAction::ToggleTheme,
            KeyCommand::FontSize(delta) => AppAction::ChangeFontSize { delta },
            KeyCommand::ToggleFavorite => AppAction::ToggleHighlightedFavorite,
            KeyCommand::SelectFavorite(index) => AppAction::SelectFavorite { index },
            KeyCommand::NewChat => AppAction::NewChat,
            KeyCommand::ClearHistory => AppAction::ClearHistory,
            KeyCommand::TogglePanel => AppAction::TogglePanel,
            KeyCommand::ClosePanel => AppAction::ClosePanel,
            KeyCommand::TopicCursor(delta) => AppAction::MoveTopicCursor { delta },
            KeyCommand::Quit
            | KeyCommand::ScrollLines(_)
            | KeyCommand::PageUp
            | KeyCommand::PageDown
            | KeyCommand::ScrollTop
            | KeyCommand::ScrollBottom
            | KeyCommand::Edit => return None,
        };
        Some(action)
    }
}

pub struct KeyBindings {
    global: HashMap<KeyPattern, KeyCommand>,
    contextual: HashMap<(KeyContext, KeyPattern), KeyCommand>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = Self {
            global: HashMap::new(),
            contextual: HashMap::new(),
        };

        bindings.bind(KeyPattern::ctrl(KeyCode::Char('c')), KeyCommand::Quit);
        bindings.bind(KeyPattern::simple(KeyCode::Tab), KeyCommand::CycleFocus);
        bindings.bind(KeyPattern::ctrl(KeyCode::Char('t')), KeyCommand::ToggleTheme);
        bindings.bind(KeyPattern::ctrl(KeyCode::Up), KeyCommand::FontSize(1));
        bindings.bind(KeyPattern::ctrl(KeyCode::Down), KeyCommand::FontSize(-1));
        bindings.bind(KeyPattern::ctrl(KeyCode::Char('=')), KeyCommand::FontSize(1));
        bindings.bind(KeyPattern::ctrl(KeyCode::Char('+')), KeyCommand::FontSize(1));
        bindings.bind(
            KeyPattern::with_modifiers(
                KeyCode::Char('+'),
                KeyModifiers::CONTROL | KeyModifiers::SHIFT,
            ),
            KeyCommand::FontSize(1),
        );
        bindings.bind(KeyPattern::ctrl(KeyCode::Char('-')), KeyCommand::FontSize(-1));
        bindings.bind(KeyPattern::ctrl(KeyCode::Char('f')), KeyCommand::ToggleFavorite);
        bindings.bind(KeyPattern::ctrl(KeyCode::Char('n')), KeyCommand::NewChat);
        bindings.bind(KeyPattern::ctrl(KeyCode::Char('l')), KeyCommand::ClearHistory);
        bindings.bind(KeyPattern::ctrl(KeyCode::Char('p')), KeyCommand::TogglePanel);
        bindings.bind(KeyPattern::simple(KeyCode::PageUp), KeyCommand::PageUp);
        bindings.bind(KeyPattern::simple(KeyCode::PageDown), KeyCommand::PageDown);
        bindings.bind(KeyPattern::ctrl(KeyCode::Home), KeyCommand::ScrollTop);
        bindings.bind(KeyPattern::ctrl(KeyCode::End), KeyCommand::ScrollBottom);
        for digit in 1..=9u8 {
            let ch = char::from(b'0' + digit);
            bindings.bind(
                KeyPattern::with_modifiers(KeyCode::Char(ch), KeyModifiers::ALT),
                KeyCommand::SelectFavorite(usize::from(digit - 1)),
            );
        }

        use KeyContext::*;
        bindings.bind_in(Input, KeyPattern::simple(KeyCode::Enter), KeyCommand::Submit);
        bindings.bind_in(Input, KeyPattern::simple(KeyCode::Up), KeyCommand::ScrollLines(-1));
        bindings.bind_in(Input, KeyPattern::simple(KeyCode::Down), KeyCommand::ScrollLines(1));
        for context in [Search, Topics] {
            bindings.bind_in(
                context,
                KeyPattern::simple(KeyCode::Enter),
                KeyCommand::ActivateTopic,
            );
            bindings.bind_in(
                context,
                KeyPattern::simple(KeyCode::Up),
                KeyCommand::TopicCursor(-1),
            );
            bindings.bind_in(
                context,
                KeyPattern::simple(KeyCode::Down),
                KeyCommand::TopicCursor(1),
            );
            bindings.bind_in(context, KeyPattern::simple(KeyCode::Esc), KeyCommand::ClosePanel);
        }
        bindings.bind_in(
            Topics,
            KeyPattern::simple(KeyCode::Char(' ')),
            KeyCommand::ToggleFavorite,
        );

        bindings
    }

    pub fn bind(&mut self, pattern: KeyPattern, command: KeyCommand) {
        self.global.insert(pattern, command);
    }

    pub fn bind_in(&mut self, context: KeyContext, pattern: KeyPattern, command: KeyCommand) {
        self.contextual.insert((context, pattern), command);
    }

    pub fn resolve(&self, context: KeyContext, key: &KeyEvent) -> KeyCommand {
        let pattern = KeyPattern::from(key);
        if let Some(command) = self.contextual.get(&(context, pattern.clone())) {
            return *command;
        }
        self.global
            .get(&pattern)
            .copied()
            .unwrap_or(KeyCommand::Edit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn pattern_matches_exact_modifiers() {
        let pattern = KeyPattern::ctrl(KeyCode::Char('t'));
        assert!(pattern.matches(&key(KeyCode::Char('t'), KeyModifiers::CONTROL)));
        assert!(!pattern.matches(&key(KeyCode::Char('t'), KeyModifiers::NONE)));
    }

    #[test]
    fn enter_depends_on_focus() {
        let bindings = KeyBindings::new();
        let enter = key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(bindings.resolve(KeyContext::Input, &enter), KeyCommand::Submit);
        assert_eq!(
            bindings.resolve(KeyContext::Topics, &enter),
            KeyCommand::ActivateTopic
        );
    }

    #[test]
    fn global_shortcuts_apply_everywhere() {
        let bindings = KeyBindings::new();
        let theme = key(KeyCode::Char('t'), KeyModifiers::CONTROL);
        for context in [KeyContext::Input, KeyContext::Search, KeyContext::Topics] {
            assert_eq!(bindings.resolve(context, &theme), KeyCommand::ToggleTheme);
        }
        assert_eq!(
            bindings.resolve(KeyContext::Input, &key(KeyCode::Up, KeyModifiers::CONTROL)),
            KeyCommand::FontSize(1)
        );
        assert_eq!(
            bindings.resolve(
                KeyContext::Search,
                &key(KeyCode::Char('-'), KeyModifiers::CONTROL)
            ),
            KeyCommand::FontSize(-1)
        );
        assert_eq!(
            bindings.resolve(KeyContext::Input, &key(KeyCode::Char('f'), KeyModifiers::CONTROL)),
            KeyCommand::ToggleFavorite
        );
    }

    #[test]
    fn alt_digits_select_favorites() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.resolve(KeyContext::Input, &key(KeyCode::Char('1'), KeyModifiers::ALT)),
            KeyCommand::SelectFavorite(0)
        );
        assert_eq!(
            bindings.resolve(KeyContext::Input, &key(KeyCode::Char('9'), KeyModifiers::ALT)),
            KeyCommand::SelectFavorite(8)
        );
    }

    #[test]
    fn unbound_keys_fall_through_to_editing() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.resolve(KeyContext::Input, &key(KeyCode::Char('a'), KeyModifiers::NONE)),
            KeyCommand::Edit
        );
        // Space types into the search box but toggles a star in the list.
        let space = key(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(bindings.resolve(KeyContext::Search, &space), KeyCommand::Edit);
        assert_eq!(
            bindings.resolve(KeyContext::Topics, &space),
            KeyCommand::ToggleFavorite
        );
    }

    #[test]
    fn view_commands_have_no_action() {
        assert!(KeyCommand::PageUp.into_action().is_none());
        assert!(KeyCommand::Quit.into_action().is_none());
        assert!(matches!(
            KeyCommand::FontSize(-1).into_action(),
            Some(AppAction::ChangeFontSize { delta: -1 })
        ));
    }
}

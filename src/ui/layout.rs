use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const PANEL_WIDTH: u16 = 40;
const SEARCH_HEIGHT: u16 = 3;
const MAX_FAVORITES_HEIGHT: u16 = 8;
const MAX_INPUT_LINES: u16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelAreas {
    pub search: Rect,
    pub topics: Rect,
    pub favorites: Rect,
}

/// Screen regions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub panel: Option<PanelAreas>,
    pub chat: Rect,
    pub input: Rect,
    pub status: Rect,
}

impl FrameLayout {
    pub fn compute(area: Rect, panel_open: bool, input_lines: usize, favorites: usize) -> Self {
        let input_height = (input_lines.max(1) as u16).min(MAX_INPUT_LINES) + 2;
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(input_height),
                Constraint::Length(1),
            ])
            .split(area);

        let (panel, chat) = if panel_open && area.width > PANEL_WIDTH + 20 {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(PANEL_WIDTH), Constraint::Min(0)])
                .split(rows[0]);
            let favorites_height = (favorites.max(1) as u16 + 2).min(MAX_FAVORITES_HEIGHT);
            let panel_rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(SEARCH_HEIGHT),
                    Constraint::Min(0),
                    Constraint::Length(favorites_height),
                ])
                .split(columns[0]);
            (
                Some(PanelAreas {
                    search: panel_rows[0],
                    topics: panel_rows[1],
                    favorites: panel_rows[2],
                }),
                columns[1],
            )
        } else {
            (None, rows[0])
        };

        Self {
            panel,
            chat,
            input: rows[1],
            status: rows[2],
        }
    }

    /// Width and height available to transcript text inside its border.
    pub fn chat_viewport(&self) -> (u16, u16) {
        (
            self.chat.width.saturating_sub(2),
            self.chat.height.saturating_sub(2),
        )
    }
}

use crate::core::app::{App, UiFocus};
use crate::ui::chat_view::ChatView;
use crate::ui::layout::{FrameLayout, PanelAreas};
use crate::ui::panel::PanelView;
use crate::ui::theme::Theme;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const INPUT_HINT: &str = "Enter send • Tab focus • Ctrl+P panel • Ctrl+T theme • Ctrl+C quit";

pub fn frame_layout(area: Rect, app: &App, panel: &PanelView) -> FrameLayout {
    FrameLayout::compute(
        area,
        app.ui.panel_open,
        app.ui.textarea().lines().len(),
        panel.favorites().len(),
    )
}

pub fn ui(f: &mut Frame, app: &App, chat: &ChatView, panel: &PanelView) {
    let theme = chat.theme();
    let layout = frame_layout(f.area(), app, panel);

    f.render_widget(
        Block::default().style(Style::default().bg(theme.background_color)),
        f.area(),
    );

    if let Some(areas) = layout.panel {
        render_panel(f, app, panel, theme, areas);
    }
    render_transcript(f, app, chat, theme, layout.chat);
    render_input(f, app, theme, layout.input);
    render_status(f, app, theme, layout.status);
}

fn bordered<'a>(title: impl Into<Line<'a>>, focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if focused {
        theme.focused_border_style
    } else {
        theme.border_style
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
        .title_style(theme.title_style)
}

fn render_panel(f: &mut Frame, app: &App, panel: &PanelView, theme: &Theme, areas: PanelAreas) {
    let search_focused = app.ui.focus == UiFocus::Search;
    let search = Paragraph::new(app.ui.search_query.as_str())
        .style(theme.input_text_style)
        .block(bordered("Search topics", search_focused, theme));
    f.render_widget(search, areas.search);
    if search_focused {
        let x = areas.search.x + 1 + Line::from(app.ui.search_query.as_str()).width() as u16;
        f.set_cursor_position((x.min(areas.search.right().saturating_sub(2)), areas.search.y + 1));
    }

    let topics_focused = app.ui.focus == UiFocus::Topics;
    let highlighted = topics_focused.then_some(app.ui.topic_cursor);
    let lines = panel.topic_lines(theme, highlighted);
    let inner_height = areas.topics.height.saturating_sub(2) as usize;
    let scroll = highlighted
        .and_then(|cursor| panel.row_of_topic(cursor))
        .map(|row| row.saturating_sub(inner_height.saturating_sub(1)))
        .unwrap_or(0);
    let topics = Paragraph::new(lines)
        .block(bordered("Topics", topics_focused, theme))
        .scroll((scroll as u16, 0));
    f.render_widget(topics, areas.topics);

    let favorites = Paragraph::new(panel.favorite_lines(theme))
        .block(bordered("Favorites (Alt+1-9)", false, theme));
    f.render_widget(favorites, areas.favorites);
}

fn render_transcript(f: &mut Frame, app: &App, chat: &ChatView, theme: &Theme, area: Rect) {
    let width = area.width.saturating_sub(2);
    let height = area.height.saturating_sub(2);
    let lines = chat.display_lines(width);
    let scroll = chat.effective_scroll(width, height);

    let title = Line::from(vec![
        Span::raw(format!("Hikmat v{}", env!("CARGO_PKG_VERSION"))),
        Span::raw(" • "),
        Span::raw(app.session.endpoint.clone()),
    ]);
    let transcript = Paragraph::new(lines)
        .style(theme.assistant_text_style)
        .block(bordered(title, false, theme))
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(transcript, area);
}

fn render_input(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let focused = app.ui.focus == UiFocus::Input;
    let mut textarea = app.ui.textarea().clone();
    textarea.set_block(bordered(INPUT_HINT, focused, theme));
    textarea.set_style(theme.input_text_style);
    if focused {
        textarea.set_cursor_style(theme.input_cursor_style);
    } else {
        textarea.set_cursor_style(Style::default());
    }
    f.render_widget(&textarea, area);
}

fn render_status(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let mut text = format!(
        "{} • {}px",
        app.prefs.theme(),
        app.prefs.font_size_px()
    );
    if let Some(status) = &app.ui.status {
        text.push_str(" • ");
        text.push_str(status);
    }
    f.render_widget(Paragraph::new(text).style(theme.status_style), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::{apply_action, AppAction};
    use crate::utils::test_utils::create_test_app;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App, chat: &ChatView, panel: &PanelView) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|f| ui(f, app, chat, panel))
            .expect("draw");
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn initialized(app: &mut App) -> (ChatView, PanelView) {
        let mut chat = ChatView::new(app.prefs.preferences());
        let mut panel = PanelView::new();
        for effect in app.initialize() {
            panel.apply(&effect, app);
            chat.apply(effect, app.prefs.preferences());
        }
        (chat, panel)
    }

    #[test]
    fn draws_panel_transcript_and_status() {
        let mut app = create_test_app();
        let (chat, panel) = initialized(&mut app);
        let screen = draw(&app, &chat, &panel);
        assert!(screen.contains("Search topics"));
        assert!(screen.contains("Basic Principles"));
        assert!(screen.contains("Hello! I'm your Unani"));
        assert!(screen.contains("dark • 16px"));
    }

    #[test]
    fn closed_panel_hides_topics() {
        let mut app = create_test_app();
        let (chat, panel) = initialized(&mut app);
        apply_action(&mut app, AppAction::ClosePanel);
        let screen = draw(&app, &chat, &panel);
        assert!(!screen.contains("Search topics"));
        assert!(screen.contains("Hikmat v"));
    }
}

use crate::core::preferences::ThemeMode;
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Transcript entries
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_prefix_style: Style,
    pub assistant_text_style: Style,
    pub greeting_text_style: Style,
    pub typing_indicator_style: Style,

    // Chrome
    pub title_style: Style,
    pub border_style: Style,
    pub focused_border_style: Style,
    pub status_style: Style,

    // Control panel
    pub category_style: Style,
    pub topic_style: Style,
    pub topic_highlight_style: Style,
    pub star_style: Style,

    // Input area
    pub input_text_style: Style,
    pub input_cursor_style: Style,

    // Markdown
    pub md_heading_color: Color,
    pub md_code_color: Color,
    pub md_link_color: Color,
    pub md_quote_color: Color,
    pub md_marker_color: Color,
}

impl Theme {
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Theme {
            background_color: Color::Rgb(0x1b, 0x1f, 0x24),
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_prefix_style: Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::White),
            greeting_text_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            typing_indicator_style: Style::default().fg(Color::DarkGray),

            title_style: Style::default().fg(Color::Gray),
            border_style: Style::default().fg(Color::DarkGray),
            focused_border_style: Style::default().fg(Color::LightGreen),
            status_style: Style::default().fg(Color::Gray),

            category_style: Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
            topic_style: Style::default().fg(Color::White),
            topic_highlight_style: Style::default().add_modifier(Modifier::REVERSED),
            star_style: Style::default().fg(Color::Yellow),

            input_text_style: Style::default().fg(Color::White),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),

            md_heading_color: Color::LightGreen,
            md_code_color: Color::LightYellow,
            md_link_color: Color::LightBlue,
            md_quote_color: Color::Gray,
            md_marker_color: Color::LightGreen,
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::Rgb(0xf7, 0xf5, 0xef),
            user_prefix_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Blue),
            assistant_prefix_style: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::Black),
            greeting_text_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            typing_indicator_style: Style::default().fg(Color::Gray),

            title_style: Style::default().fg(Color::DarkGray),
            border_style: Style::default().fg(Color::Gray),
            focused_border_style: Style::default().fg(Color::Green),
            status_style: Style::default().fg(Color::DarkGray),

            category_style: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            topic_style: Style::default().fg(Color::Black),
            topic_highlight_style: Style::default().add_modifier(Modifier::REVERSED),
            star_style: Style::default().fg(Color::Rgb(0xb8, 0x86, 0x0b)),

            input_text_style: Style::default().fg(Color::Black),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),

            md_heading_color: Color::Green,
            md_code_color: Color::Magenta,
            md_link_color: Color::Blue,
            md_quote_color: Color::DarkGray,
            md_marker_color: Color::Green,
        }
    }

    pub fn md_heading_style(&self, level: u8) -> Style {
        let style = Style::default()
            .fg(self.md_heading_color)
            .add_modifier(Modifier::BOLD);
        if level <= 1 {
            style.add_modifier(Modifier::UNDERLINED)
        } else {
            style
        }
    }

    pub fn md_inline_code_style(&self) -> Style {
        Style::default().fg(self.md_code_color)
    }

    pub fn md_code_block_style(&self) -> Style {
        Style::default().fg(self.md_code_color)
    }

    pub fn md_link_style(&self) -> Style {
        Style::default()
            .fg(self.md_link_color)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn md_blockquote_style(&self) -> Style {
        Style::default()
            .fg(self.md_quote_color)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn md_list_marker_style(&self) -> Style {
        Style::default().fg(self.md_marker_color)
    }

    pub fn md_rule_style(&self) -> Style {
        Style::default().fg(self.md_quote_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_map_to_distinct_backgrounds() {
        let dark = Theme::for_mode(ThemeMode::Dark);
        let light = Theme::for_mode(ThemeMode::Light);
        assert_ne!(dark.background_color, light.background_color);
        assert_ne!(dark.assistant_text_style, light.assistant_text_style);
    }

    #[test]
    fn top_level_headings_are_underlined() {
        let theme = Theme::dark();
        assert!(theme
            .md_heading_style(1)
            .add_modifier
            .contains(Modifier::UNDERLINED));
        assert!(!theme
            .md_heading_style(2)
            .add_modifier
            .contains(Modifier::UNDERLINED));
    }
}

use crate::core::app::{App, UiEffect};
use crate::core::catalog::icon_glyph;
use crate::core::preferences::star_glyph;
use crate::ui::theme::Theme;
use ratatui::text::{Line, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelRow {
    Category(&'static str),
    Topic {
        name: &'static str,
        glyph: &'static str,
        favorite: bool,
        /// Position in the flattened list of visible topics.
        index: usize,
    },
}

/// Cached rows for the control panel: the filtered topic list and the
/// favorites list.
#[derive(Debug, Default)]
pub struct PanelView {
    rows: Vec<PanelRow>,
    favorites: Vec<String>,
}

impl PanelView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, effect: &UiEffect, app: &App) {
        match effect {
            UiEffect::RefreshTopics => self.refresh_topics(app),
            UiEffect::RefreshFavorites => self.refresh_favorites(app),
            _ => {}
        }
    }

    pub fn refresh_topics(&mut self, app: &App) {
        self.rows.clear();
        let mut index = 0;
        for (category, topics) in app.visible_topics() {
            self.rows.push(PanelRow::Category(category));
            for topic in topics {
                self.rows.push(PanelRow::Topic {
                    name: topic.name,
                    glyph: icon_glyph(topic.icon),
                    favorite: app.prefs.is_favorite(topic.name),
                    index,
                });
                index += 1;
            }
        }
    }

    pub fn refresh_favorites(&mut self, app: &App) {
        self.favorites = app.prefs.favorites().to_vec();
    }

    pub fn rows(&self) -> &[PanelRow] {
        &self.rows
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    /// Row position of the highlighted topic, for keeping it in view.
    pub fn row_of_topic(&self, cursor: usize) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| matches!(row, PanelRow::Topic { index, .. } if *index == cursor))
    }

    pub fn topic_lines(&self, theme: &Theme, highlighted: Option<usize>) -> Vec<Line<'static>> {
        if self.rows.is_empty() {
            return vec![Line::from(Span::styled(
                "No matching topics",
                theme.status_style,
            ))];
        }
        self.rows
            .iter()
            .map(|row| match row {
                PanelRow::Category(name) => {
                    Line::from(Span::styled(name.to_string(), theme.category_style))
                }
                PanelRow::Topic {
                    name,
                    glyph,
                    favorite,
                    index,
                } => {
                    let mut text_style = theme.topic_style;
                    if highlighted == Some(*index) {
                        text_style = text_style.patch(theme.topic_highlight_style);
                    }
                    Line::from(vec![
                        Span::raw(" "),
                        Span::styled(format!("{glyph} {name}"), text_style),
                        Span::raw(" "),
                        Span::styled(star_glyph(*favorite), theme.star_style),
                    ])
                }
            })
            .collect()
    }

    pub fn favorite_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        if self.favorites.is_empty() {
            return vec![Line::from(Span::styled("No favorites yet", theme.status_style))];
        }
        self.favorites
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let label = if idx < 9 {
                    format!("{}. ", idx + 1)
                } else {
                    "   ".to_string()
                };
                Line::from(vec![
                    Span::styled(label, theme.star_style),
                    Span::styled(name.clone(), theme.topic_style),
                ])
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::{apply_action, AppAction};
    use crate::utils::test_utils::create_test_app;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn rows_group_topics_under_categories() {
        let app = create_test_app();
        let mut panel = PanelView::new();
        panel.refresh_topics(&app);
        assert_eq!(panel.rows()[0], PanelRow::Category("Basic Principles"));
        assert!(matches!(
            panel.rows()[1],
            PanelRow::Topic { index: 0, favorite: false, .. }
        ));
    }

    #[test]
    fn stars_follow_favorites() {
        let mut app = create_test_app();
        let mut panel = PanelView::new();
        let outcome = apply_action(
            &mut app,
            AppAction::ToggleFavorite {
                name: "Fever (Humma)".into(),
            },
        );
        for effect in &outcome.effects {
            panel.apply(effect, &app);
        }
        let theme = Theme::dark();
        let fever = panel
            .topic_lines(&theme, None)
            .into_iter()
            .map(|line| line_text(&line))
            .find(|text| text.contains("Fever (Humma)"))
            .expect("fever row");
        assert!(fever.ends_with('★'));
        assert_eq!(panel.favorites(), &["Fever (Humma)".to_string()]);
        assert_eq!(
            line_text(&panel.favorite_lines(&theme)[0]),
            "1. Fever (Humma)"
        );
    }

    #[test]
    fn empty_filter_shows_placeholder() {
        let mut app = create_test_app();
        apply_action(
            &mut app,
            AppAction::SetSearchQuery {
                query: "zzz".into(),
            },
        );
        let mut panel = PanelView::new();
        panel.refresh_topics(&app);
        assert!(panel.rows().is_empty());
        let lines = panel.topic_lines(&Theme::dark(), Some(0));
        assert_eq!(line_text(&lines[0]), "No matching topics");
        assert_eq!(panel.row_of_topic(0), None);
    }
}

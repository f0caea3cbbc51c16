//! Markdown to styled terminal lines.
//!
//! Assistant replies arrive as Markdown and are rendered into unwrapped
//! [`Line`]s; [`crate::ui::wrap`] fits them to the terminal width at draw
//! time. Rendering is pure, so a streamed reply is simply re-rendered from
//! its full text after every chunk.

use crate::ui::theme::Theme;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

const RULE_WIDTH: usize = 24;
const CODE_INDENT: &str = "  ";
const QUOTE_PREFIX: &str = "│ ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

/// Render `content` as Markdown on top of `base`.
pub fn render_markdown(content: &str, theme: &Theme, base: Style) -> Vec<Line<'static>> {
    MarkdownRenderer::new(theme, base).render(content)
}

/// Render `content` verbatim, one line per source line.
pub fn render_plain(content: &str, style: Style) -> Vec<Line<'static>> {
    content
        .split('\n')
        .map(|line| Line::from(Span::styled(detab(line), style)))
        .collect()
}

struct MarkdownRenderer<'a> {
    theme: &'a Theme,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<ListKind>,
    item_indent: usize,
    at_item_start: bool,
    quote_depth: usize,
    in_code_block: bool,
    link: Option<LinkState>,
}

struct LinkState {
    dest: String,
    first_span: usize,
}

impl<'a> MarkdownRenderer<'a> {
    fn new(theme: &'a Theme, base: Style) -> Self {
        Self {
            theme,
            lines: Vec::new(),
            current: Vec::new(),
            style_stack: vec![base],
            list_stack: Vec::new(),
            item_indent: 0,
            at_item_start: false,
            quote_depth: 0,
            in_code_block: false,
            link: None,
        }
    }

    fn render(mut self, content: &str) -> Vec<Line<'static>> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        for event in Parser::new_ext(content, options) {
            match event {
                Event::Start(tag) => self.start_tag(tag),
                Event::End(tag_end) => self.end_tag(tag_end),
                Event::Text(text) => {
                    if self.in_code_block {
                        self.push_code_text(&text);
                    } else {
                        let style = self.current_style();
                        self.current.push(Span::styled(detab(&text), style));
                    }
                }
                Event::Code(code) => {
                    let style = self.current_style().patch(self.theme.md_inline_code_style());
                    self.current.push(Span::styled(detab(&code), style));
                }
                Event::SoftBreak => {
                    let style = self.current_style();
                    self.current.push(Span::styled(" ", style));
                }
                Event::HardBreak => self.flush_line(),
                Event::Rule => {
                    self.flush_line();
                    let rule = "─".repeat(RULE_WIDTH);
                    self.push_prefixed(vec![Span::styled(rule, self.theme.md_rule_style())]);
                    self.push_blank();
                }
                Event::TaskListMarker(checked) => {
                    let marker = if checked { "[x] " } else { "[ ] " };
                    self.current
                        .push(Span::styled(marker, self.theme.md_list_marker_style()));
                }
                Event::Html(html) | Event::InlineHtml(html) => {
                    if is_line_break_tag(&html) {
                        self.flush_line();
                    }
                }
                _ => {}
            }
        }

        self.flush_line();
        while self
            .lines
            .last()
            .is_some_and(|line| line.spans.iter().all(|s| s.content.trim().is_empty()))
        {
            self.lines.pop();
        }
        self.lines
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_line();
                let style = self
                    .current_style()
                    .patch(self.theme.md_heading_style(level as u8));
                self.style_stack.push(style);
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth += 1;
                let style = self.current_style().patch(self.theme.md_blockquote_style());
                self.style_stack.push(style);
            }
            Tag::List(start) => {
                self.flush_line();
                self.list_stack.push(match start {
                    Some(n) => ListKind::Ordered(n),
                    None => ListKind::Unordered,
                });
            }
            Tag::Item => {
                self.flush_line();
                let depth_indent = 2 * self.list_stack.len().saturating_sub(1);
                let marker = match self.list_stack.last_mut() {
                    Some(ListKind::Ordered(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.item_indent = depth_indent + marker.width();
                if depth_indent > 0 {
                    self.current.push(Span::raw(" ".repeat(depth_indent)));
                }
                self.current
                    .push(Span::styled(marker, self.theme.md_list_marker_style()));
                self.at_item_start = true;
            }
            Tag::CodeBlock(_) => {
                self.flush_line();
                self.in_code_block = true;
            }
            Tag::Emphasis => self.push_modifier(Modifier::ITALIC),
            Tag::Strong => self.push_modifier(Modifier::BOLD),
            Tag::Strikethrough => self.push_modifier(Modifier::CROSSED_OUT),
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                let style = self.current_style().patch(self.theme.md_link_style());
                self.style_stack.push(style);
                self.link = Some(LinkState {
                    dest: dest_url.to_string(),
                    first_span: self.current.len(),
                });
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag_end: TagEnd) {
        match tag_end {
            TagEnd::Paragraph => {
                self.flush_line();
                if self.list_stack.is_empty() {
                    self.push_blank();
                }
            }
            TagEnd::Heading(_) => {
                self.flush_line();
                self.push_blank();
                self.style_stack.pop();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.style_stack.pop();
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.push_blank();
                }
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.push_blank();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.style_stack.pop();
            }
            TagEnd::Link | TagEnd::Image => {
                self.style_stack.pop();
                if let Some(link) = self.link.take() {
                    let label: String = self.current[link.first_span.min(self.current.len())..]
                        .iter()
                        .map(|span| span.content.as_ref())
                        .collect();
                    if !link.dest.is_empty() && label != link.dest {
                        let style = self.current_style().add_modifier(Modifier::DIM);
                        self.current
                            .push(Span::styled(format!(" ({})", link.dest), style));
                    }
                }
            }
            _ => {}
        }
    }

    fn current_style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or_default()
    }

    fn push_modifier(&mut self, modifier: Modifier) {
        let style = self.current_style().add_modifier(modifier);
        self.style_stack.push(style);
    }

    fn push_code_text(&mut self, text: &str) {
        let style = self.theme.md_code_block_style();
        for line in text.lines() {
            self.push_prefixed(vec![
                Span::raw(CODE_INDENT),
                Span::styled(detab(line), style),
            ]);
        }
    }

    fn flush_line(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let mut spans = std::mem::take(&mut self.current);
        if !self.list_stack.is_empty() && !self.at_item_start {
            spans.insert(0, Span::raw(" ".repeat(self.item_indent)));
        }
        self.at_item_start = false;
        self.push_prefixed(spans);
    }

    fn push_prefixed(&mut self, mut spans: Vec<Span<'static>>) {
        if self.quote_depth > 0 {
            let bar = Span::styled(
                QUOTE_PREFIX.repeat(self.quote_depth),
                self.theme.md_blockquote_style(),
            );
            spans.insert(0, bar);
        }
        self.lines.push(Line::from(spans));
    }

    fn push_blank(&mut self) {
        if self
            .lines
            .last()
            .is_some_and(|line| !line.spans.is_empty())
        {
            self.lines.push(Line::default());
        }
    }
}

fn is_line_break_tag(html: &str) -> bool {
    matches!(
        html.trim().to_ascii_lowercase().as_str(),
        "<br>" | "<br/>" | "<br />"
    )
}

fn detab(s: &str) -> String {
    s.replace('\t', "    ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn render(content: &str) -> Vec<Line<'static>> {
        render_markdown(content, &Theme::dark(), Style::default())
    }

    #[test]
    fn plain_paragraph_is_one_line() {
        assert_eq!(text_of(&render("Hello world")), vec!["Hello world"]);
    }

    #[test]
    fn soft_breaks_join_with_space() {
        assert_eq!(text_of(&render("Hello\nworld")), vec!["Hello world"]);
    }

    #[test]
    fn paragraphs_are_separated_by_one_blank_line() {
        assert_eq!(
            text_of(&render("First.\n\nSecond.")),
            vec!["First.", "", "Second."]
        );
    }

    #[test]
    fn strong_and_emphasis_add_modifiers() {
        let lines = render("a **bold** and *soft* word");
        let bold = lines[0]
            .spans
            .iter()
            .find(|s| s.content == "bold")
            .expect("bold span");
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        let soft = lines[0]
            .spans
            .iter()
            .find(|s| s.content == "soft")
            .expect("italic span");
        assert!(soft.style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn headings_use_heading_style() {
        let theme = Theme::dark();
        let lines = render_markdown("## Mizaj\n\nTemperament.", &theme, Style::default());
        assert_eq!(text_of(&lines), vec!["Mizaj", "", "Temperament."]);
        assert_eq!(lines[0].spans[0].style.fg, Some(theme.md_heading_color));
    }

    #[test]
    fn lists_get_markers_and_nested_indent() {
        let lines = render("- Dam\n- Balgham\n  - cold\n\n1. one\n2. two");
        assert_eq!(
            text_of(&lines),
            vec!["• Dam", "• Balgham", "  • cold", "", "1. one", "2. two"]
        );
    }

    #[test]
    fn ordered_lists_respect_start_number() {
        let lines = render("3. three\n4. four");
        assert_eq!(text_of(&lines), vec!["3. three", "4. four"]);
    }

    #[test]
    fn code_blocks_are_indented_verbatim() {
        let lines = render("```\nlet x = 1;\n\tindented\n```\nafter");
        assert_eq!(
            text_of(&lines),
            vec!["  let x = 1;", "      indented", "", "after"]
        );
    }

    #[test]
    fn blockquotes_get_a_bar() {
        let lines = render("> quoted text");
        assert_eq!(text_of(&lines), vec!["│ quoted text"]);
    }

    #[test]
    fn links_show_destination_when_label_differs() {
        let lines = render("see [the docs](https://example.com) or <https://example.com>");
        assert_eq!(
            text_of(&lines),
            vec!["see the docs (https://example.com) or https://example.com"]
        );
    }

    #[test]
    fn br_tags_break_lines() {
        let lines = render("line one<br>line two");
        assert_eq!(text_of(&lines), vec!["line one", "line two"]);
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(render("").is_empty());
    }

    #[test]
    fn plain_rendering_keeps_markup() {
        let lines = render_plain("**not bold**\nnext", Style::default());
        assert_eq!(text_of(&lines), vec!["**not bold**", "next"]);
    }
}

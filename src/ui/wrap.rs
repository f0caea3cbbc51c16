use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Word-wrap styled lines to `width` columns. Words wider than a full line
/// are broken at character boundaries. Empty lines are kept.
pub fn wrap_lines(lines: &[Line<'static>], width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    lines
        .iter()
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

pub fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    if line.width() <= width {
        return vec![line.clone()];
    }

    let mut wrapped: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0usize;

    for span in &line.spans {
        for token in split_words(&span.content) {
            let token_width = token.width();
            let is_space = token.chars().all(char::is_whitespace);

            if current_width + token_width <= width {
                // Leading spaces are only kept on the first output line.
                if !(is_space && current_width == 0 && !wrapped.is_empty()) {
                    current.push(Span::styled(token.to_string(), span.style));
                    current_width += token_width;
                }
                continue;
            }

            if is_space {
                push_line(&mut wrapped, &mut current);
                current_width = 0;
                continue;
            }

            if token_width <= width {
                push_line(&mut wrapped, &mut current);
                current.push(Span::styled(token.to_string(), span.style));
                current_width = token_width;
                continue;
            }

            // Hard-break a token that cannot fit on any line.
            let mut piece = String::new();
            for ch in token.chars() {
                let ch_width = ch.width().unwrap_or(0);
                if current_width + ch_width > width && current_width > 0 {
                    if !piece.is_empty() {
                        current.push(Span::styled(std::mem::take(&mut piece), span.style));
                    }
                    push_line(&mut wrapped, &mut current);
                    current_width = 0;
                }
                piece.push(ch);
                current_width += ch_width;
            }
            if !piece.is_empty() {
                current.push(Span::styled(piece, span.style));
            }
        }
    }

    if !current.is_empty() || wrapped.is_empty() {
        push_line(&mut wrapped, &mut current);
    }
    wrapped
}

fn push_line(wrapped: &mut Vec<Line<'static>>, current: &mut Vec<Span<'static>>) {
    while current
        .last()
        .is_some_and(|span| span.content.chars().all(char::is_whitespace))
    {
        current.pop();
    }
    wrapped.push(Line::from(std::mem::take(current)));
}

/// Split into alternating runs of whitespace and non-whitespace.
fn split_words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;
    for (idx, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                tokens.push(&text[start..idx]);
                start = idx;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

//! Word wrapping for styled lines.
//!
//! The transcript is wrapped here before it is drawn, so the row count used
//! for scrolling is exactly the number of rows on screen.

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// A run of word or whitespace characters, possibly spanning several styles.
struct Token {
    parts: Vec<(String, Style)>,
    width: usize,
    blank: bool,
}

fn tokens(line: &Line<'_>) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    for span in &line.spans {
        for ch in span.content.chars() {
            let blank = ch.is_whitespace();
            let width = ch.width().unwrap_or(0);
            match tokens.last_mut() {
                Some(token) if token.blank == blank => {
                    token.width += width;
                    match token.parts.last_mut() {
                        Some((text, style)) if *style == span.style => text.push(ch),
                        _ => token.parts.push((ch.to_string(), span.style)),
                    }
                }
                _ => tokens.push(Token {
                    parts: vec![(ch.to_string(), span.style)],
                    width,
                    blank,
                }),
            }
        }
    }
    tokens
}

struct Rows {
    rows: Vec<Vec<Span<'static>>>,
    current: Vec<Span<'static>>,
    column: usize,
    width: usize,
}

impl Rows {
    fn new(width: usize) -> Self {
        Self {
            rows: Vec::new(),
            current: Vec::new(),
            column: 0,
            width,
        }
    }

    fn push(&mut self, text: String, style: Style, width: usize) {
        if !text.is_empty() {
            self.current.push(Span::styled(text, style));
        }
        self.column += width;
    }

    fn push_parts(&mut self, parts: Vec<(String, Style)>) {
        for (text, style) in parts {
            let width = text.chars().map(|ch| ch.width().unwrap_or(0)).sum();
            self.push(text, style, width);
        }
    }

    fn break_row(&mut self) {
        self.rows.push(std::mem::take(&mut self.current));
        self.column = 0;
    }

    /// Place characters one by one, starting a new row whenever the next one
    /// would not fit. A character wider than the row gets a row of its own.
    fn push_chars(&mut self, parts: Vec<(String, Style)>) {
        for (text, style) in parts {
            let mut chunk = String::new();
            let mut chunk_width = 0;
            for ch in text.chars() {
                let width = ch.width().unwrap_or(0);
                let used = self.column + chunk_width;
                if used > 0 && used + width > self.width {
                    self.push(std::mem::take(&mut chunk), style, chunk_width);
                    chunk_width = 0;
                    self.break_row();
                }
                chunk.push(ch);
                chunk_width += width;
            }
            self.push(chunk, style, chunk_width);
        }
    }

    fn place(&mut self, token: Token) {
        let fits = self.column + token.width <= self.width;
        if token.blank {
            if self.column == 0 && !self.rows.is_empty() {
                // Whitespace is dropped at the start of a wrapped row.
            } else if fits {
                self.push_parts(token.parts);
            } else if self.column == 0 {
                self.push_chars(token.parts);
            } else {
                // Overflowing whitespace ends the row without being drawn.
                self.column = self.width;
            }
        } else if fits {
            self.push_parts(token.parts);
        } else if token.width <= self.width {
            self.break_row();
            self.push_parts(token.parts);
        } else {
            if self.column > 0 {
                self.break_row();
            }
            self.push_chars(token.parts);
        }
    }

    fn finish(mut self) -> Vec<Vec<Span<'static>>> {
        self.rows.push(self.current);
        self.rows
    }
}

/// Wrap one line to `width` columns. Always returns at least one row.
pub fn wrap_line(line: &Line<'_>, width: u16) -> Vec<Line<'static>> {
    let mut rows = Rows::new(usize::from(width.max(1)));
    for token in tokens(line) {
        rows.place(token);
    }
    rows.finish()
        .into_iter()
        .map(|spans| Line::from(spans).style(line.style))
        .collect()
}

pub fn wrap_lines(lines: &[Line<'_>], width: u16) -> Vec<Line<'static>> {
    lines.iter().flat_map(|line| wrap_line(line, width)).collect()
}

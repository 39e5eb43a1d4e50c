//! Lightweight emphasis formatting for chat text.
//!
//! [`render_text`] understands exactly four patterns, applied in order:
//! `**bold**`, `*italic*`, a blank line (new paragraph) and a newline
//! followed by `-` (line break plus bullet). Everything else is plain text.
//! Matching is non-greedy, leftmost first, and never crosses a newline.
//!
//! The result is a small tree rather than a string so that text is only ever
//! escaped in one place ([`Markup::to_html`]) and the terminal renderer can
//! style spans without parsing markup back out.

pub const BULLET: &str = "•";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    /// Hard break produced by a `\n-` bullet.
    LineBreak,
    Bullet,
    /// A lone newline that matched no pattern.
    SoftBreak,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub inlines: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup {
    paragraphs: Vec<Paragraph>,
}

impl Markup {
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Serialize to HTML, escaping all text content.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for paragraph in &self.paragraphs {
            out.push_str("<p>");
            for inline in &paragraph.inlines {
                write_inline_html(&mut out, inline);
            }
            out.push_str("</p>");
        }
        out
    }

    /// Text content with all formatting removed. Bullets keep their glyph.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for (index, paragraph) in self.paragraphs.iter().enumerate() {
            if index > 0 {
                out.push_str("\n\n");
            }
            for inline in &paragraph.inlines {
                write_inline_plain(&mut out, inline);
            }
        }
        out
    }
}

/// Format chat text into [`Markup`].
pub fn render_text(text: &str) -> Markup {
    let mut paragraphs = Vec::new();
    let mut current = Paragraph::default();

    for piece in split_breaks(text) {
        match piece {
            Piece::Text(segment) => current.inlines.extend(parse_bold(segment)),
            Piece::Paragraph => paragraphs.push(std::mem::take(&mut current)),
            Piece::Bullet => {
                current.inlines.push(Inline::LineBreak);
                current.inlines.push(Inline::Bullet);
            }
            Piece::Soft => current.inlines.push(Inline::SoftBreak),
        }
    }
    paragraphs.push(current);

    Markup { paragraphs }
}

enum Piece<'a> {
    Text(&'a str),
    Paragraph,
    Bullet,
    Soft,
}

// `\n\n` wins over `\n-` when both could start at the same newline.
fn split_breaks(text: &str) -> Vec<Piece<'_>> {
    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\n' {
            i += 1;
            continue;
        }
        if start < i {
            pieces.push(Piece::Text(&text[start..i]));
        }
        match bytes.get(i + 1) {
            Some(b'\n') => {
                pieces.push(Piece::Paragraph);
                i += 2;
            }
            Some(b'-') => {
                pieces.push(Piece::Bullet);
                i += 2;
            }
            _ => {
                pieces.push(Piece::Soft);
                i += 1;
            }
        }
        start = i;
    }
    if start < bytes.len() {
        pieces.push(Piece::Text(&text[start..]));
    }
    pieces
}

fn parse_bold(segment: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut rest = segment;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("**") else {
            break;
        };
        out.extend(parse_italic(&rest[..open]));
        out.push(Inline::Strong(parse_italic(&after_open[..close])));
        rest = &after_open[close + 2..];
    }
    out.extend(parse_italic(rest));
    out
}

fn parse_italic(segment: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut rest = segment;

    while let Some(open) = rest.find('*') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('*') else {
            break;
        };
        push_text(&mut out, &rest[..open]);
        let inner = &after_open[..close];
        out.push(Inline::Emphasis(if inner.is_empty() {
            Vec::new()
        } else {
            vec![Inline::Text(inner.to_string())]
        }));
        rest = &after_open[close + 1..];
    }
    push_text(&mut out, rest);
    out
}

fn push_text(out: &mut Vec<Inline>, text: &str) {
    if !text.is_empty() {
        out.push(Inline::Text(text.to_string()));
    }
}

fn write_inline_html(out: &mut String, inline: &Inline) {
    match inline {
        Inline::Text(text) => escape_html_into(out, text),
        Inline::Strong(children) => {
            out.push_str("<strong>");
            for child in children {
                write_inline_html(out, child);
            }
            out.push_str("</strong>");
        }
        Inline::Emphasis(children) => {
            out.push_str("<em>");
            for child in children {
                write_inline_html(out, child);
            }
            out.push_str("</em>");
        }
        Inline::LineBreak => out.push_str("<br>"),
        Inline::Bullet => out.push_str(BULLET),
        Inline::SoftBreak => out.push('\n'),
    }
}

fn write_inline_plain(out: &mut String, inline: &Inline) {
    match inline {
        Inline::Text(text) => out.push_str(text),
        Inline::Strong(children) | Inline::Emphasis(children) => {
            for child in children {
                write_inline_plain(out, child);
            }
        }
        Inline::LineBreak | Inline::SoftBreak => out.push('\n'),
        Inline::Bullet => out.push_str(BULLET),
    }
}

pub fn escape_html_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(text: &str) -> String {
        render_text(text).to_html()
    }

    #[test]
    fn bold_and_italic_compose() {
        assert_eq!(html("**a** *b*"), "<p><strong>a</strong> <em>b</em></p>");
    }

    #[test]
    fn plain_text_is_wrapped_in_one_paragraph() {
        assert_eq!(html("hello"), "<p>hello</p>");
        assert_eq!(html(""), "<p></p>");
    }

    #[test]
    fn blank_line_starts_new_paragraph() {
        assert_eq!(html("one\n\ntwo"), "<p>one</p><p>two</p>");
    }

    #[test]
    fn hyphen_after_newline_becomes_bullet() {
        assert_eq!(
            html("Shopping:\n- eggs\n- flour"),
            "<p>Shopping:<br>• eggs<br>• flour</p>"
        );
    }

    #[test]
    fn paragraph_break_takes_precedence_over_bullet() {
        // The hyphen right after a paragraph break has no newline left to pair with.
        assert_eq!(html("a\n\n- b"), "<p>a</p><p>- b</p>");
        assert_eq!(html("a\n\n\n- b"), "<p>a</p><p><br>• b</p>");
    }

    #[test]
    fn lone_newline_is_kept() {
        assert_eq!(html("a\nb"), "<p>a\nb</p>");
    }

    #[test]
    fn italic_applies_inside_bold() {
        assert_eq!(
            html("**very *hot* pan**"),
            "<p><strong>very <em>hot</em> pan</strong></p>"
        );
    }

    #[test]
    fn emphasis_is_non_greedy_and_leftmost() {
        assert_eq!(
            html("**a** and **b**"),
            "<p><strong>a</strong> and <strong>b</strong></p>"
        );
        assert_eq!(html("*a* *b*"), "<p><em>a</em> <em>b</em></p>");
    }

    #[test]
    fn emphasis_never_spans_a_newline() {
        assert_eq!(html("**a\nb**"), "<p><em></em>a\nb<em></em></p>");
    }

    #[test]
    fn unmatched_markers_stay_literal() {
        assert_eq!(html("2 * 3 = 6"), "<p>2 * 3 = 6</p>");
    }

    #[test]
    fn markup_characters_are_escaped() {
        assert_eq!(
            html("<script>alert('x')</script> & **<b>**"),
            "<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; \
             <strong>&lt;b&gt;</strong></p>"
        );
    }

    #[test]
    fn plain_text_drops_formatting() {
        let markup = render_text("**Tip:** use *fresh* basil\n- wash it\n\nEnjoy");
        assert_eq!(markup.plain_text(), "Tip: use fresh basil\n• wash it\n\nEnjoy");
    }

    #[test]
    fn multibyte_text_survives_splitting() {
        assert_eq!(html("crème **brûlée**\n- 🍮"), "<p>crème <strong>brûlée</strong><br>• 🍮</p>");
    }
}

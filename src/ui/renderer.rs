use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::core::widget::SessionPhase;
use crate::ui::chat_loop::ChatApp;
use crate::ui::markup::transcript_lines;
use crate::ui::wrap::wrap_lines;

const FIELD_HEIGHT: u16 = 3;

pub fn ui(f: &mut Frame, app: &mut ChatApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(FIELD_HEIGHT),
        ])
        .split(f.area());

    f.render_widget(Paragraph::new(status_line(app)), chunks[0]);

    let lines = wrap_lines(
        &transcript_lines(app.widget.log(), app.typing_frame()),
        chunks[1].width,
    );
    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let scroll_offset = app
        .widget
        .log_mut()
        .scroll_offset(total, chunks[1].height);

    let transcript = Paragraph::new(lines).scroll((scroll_offset, 0));
    f.render_widget(transcript, chunks[1]);

    f.render_widget(&app.name_input, chunks[2]);
    f.render_widget(&app.message_input, chunks[3]);

    if let Some(alert) = &app.alert {
        render_alert(f, alert);
    }
}

fn status_line(app: &ChatApp) -> Line<'static> {
    let state = app.widget.state();
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = vec![
        Span::styled(
            format!("Sous v{}", env!("CARGO_PKG_VERSION")),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" • {} • ", app.base_url), dim),
    ];

    match (state.phase(), state.current_user()) {
        (_, Some(user)) => {
            spans.push(Span::raw(format!("Signed in as {user}")));
            if let Some(thread) = state.thread_id() {
                spans.push(Span::styled(format!(" • thread {thread}"), dim));
            }
        }
        (SessionPhase::Starting { user_id, .. }, None) => {
            spans.push(Span::raw(format!("Starting session for {user_id}…")));
        }
        (SessionPhase::Failed, None) => spans.push(Span::styled(
            "Session failed, press Enter to retry",
            Style::default().fg(Color::Red),
        )),
        _ => spans.push(Span::raw("Not signed in")),
    }

    let queued = app.widget.queued_chats();
    if queued > 0 {
        spans.push(Span::styled(format!(" • {queued} queued"), dim));
    }

    Line::from(spans)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_alert(f: &mut Frame, text: &str) {
    let area = f.area();
    let width = area.width.saturating_sub(8).clamp(20, 70);
    let body: Vec<Line> = text.split('\n').map(Line::from).collect();
    let mut lines = wrap_lines(&body, width.saturating_sub(2));
    lines.push(Line::default());
    let height = u16::try_from(lines.len() + 2).unwrap_or(u16::MAX);
    let rect = centered(area, width, height);

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title("Notice (press any key)"),
    );
    f.render_widget(Clear, rect);
    f.render_widget(popup, rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn row_text(terminal: &Terminal<TestBackend>, y: u16) -> String {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    /// Last row of the transcript area for a terminal of `height` rows.
    fn transcript_bottom(height: u16) -> u16 {
        height - 2 * FIELD_HEIGHT - 1
    }

    #[test]
    fn newest_message_stays_visible_when_words_fill_rows_exactly() {
        let mut app = ChatApp::new("http://localhost:8000", None);
        for _ in 0..3 {
            app.widget
                .add_message(Role::Assistant, "aaaaaa bbbbbb cccccc dddddd eeeeee ffffff");
        }
        app.widget.add_message(Role::User, "LAST");

        let mut terminal = Terminal::new(TestBackend::new(7, 20)).expect("terminal");
        terminal.draw(|f| ui(f, &mut app)).expect("draw");

        let bottom = transcript_bottom(20);
        assert_eq!(row_text(&terminal, bottom), "LAST");
        assert_eq!(row_text(&terminal, bottom - 1), "You");
        assert_eq!(row_text(&terminal, bottom - 3), "ffffff");
    }

    #[test]
    fn newest_message_stays_visible_after_wide_characters() {
        let mut app = ChatApp::new("http://localhost:8000", None);
        for _ in 0..4 {
            app.widget
                .add_message(Role::Assistant, "日本語のテキストです 日本語のテキストです");
        }
        app.widget.add_message(Role::User, "END");

        let mut terminal = Terminal::new(TestBackend::new(7, 16)).expect("terminal");
        terminal.draw(|f| ui(f, &mut app)).expect("draw");

        assert_eq!(row_text(&terminal, transcript_bottom(16)), "END");
    }

    #[test]
    fn typing_indicator_is_the_bottom_row() {
        let mut app = ChatApp::new("http://localhost:8000", None);
        for _ in 0..5 {
            app.widget.add_message(Role::User, "        indented words wrap here");
        }
        app.widget.begin_start_session("ana").expect("start");

        let mut terminal = Terminal::new(TestBackend::new(12, 18)).expect("terminal");
        terminal.draw(|f| ui(f, &mut app)).expect("draw");

        let bottom = row_text(&terminal, transcript_bottom(18));
        assert!(bottom.starts_with("Assistant "), "bottom row was {bottom:?}");
    }

    #[test]
    fn draws_transcript_fields_and_status() {
        let mut app = ChatApp::new("http://localhost:8000", Some("ana"));
        app.widget.add_message(Role::Assistant, "**Welcome** to the kitchen");

        let mut terminal = Terminal::new(TestBackend::new(60, 16)).expect("terminal");
        terminal.draw(|f| ui(f, &mut app)).expect("draw");
        let screen = screen_text(&terminal);

        assert!(screen.contains("Not signed in"));
        assert!(screen.contains("Welcome to the kitchen"));
        assert!(!screen.contains("**"));
        assert!(screen.contains("Name (Enter to start)"));
        assert!(screen.contains("ana"));
    }

    #[test]
    fn alert_is_drawn_over_the_transcript() {
        let mut app = ChatApp::new("http://localhost:8000", None);
        app.alert = Some("Please enter your name to start.".to_string());

        let mut terminal = Terminal::new(TestBackend::new(60, 16)).expect("terminal");
        terminal.draw(|f| ui(f, &mut app)).expect("draw");

        assert!(screen_text(&terminal).contains("Please enter your name to start."));
    }
}

//! Screen layout
//!
//! ```text
//! ┌ Search Form ─────────┐┌ User Information ─────────────────────┐
//! │GitHub Username: octo_││                                       │
//! │                      ││Github User Information:               │
//! │ [ Search ] [ Quit ]  ││                                       │
//! │                      ││Login: octocat                         │
//! │Searching for octo... ││...                                    │
//! └──────────────────────┘└───────────────────────────────────────┘
//! ```

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::client::Transport;
use crate::controller::{Controller, Focus, LookupState};

const INPUT_LABEL: &str = "GitHub Username: ";

pub fn render<T: Transport>(frame: &mut Frame, controller: &Controller<T>) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)])
        .split(frame.area());

    render_form(frame, controller, chunks[0]);
    render_output(frame, controller, chunks[1]);
}

fn render_form<T: Transport>(frame: &mut Frame, controller: &Controller<T>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Search Form ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Input
            Constraint::Length(1),
            Constraint::Length(1), // Buttons
            Constraint::Length(1),
            Constraint::Min(1), // Status
        ])
        .split(inner);

    let input_focused = controller.focus() == Focus::Input;
    let input_style = if input_focused {
        Style::default().add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default()
    };
    let input = Line::from(vec![
        Span::styled(INPUT_LABEL, Style::default().fg(Color::Yellow)),
        Span::styled(controller.input(), input_style),
    ]);
    frame.render_widget(Paragraph::new(input), rows[0]);

    if input_focused {
        if let Some(x) = cursor_column(rows[0], controller.input(), controller.cursor()) {
            frame.set_cursor_position((x, rows[0].y));
        }
    }

    let buttons = Line::from(vec![
        Span::raw(" "),
        button("Search", controller.focus() == Focus::Search),
        Span::raw(" "),
        button("Quit", controller.focus() == Focus::Quit),
    ]);
    frame.render_widget(Paragraph::new(buttons), rows[2]);

    let status = match controller.state() {
        LookupState::Idle => "Enter: search │ Tab: next │ Esc: quit".to_string(),
        LookupState::Busy { username, .. } => format!("Searching for {username}..."),
    };
    frame.render_widget(
        Paragraph::new(status)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true }),
        rows[4],
    );
}

/// Terminal column of the input cursor, or `None` when it falls outside `area`.
fn cursor_column(area: Rect, input: &str, cursor: usize) -> Option<u16> {
    let typed: String = input.chars().take(cursor).collect();
    let offset = INPUT_LABEL.width() + typed.width();
    let x = area
        .x
        .saturating_add(u16::try_from(offset).unwrap_or(u16::MAX));
    (x < area.right()).then_some(x)
}

fn button(label: &str, focused: bool) -> Span<'static> {
    let style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    Span::styled(format!("[ {label} ]"), style)
}

fn render_output<T: Transport>(frame: &mut Frame, controller: &Controller<T>, area: Rect) {
    let output = Paragraph::new(controller.output())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" User Information "),
        )
        .wrap(Wrap { trim: false })
        .scroll((controller.scroll(), 0));

    frame.render_widget(output, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::MockTransport;
    use crate::client::Fetcher;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{Terminal, backend::TestBackend, layout::Position};
    use std::thread;
    use std::time::{Duration, Instant};
    use tokio::runtime::Runtime;

    fn screen_text<T: Transport>(controller: &Controller<T>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 14)).unwrap();
        terminal.draw(|f| render(f, controller)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn controller(rt: &Runtime, transport: MockTransport) -> Controller<MockTransport> {
        Controller::new(
            Fetcher::new(transport, "https://api.github.com"),
            rt.handle().clone(),
        )
    }

    #[test]
    fn cursor_column_counts_display_width() {
        let area = Rect::new(1, 1, 28, 1);

        assert_eq!(cursor_column(area, "", 0), Some(18));
        assert_eq!(cursor_column(area, "octocat", 3), Some(21));
        assert_eq!(cursor_column(area, "日本", 2), Some(22));
        assert_eq!(cursor_column(area, "日本", 1), Some(20));
    }

    #[test]
    fn cursor_column_hides_cursor_past_the_edge() {
        let area = Rect::new(u16::MAX - 30, 0, 28, 1);
        let long = "x".repeat(100_000);

        assert_eq!(cursor_column(area, &long, 100_000), None);
        assert_eq!(cursor_column(Rect::new(1, 1, 28, 1), "abcdefghijk", 11), None);
    }

    #[test]
    fn cursor_follows_wide_characters() {
        let rt = Runtime::new().unwrap();
        let mut c = controller(&rt, MockTransport::ok("{}"));
        for ch in "日本".chars() {
            c.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }

        let mut terminal = Terminal::new(TestBackend::new(90, 14)).unwrap();
        terminal.draw(|f| render(f, &c)).unwrap();

        assert_eq!(terminal.get_cursor_position().unwrap(), Position::new(22, 1));
    }

    #[test]
    fn idle_screen_shows_form_and_panels() {
        let rt = Runtime::new().unwrap();
        let c = controller(&rt, MockTransport::ok("{}"));

        let text = screen_text(&c);

        assert!(text.contains("Search Form"));
        assert!(text.contains("User Information"));
        assert!(text.contains("GitHub Username:"));
        assert!(text.contains("[ Search ]"));
        assert!(text.contains("[ Quit ]"));
    }

    #[test]
    fn profile_text_appears_in_output_panel() {
        let rt = Runtime::new().unwrap();
        let body = r#"{"login":"octocat","name":"The Octocat","location":"San Francisco","followers":5000,"following":9}"#;
        let mut c = controller(&rt, MockTransport::ok(body));

        for ch in "octocat".chars() {
            c.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }
        c.search();
        assert!(screen_text(&c).contains("Searching for octocat..."));

        let deadline = Instant::now() + Duration::from_secs(5);
        while c.is_busy() {
            assert!(Instant::now() < deadline, "lookup never finished");
            thread::sleep(Duration::from_millis(5));
            c.poll_results();
        }

        let text = screen_text(&c);
        assert!(text.contains("GitHub Username: octocat"));
        assert!(text.contains("Github User Information:"));
        assert!(text.contains("Login: octocat"));
        assert!(text.contains("Followers: 5000"));
        assert!(text.contains("Following: 9"));
    }
}

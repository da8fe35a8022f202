//! Terminal setup and the event loop

use std::io::{self, Stdout};
use std::panic;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    cursor, event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::runtime::Runtime;

use crate::client::{Fetcher, HttpTransport, Transport};
use crate::config::Config;
use crate::controller::Controller;
use crate::ui;

const TICK: Duration = Duration::from_millis(50);

/// Run the TUI until the user quits
pub fn run(config: &Config) -> Result<()> {
    // Background tokio runtime for async HTTP
    let rt = Runtime::new().context("Failed to start async runtime")?;
    let transport = HttpTransport::new(config)?;
    let mut controller = Controller::new(
        Fetcher::new(transport, config.api_url.as_str()),
        rt.handle().clone(),
    );

    install_panic_hook();
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e).context("Failed to enter alternate screen");
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            return Err(e).context("Failed to initialise terminal");
        }
    };

    info!("started against {}", config.api_url);
    let result = run_loop(&mut terminal, &mut controller);
    let restored = restore_terminal(&mut terminal);

    result?;
    restored
}

/// Leaves raw mode and the alternate screen if the process panics mid-draw.
fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
        default_hook(info);
    }));
}

/// Runs every restore step, then reports the first that failed.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    first_failure([
        ("Failed to disable raw mode", disable_raw_mode()),
        (
            "Failed to leave alternate screen",
            execute!(terminal.backend_mut(), LeaveAlternateScreen),
        ),
        ("Failed to show cursor", terminal.show_cursor()),
    ])
}

fn first_failure<const N: usize>(steps: [(&'static str, io::Result<()>); N]) -> Result<()> {
    for (what, step) in steps {
        step.context(what)?;
    }
    Ok(())
}

fn run_loop<T: Transport>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    controller: &mut Controller<T>,
) -> Result<()> {
    loop {
        controller.poll_results();

        terminal.draw(|f| ui::render(f, controller))?;

        if event::poll(TICK)? {
            controller.handle_event(event::read()?);
        }

        if controller.should_quit() {
            info!("quit requested");
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_failure_reports_earliest_error() {
        let err = first_failure([
            ("disable", Ok(())),
            ("leave", Err(io::Error::other("not a tty"))),
            ("show", Err(io::Error::other("closed"))),
        ])
        .unwrap_err();

        assert_eq!(err.to_string(), "leave");
        assert_eq!(format!("{err:#}"), "leave: not a tty");
    }

    #[test]
    fn first_failure_is_ok_when_every_step_is() {
        assert!(first_failure([("disable", Ok(())), ("show", Ok(()))]).is_ok());
    }
}

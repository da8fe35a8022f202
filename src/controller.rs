//! Owns the interactive state and turns key presses into lookups.
//!
//! Lookups run on the tokio runtime; results come back over a channel and are
//! applied by [`Controller::poll_results`] on the event-loop thread. Every
//! lookup gets a fresh request id and only the newest id may touch the output.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::client::{FetchError, Fetcher, Transport};
use crate::models::ProfileRecord;
use crate::render::{render_error, render_profile};

const PAGE_SCROLL: u16 = 10;

/// Which widget receives key presses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Input,
    Search,
    Quit,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Input => Focus::Search,
            Focus::Search => Focus::Quit,
            Focus::Quit => Focus::Input,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Input => Focus::Quit,
            Focus::Search => Focus::Input,
            Focus::Quit => Focus::Search,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupState {
    Idle,
    Busy { username: String },
}

/// Sent back from a lookup task.
#[derive(Debug)]
struct LookupResult {
    request_id: u64,
    result: Result<ProfileRecord, FetchError>,
}

pub struct Controller<T> {
    fetcher: Arc<Fetcher<T>>,
    runtime: Handle,
    /// Username being typed
    input: String,
    /// Cursor position in `input`, counted in chars
    cursor: usize,
    /// Text of the output panel
    output: String,
    /// First visible output line
    scroll: u16,
    focus: Focus,
    state: LookupState,
    should_quit: bool,
    /// Id of the most recent lookup
    request_counter: u64,
    in_flight: Option<JoinHandle<()>>,
    result_tx: Sender<LookupResult>,
    result_rx: Receiver<LookupResult>,
}

impl<T: Transport> Controller<T> {
    pub fn new(fetcher: Fetcher<T>, runtime: Handle) -> Self {
        let (result_tx, result_rx) = mpsc::channel();

        Self {
            fetcher: Arc::new(fetcher),
            runtime,
            input: String::new(),
            cursor: 0,
            output: String::new(),
            scroll: 0,
            focus: Focus::default(),
            state: LookupState::Idle,
            should_quit: false,
            request_counter: 0,
            in_flight: None,
            result_tx,
            result_rx,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, LookupState::Busy { .. })
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            self.handle_key(key);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => self.quit(),
            (KeyCode::Tab, _) => self.focus = self.focus.next(),
            (KeyCode::BackTab, _) => self.focus = self.focus.prev(),
            (KeyCode::PageUp, _) => self.scroll_up(PAGE_SCROLL),
            (KeyCode::PageDown, _) => self.scroll_down(PAGE_SCROLL),
            _ => match self.focus {
                Focus::Input => self.handle_input_key(key),
                Focus::Search | Focus::Quit => self.handle_button_key(key),
            },
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.search(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.input.clear();
                self.cursor = 0;
            }
            (KeyCode::Char(c), m) if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                let at = self.byte_index();
                self.input.insert(at, c);
                self.cursor += 1;
            }
            (KeyCode::Backspace, _) if self.cursor > 0 => {
                self.cursor -= 1;
                let at = self.byte_index();
                self.input.remove(at);
            }
            (KeyCode::Delete, _) if self.cursor < self.input.chars().count() => {
                let at = self.byte_index();
                self.input.remove(at);
            }
            (KeyCode::Left, _) => self.cursor = self.cursor.saturating_sub(1),
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.input.chars().count());
            }
            (KeyCode::Home, _) => self.cursor = 0,
            (KeyCode::End, _) => self.cursor = self.input.chars().count(),
            _ => {}
        }
    }

    fn handle_button_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => match self.focus {
                Focus::Search => self.search(),
                Focus::Quit => self.quit(),
                Focus::Input => {}
            },
            KeyCode::Left => self.focus = self.focus.prev(),
            KeyCode::Right => self.focus = self.focus.next(),
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            _ => {}
        }
    }

    /// Starts a lookup for the current input, superseding any lookup in flight.
    pub fn search(&mut self) {
        self.request_counter += 1;
        let request_id = self.request_counter;
        let username = self.input.clone();

        if let Some(handle) = self.in_flight.take() {
            debug!("lookup #{} superseded by #{request_id}", request_id - 1);
            handle.abort();
        }
        info!("lookup #{request_id} for {username:?}");

        let fetcher = Arc::clone(&self.fetcher);
        let result_tx = self.result_tx.clone();
        let query = username.clone();
        self.in_flight = Some(self.runtime.spawn(async move {
            let result = fetcher.fetch(&query).await;
            let _ = result_tx.send(LookupResult { request_id, result });
        }));

        self.state = LookupState::Busy { username };
        self.focus = Focus::Input;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Applies finished lookups without blocking. Stale results are dropped.
    pub fn poll_results(&mut self) {
        while let Ok(LookupResult { request_id, result }) = self.result_rx.try_recv() {
            if request_id != self.request_counter {
                debug!("discarding stale result of lookup #{request_id}");
                continue;
            }

            self.output = match result {
                Ok(user) => render_profile(&user),
                Err(err) => {
                    warn!("lookup #{request_id} failed: {err}");
                    render_error(&err)
                }
            };
            self.scroll = 0;
            self.state = LookupState::Idle;
            self.in_flight = None;
        }
    }

    fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    fn scroll_down(&mut self, lines: u16) {
        let last = u16::try_from(self.output.lines().count().saturating_sub(1)).unwrap_or(u16::MAX);
        self.scroll = self.scroll.saturating_add(lines).min(last);
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor)
            .map_or(self.input.len(), |(i, _)| i)
    }
}

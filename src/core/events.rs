//! Terminal input, UI ticks and key bindings

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;
use tokio::sync::mpsc;

/// Events the render/input task reacts to besides new frames
#[derive(Debug, Clone)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Redraw tick, also expires command line messages.
    Tick,
}

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    pub fn new() -> (Self, mpsc::UnboundedSender<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, tx)
    }

    /// Start all event source tasks
    pub fn spawn_sources(event_tx: mpsc::UnboundedSender<Event>) {
        tokio::spawn(Self::terminal_events(event_tx.clone()));

        // Fast enough for message expiry; frames trigger their own redraws.
        tokio::spawn(Self::tick_events(event_tx, Duration::from_millis(250)));
    }

    async fn terminal_events(tx: mpsc::UnboundedSender<Event>) {
        use crossterm::event::{self, Event as CrosstermEvent};
        use futures::StreamExt;

        let mut reader = event::EventStream::new();
        while let Some(event_result) = reader.next().await {
            let event = match event_result {
                Ok(CrosstermEvent::Key(key)) => Event::Key(key),
                Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "terminal event stream failed");
                    break;
                }
            };
            if tx.send(event).is_err() {
                break;
            }
        }
    }

    async fn tick_events(tx: mpsc::UnboundedSender<Event>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if tx.send(Event::Tick).is_err() {
                break;
            }
        }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Key binding helper
pub struct KeyBinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    /// Shift is ignored for characters since it is already in the char.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        let modifiers = match event.code {
            KeyCode::Char(_) => event.modifiers - KeyModifiers::SHIFT,
            _ => event.modifiers,
        };
        event.code == self.key && modifiers == self.modifiers
    }
}

/// What a key asks the dashboard to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    ShowView(&'static str),
    CycleStatements,
    CycleProgress,
    OrderLeft,
    OrderRight,
    FlipOrder,
    StartFilter,
    ToggleExtra,
    ToggleDisks,
    Help,
}

/// Views reachable by a single key
const VIEW_KEYS: &[(char, &str)] = &[
    ('d', "databases"),
    ('r', "replication"),
    ('t', "tables"),
    ('i', "indexes"),
    ('s', "sizes"),
    ('f', "functions"),
    ('a', "activity"),
];

pub const STATEMENTS_VIEWS: &[&str] = &[
    "statements_timings",
    "statements_general",
    "statements_io",
    "statements_temp",
    "statements_local",
];

pub const PROGRESS_VIEWS: &[&str] = &["progress_vacuum", "progress_cluster", "progress_index"];

/// Standard key bindings
pub struct KeyBindings;

impl KeyBindings {
    pub fn quit() -> KeyBinding {
        KeyBinding::new(KeyCode::Char('q'))
    }

    pub fn quit_alt() -> KeyBinding {
        KeyBinding::ctrl(KeyCode::Char('c'))
    }

    pub fn help() -> KeyBinding {
        KeyBinding::new(KeyCode::Char('?'))
    }

    pub fn escape() -> KeyBinding {
        KeyBinding::new(KeyCode::Esc)
    }

    pub fn enter() -> KeyBinding {
        KeyBinding::new(KeyCode::Enter)
    }

    /// Map a key pressed on the dashboard to a command.
    pub fn command(key: &KeyEvent) -> Option<Command> {
        if Self::quit().matches(key) || Self::quit_alt().matches(key) {
            return Some(Command::Quit);
        }
        if Self::help().matches(key) {
            return Some(Command::Help);
        }
        if !(key.modifiers - KeyModifiers::SHIFT).is_empty() {
            return None;
        }

        match key.code {
            KeyCode::Left => Some(Command::OrderLeft),
            KeyCode::Right => Some(Command::OrderRight),
            KeyCode::Char('x') => Some(Command::CycleStatements),
            KeyCode::Char('p') => Some(Command::CycleProgress),
            KeyCode::Char('o') => Some(Command::FlipOrder),
            KeyCode::Char('/') => Some(Command::StartFilter),
            KeyCode::Char('E') => Some(Command::ToggleExtra),
            KeyCode::Char('B') => Some(Command::ToggleDisks),
            KeyCode::Char(c) => VIEW_KEYS
                .iter()
                .find(|(k, _)| *k == c)
                .map(|&(_, view)| Command::ShowView(view)),
            _ => None,
        }
    }

    /// Key hints for the help overlay.
    pub fn help_entries() -> Vec<(&'static str, &'static str)> {
        vec![
            ("d r t i s f a", "databases, replication, tables, indexes, sizes, functions, activity"),
            ("x", "cycle statements views"),
            ("p", "cycle progress views"),
            ("Left / Right", "change order column"),
            ("o", "flip sort order"),
            ("/", "filter on order column (empty clears)"),
            ("E", "toggle full column widths"),
            ("B", "toggle disk statistics"),
            ("?", "help"),
            ("q / Ctrl-C", "quit"),
        ]
    }
}

//! Render/input task state: current view, display tweaks and the last frame

use crossterm::event::{KeyCode, KeyEvent};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::events::{Command, EventResult, KeyBindings, PROGRESS_VIEWS, STATEMENTS_VIEWS};
use crate::core::frame::{Frame, StatFrame, ViewResult};
use crate::integrations::postgres::CapabilityProfile;
use crate::ui::theme::Theme;
use crate::view::{ViewDefinition, Views};

/// Top-level application mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppMode {
    #[default]
    Dashboard,
    /// Typing a filter pattern for the order column
    Filter { input: String },
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Error,
}

/// Text on the command line until `expires`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdlineMessage {
    pub text: String,
    pub level: MessageLevel,
    pub expires: Instant,
}

pub struct AppState {
    pub mode: AppMode,
    pub theme: Theme,
    pub profile: CapabilityProfile,
    /// Display copy of the registry; the collector's copy is never touched.
    pub views: Views,
    pub current: &'static str,
    /// Last successful frame. Failed frames only raise a message.
    pub frame: Option<Arc<Frame>>,
    pub message: Option<CmdlineMessage>,
    pub show_disks: bool,
    /// The server runs on this machine, so the host summary describes it.
    pub server_is_local: bool,
    message_lifetime: Duration,
}

impl AppState {
    pub fn new(
        views: Views,
        profile: CapabilityProfile,
        theme: Theme,
        show_disks: bool,
        message_lifetime: Duration,
    ) -> Self {
        let current = views.names().next().unwrap_or("databases");
        Self {
            mode: AppMode::Dashboard,
            theme,
            profile,
            views,
            current,
            frame: None,
            message: None,
            show_disks,
            server_is_local: true,
            message_lifetime,
        }
    }

    pub fn current_view(&self) -> Option<&ViewDefinition> {
        self.views.get(self.current)
    }

    fn current_view_mut(&mut self) -> Option<&mut ViewDefinition> {
        self.views.get_mut(self.current)
    }

    pub fn stats(&self) -> Option<&StatFrame> {
        match self.frame.as_deref() {
            Some(Frame::Stats(stats)) => Some(stats),
            _ => None,
        }
    }

    pub fn current_result(&self) -> Option<&ViewResult> {
        self.stats()?.views.get(self.current)
    }

    pub fn notify(&mut self, text: impl Into<String>, level: MessageLevel) {
        self.message = Some(CmdlineMessage {
            text: text.into(),
            level,
            expires: Instant::now() + self.message_lifetime,
        });
    }

    pub fn remove_expired_message(&mut self, now: Instant) {
        if self.message.as_ref().is_some_and(|m| m.expires <= now) {
            self.message = None;
        }
    }

    /// Take in a new frame from the collector.
    pub fn apply_frame(&mut self, frame: Arc<Frame>) {
        let stats = match frame.as_ref() {
            Frame::Failed { error, .. } => {
                self.notify(error.clone(), MessageLevel::Error);
                return;
            }
            Frame::Stats(stats) => stats,
        };
        if let Some(ViewResult::Rows(rows)) = stats.views.get(self.current) {
            if let Some(view) = self.views.get_mut(self.current) {
                view.align(rows);
            }
        }
        self.frame = Some(frame);
    }

    pub fn switch_view(&mut self, name: &'static str) {
        let Some(view) = self.views.get_mut(name) else {
            return;
        };
        view.reset_widths();
        let description = view.description;
        self.current = name;
        self.notify(description, MessageLevel::Info);

        // Align right away instead of waiting for the next frame.
        if let Some(ViewResult::Rows(rows)) = self
            .frame
            .as_deref()
            .and_then(|f| match f {
                Frame::Stats(stats) => stats.views.get(name),
                Frame::Failed { .. } => None,
            })
            .cloned()
        {
            if let Some(view) = self.views.get_mut(name) {
                view.align(&rows);
            }
        }
    }

    /// Next view of `group` after the current one, or its first.
    fn cycle_group(&mut self, group: &[&'static str]) {
        let next = group
            .iter()
            .position(|v| *v == self.current)
            .map(|i| group[(i + 1) % group.len()])
            .unwrap_or(group[0]);
        self.switch_view(next);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EventResult {
        match self.mode.clone() {
            AppMode::Dashboard => match KeyBindings::command(&key) {
                Some(command) => self.run_command(command),
                None => EventResult::Continue,
            },
            AppMode::Filter { input } => {
                self.handle_filter_key(key, input);
                EventResult::Continue
            }
            AppMode::Help => {
                if KeyBindings::escape().matches(&key)
                    || KeyBindings::help().matches(&key)
                    || KeyBindings::quit().matches(&key)
                {
                    self.mode = AppMode::Dashboard;
                }
                EventResult::Continue
            }
        }
    }

    pub fn run_command(&mut self, command: Command) -> EventResult {
        match command {
            Command::Quit => return EventResult::Quit,
            Command::ShowView(name) => self.switch_view(name),
            Command::CycleStatements => self.cycle_group(STATEMENTS_VIEWS),
            Command::CycleProgress => self.cycle_group(PROGRESS_VIEWS),
            Command::OrderLeft => {
                if let Some(view) = self.current_view_mut() {
                    view.shift_order(-1);
                }
            }
            Command::OrderRight => {
                if let Some(view) = self.current_view_mut() {
                    view.shift_order(1);
                }
            }
            Command::FlipOrder => {
                if let Some(view) = self.current_view_mut() {
                    view.flip_order();
                }
            }
            Command::StartFilter => {
                let input = self
                    .current_view()
                    .and_then(|v| v.filters().get(&v.order_key))
                    .map(|f| f.as_str().to_string())
                    .unwrap_or_default();
                self.mode = AppMode::Filter { input };
            }
            Command::ToggleExtra => {
                if let Some(view) = self.current_view_mut() {
                    view.show_extra = !view.show_extra;
                }
            }
            Command::ToggleDisks => self.show_disks = !self.show_disks,
            Command::Help => self.mode = AppMode::Help,
        }
        EventResult::Continue
    }

    fn handle_filter_key(&mut self, key: KeyEvent, mut input: String) {
        if KeyBindings::escape().matches(&key) {
            self.mode = AppMode::Dashboard;
            return;
        }
        if KeyBindings::enter().matches(&key) {
            self.mode = AppMode::Dashboard;
            self.apply_filter(&input);
            return;
        }
        match key.code {
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            _ => {}
        }
        self.mode = AppMode::Filter { input };
    }

    fn apply_filter(&mut self, pattern: &str) {
        let Some(view) = self.current_view_mut() else {
            return;
        };
        let column = view.order_key;
        match view.set_filter(column, pattern) {
            Ok(()) if pattern.is_empty() => self.notify("Filter cleared", MessageLevel::Info),
            Ok(()) => self.notify(format!("Filter: /{}/", pattern), MessageLevel::Info),
            Err(e) => {
                tracing::debug!(%pattern, error = %e, "invalid filter");
                self.notify(format!("Invalid filter: {}", e), MessageLevel::Error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::DiskPanel;
    use crate::integrations::postgres::{Features, RowSet};
    use crate::integrations::system::HostSummary;
    use chrono::Local;
    use crossterm::event::KeyModifiers;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn state() -> AppState {
        let profile = CapabilityProfile {
            version: 150000,
            in_recovery: false,
            features: Features::default(),
            application_name: "pgtop".to_string(),
        };
        let mut views = Views::builtin(Duration::from_secs(1));
        views.configure(&profile).unwrap();
        AppState::new(
            views,
            profile,
            Theme::default(),
            true,
            Duration::from_secs(2),
        )
    }

    fn stats_frame(view: &'static str, rows: RowSet) -> Arc<Frame> {
        let mut views = IndexMap::new();
        views.insert(view, ViewResult::Rows(rows));
        Arc::new(Frame::Stats(StatFrame {
            taken_at: Local::now(),
            host: HostSummary::default(),
            disks: DiskPanel::Pending,
            views,
        }))
    }

    fn press(state: &mut AppState, code: KeyCode) -> EventResult {
        state.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn starts_on_first_view() {
        assert_eq!(state().current, "databases");
    }

    #[test]
    fn switching_views_shows_description() {
        let mut s = state();
        press(&mut s, KeyCode::Char('a'));
        assert_eq!(s.current, "activity");
        assert_eq!(
            s.message.as_ref().map(|m| m.text.as_str()),
            Some("Show activity statistics")
        );
    }

    #[test]
    fn statements_key_cycles_through_group() {
        let mut s = state();
        press(&mut s, KeyCode::Char('x'));
        assert_eq!(s.current, "statements_timings");
        press(&mut s, KeyCode::Char('x'));
        assert_eq!(s.current, "statements_general");
        for _ in 0..4 {
            press(&mut s, KeyCode::Char('x'));
        }
        assert_eq!(s.current, "statements_timings");
    }

    #[test]
    fn failed_frame_keeps_last_good_frame() {
        let mut s = state();
        let good = stats_frame("databases", RowSet::default());
        s.apply_frame(good.clone());
        s.apply_frame(Arc::new(Frame::failed("connection error: gone")));

        assert_eq!(s.frame, Some(good));
        let message = s.message.as_ref().unwrap();
        assert_eq!(message.level, MessageLevel::Error);
        assert_eq!(message.text, "connection error: gone");
    }

    #[test]
    fn messages_expire() {
        let mut s = state();
        s.notify("hello", MessageLevel::Info);
        s.remove_expired_message(Instant::now());
        assert!(s.message.is_some());
        s.remove_expired_message(Instant::now() + Duration::from_secs(3));
        assert!(s.message.is_none());
    }

    #[test]
    fn filter_input_applies_on_enter() {
        let mut s = state();
        press(&mut s, KeyCode::Char('/'));
        for c in "^post".chars() {
            press(&mut s, KeyCode::Char(c));
        }
        assert_eq!(
            s.mode,
            AppMode::Filter {
                input: "^post".to_string()
            }
        );
        press(&mut s, KeyCode::Enter);

        assert_eq!(s.mode, AppMode::Dashboard);
        let view = s.current_view().unwrap();
        assert_eq!(view.filters().get(&0).map(|f| f.as_str()), Some("^post"));
    }

    #[test]
    fn invalid_filter_reports_error() {
        let mut s = state();
        press(&mut s, KeyCode::Char('/'));
        press(&mut s, KeyCode::Char('('));
        press(&mut s, KeyCode::Enter);

        assert!(s.current_view().unwrap().filters().is_empty());
        assert_eq!(s.message.as_ref().unwrap().level, MessageLevel::Error);
    }

    #[test]
    fn order_keys_change_display_copy_only() {
        let mut s = state();
        press(&mut s, KeyCode::Right);
        press(&mut s, KeyCode::Char('o'));
        let view = s.current_view().unwrap();
        assert_eq!(view.order_key, 1);
        assert!(!view.order_desc);
    }

    #[test]
    fn frames_align_current_view() {
        let mut s = state();
        let rows = RowSet {
            columns: vec!["database".into()],
            rows: vec![vec!["a_rather_long_database_name".into()]],
        };
        s.apply_frame(stats_frame("databases", rows));
        assert_eq!(s.current_view().unwrap().column_width(0), 27);
    }

    #[test]
    fn help_and_quit() {
        let mut s = state();
        press(&mut s, KeyCode::Char('?'));
        assert_eq!(s.mode, AppMode::Help);
        assert_eq!(press(&mut s, KeyCode::Esc), EventResult::Continue);
        assert_eq!(s.mode, AppMode::Dashboard);
        assert_eq!(press(&mut s, KeyCode::Char('q')), EventResult::Quit);
    }
}

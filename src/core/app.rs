//! Render/input task: owns the terminal, consumes frames, handles keys

use anyhow::Result;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::Stdout;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::collector::FrameReceiver;
use crate::core::events::{Event, EventHandler, EventResult};
use crate::core::state::{AppState, MessageLevel};
use crate::ui::renderer::Renderer;

pub struct App {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    state: AppState,
    token: CancellationToken,
}

impl App {
    pub fn new(state: AppState, token: CancellationToken) -> Result<Self> {
        let backend = CrosstermBackend::new(std::io::stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            state,
            token,
        })
    }

    /// Run until the user quits. Cancels the collector and restores the
    /// terminal however the run ends.
    pub async fn run(&mut self, mut frames: FrameReceiver) -> Result<()> {
        let result = self.drive(&mut frames).await;
        finish(result, &self.token, restore_terminal)
    }

    async fn drive(&mut self, frames: &mut FrameReceiver) -> Result<()> {
        setup_terminal()?;

        let (mut event_handler, event_tx) = EventHandler::new();
        EventHandler::spawn_sources(event_tx);

        self.render()?;
        self.event_loop(&mut event_handler, frames).await
    }

    async fn event_loop(
        &mut self,
        event_handler: &mut EventHandler,
        frames: &mut FrameReceiver,
    ) -> Result<()> {
        let mut collector_alive = true;

        loop {
            tokio::select! {
                event = event_handler.next() => {
                    let Some(event) = event else {
                        break;
                    };
                    if self.handle_event(event)? == EventResult::Quit {
                        break;
                    }
                }
                changed = frames.changed(), if collector_alive => {
                    match changed {
                        Ok(()) => {
                            let frame = frames.borrow_and_update().clone();
                            if let Some(frame) = frame {
                                self.state.apply_frame(frame);
                            }
                        }
                        Err(_) => {
                            // Sender dropped: the collector has exited.
                            collector_alive = false;
                            tracing::warn!("collector exited before the UI");
                            self.state
                                .notify("Statistics collection stopped", MessageLevel::Error);
                        }
                    }
                    self.render()?;
                }
            }
        }
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<EventResult> {
        let result = match event {
            Event::Key(key) => self.state.handle_key(key),
            Event::Resize(_, _) => EventResult::Continue,
            Event::Tick => {
                self.state.remove_expired_message(Instant::now());
                EventResult::Continue
            }
        };
        if result == EventResult::Continue {
            self.render()?;
        }
        Ok(result)
    }

    fn render(&mut self) -> Result<()> {
        let state = &self.state;
        self.terminal.draw(|frame| {
            Renderer::render(frame, state);
        })?;
        Ok(())
    }
}

fn setup_terminal() -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::cursor::Hide,
    )?;
    Ok(())
}

fn restore_terminal() -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show,
    )?;
    Ok(())
}

/// Stop the collector and restore the terminal after a run. The run's own
/// error is reported ahead of a restore error.
fn finish(
    result: Result<()>,
    token: &CancellationToken,
    restore: impl FnOnce() -> Result<()>,
) -> Result<()> {
    token.cancel();
    let restored = restore();
    result.and(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn failed_run_still_restores_and_cancels() {
        let token = CancellationToken::new();
        let restored = Cell::new(false);

        let result = finish(Err(anyhow::anyhow!("draw failed")), &token, || {
            restored.set(true);
            Ok(())
        });

        assert_eq!(result.unwrap_err().to_string(), "draw failed");
        assert!(restored.get());
        assert!(token.is_cancelled());
    }

    #[test]
    fn restore_error_surfaces_after_clean_run() {
        let token = CancellationToken::new();
        let result = finish(Ok(()), &token, || Err(anyhow::anyhow!("tty gone")));
        assert_eq!(result.unwrap_err().to_string(), "tty gone");
        assert!(token.is_cancelled());
    }
}

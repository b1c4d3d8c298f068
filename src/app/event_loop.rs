use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tracing::{debug, info};

use crate::app::{App, Busy, Model};

/// Poll interval while a request is in flight, so completions show promptly.
const BUSY_POLL: Duration = Duration::from_millis(50);
const IDLE_POLL: Duration = Duration::from_millis(250);

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized or drawn to.
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal, dropboard requires an interactive terminal")?;
        let _ = execute!(stdout(), EnableBracketedPaste);
        let size = terminal.size()?;
        info!(location = %self.location, "starting");

        let mut model = self.start((size.width, size.height));
        let result = self.event_loop(&mut terminal, &mut model);

        let _ = execute!(stdout(), DisableBracketedPaste);
        ratatui::restore();
        result
    }

    fn event_loop(&self, terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }
            if self.apply_completions(model) {
                needs_render = true;
            }

            if needs_render {
                terminal
                    .draw(|frame| crate::ui::render(model, frame))
                    .context("Failed to draw frame")?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }

            let poll = if model.busy == Busy::Idle {
                IDLE_POLL
            } else {
                BUSY_POLL
            };
            if event::poll(poll)? {
                // Coalesce bursts (key repeat, paste) into a single render.
                loop {
                    if let Some(msg) = Self::handle_event(&event::read()?, model) {
                        debug!(?msg, "message");
                        *model = self.dispatch(std::mem::take(model), msg);
                        needs_render = true;
                    }
                    if !event::poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

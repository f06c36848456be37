pub mod events;
pub mod state;
pub mod ui;

use anyhow::Result;
use log::warn;
use ratatui::DefaultTerminal;
use ratatui::crossterm::event::{self, Event};

use crate::auth::{AuthorizationFlow, Tokens};
use crate::error::{AuthError, DigestError};
use crate::pipeline::GeneratedReport;
use crate::terminal::events::{Action, handle_key};
use crate::terminal::state::AppState;

/// Interactive front end: one key runs the whole pipeline, another exits.
pub fn run_tui(
    generate: &mut dyn FnMut() -> Result<GeneratedReport, DigestError>,
) -> Result<()> {
    let terminal = ratatui::init();
    let result = run(terminal, &mut AppState::new(), generate);
    ratatui::restore();
    result
}

fn run(
    mut terminal: DefaultTerminal,
    state: &mut AppState,
    generate: &mut dyn FnMut() -> Result<GeneratedReport, DigestError>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, state))?;
        let Event::Key(key) = event::read()? else {
            continue;
        };
        match handle_key(key, state) {
            Action::Quit => return Ok(()),
            Action::Generate => {
                state.start_run();
                terminal.draw(|f| ui::render(f, state))?;
                // blocks until the run completes
                let outcome = generate();
                // consent may have left the alternate screen
                terminal.clear()?;
                state.finish_run(outcome);
            }
            Action::None => {}
        }
    }
}

/// Consent flow that runs on the normal screen, so the printed URL stays
/// readable when a run inside the dashboard needs a fresh grant.
pub struct OutsideDashboard {
    inner: Box<dyn AuthorizationFlow>,
}

impl OutsideDashboard {
    pub fn new(inner: Box<dyn AuthorizationFlow>) -> Self {
        Self { inner }
    }
}

impl AuthorizationFlow for OutsideDashboard {
    fn authorize(&self, scopes: &[&str]) -> Result<Tokens, AuthError> {
        ratatui::restore();
        let result = self.inner.authorize(scopes);
        if let Err(e) = ratatui::try_init() {
            warn!("could not re-enter the dashboard: {e}");
        }
        result
    }
}

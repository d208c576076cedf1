use std::fmt::Display;

use color_eyre::Result;
use color_eyre::eyre::eyre;
use ratatui::Terminal;
use ratatui::backend::Backend;

use crate::app::{App, LoopState};
use crate::event::EventSource;
use crate::terminal::{TerminalMode, TerminalSession};
use crate::ui;

/// Refresh interval of the dashboard.
pub const TICK_RATE: std::time::Duration = std::time::Duration::from_secs(5);

/// Drives the dashboard until a quit key, the end of the event stream or a
/// draw error. The terminal is restored before returning in every case.
pub async fn run<B, M, E>(
    terminal: &mut Terminal<B>,
    session: &mut TerminalSession<M>,
    app: &mut App,
    events: &mut E,
) -> Result<()>
where
    B: Backend,
    B::Error: Display,
    M: TerminalMode,
    E: EventSource,
{
    let result = event_loop(terminal, app, events).await;
    session.restore();
    result
}

async fn event_loop<B, E>(terminal: &mut Terminal<B>, app: &mut App, events: &mut E) -> Result<()>
where
    B: Backend,
    B::Error: Display,
    E: EventSource,
{
    draw(terminal, app)?;

    while app.running() {
        let Some(event) = events.next().await else {
            tracing::info!("event stream ended, shutting down");
            break;
        };
        if app.handle_event(event) == LoopState::Rendering {
            draw(terminal, app)?;
            app.rendered();
        }
    }

    Ok(())
}

fn draw<B>(terminal: &mut Terminal<B>, app: &App) -> Result<()>
where
    B: Backend,
    B::Error: Display,
{
    terminal
        .draw(|frame| ui::draw(frame, app))
        .map(|_| ())
        .map_err(|e| eyre!("failed to draw frame: {e}"))
}

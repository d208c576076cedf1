pub mod header;
pub mod process_table;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header::height(app.show_per_core)),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    header::render(frame, chunks[0], &app.frame, &app.theme, app.show_per_core);

    let rows = app
        .frame
        .processes
        .as_ref()
        .map(|_| app.visible_processes());
    process_table::render(frame, chunks[1], rows, &app.theme);

    let total = app.frame.process_count();
    statusbar::render(frame, chunks[2], app.view.visible(total), total, &app.theme);
}

#[cfg(test)]
mod tests;

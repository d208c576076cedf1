use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};

use crate::format::{format_percent, truncate_unicode};
use crate::system::process::ProcessRecord;
use crate::ui::theme::Theme;

const COMMAND_WIDTH: u16 = 24;
const USER_WIDTH: u16 = 12;

const COLUMNS: [(&str, Constraint); 7] = [
    ("PID", Constraint::Length(7)),
    ("%CPU", Constraint::Length(7)),
    ("COMMAND", Constraint::Length(COMMAND_WIDTH)),
    ("TIME", Constraint::Length(10)),
    ("#TH", Constraint::Length(5)),
    ("MEM", Constraint::Length(8)),
    ("USER", Constraint::Min(USER_WIDTH)),
];

/// `rows` is the visible page, already sorted. `None` means the process
/// section failed this pass.
pub fn render(frame: &mut Frame, area: Rect, rows: Option<&[ProcessRecord]>, theme: &Theme) {
    let Some(rows) = rows else {
        let line = Line::from(Span::styled(
            " process list unavailable (--)",
            Style::default().fg(theme.placeholder),
        ));
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let header = Row::new(COLUMNS.iter().map(|(title, _)| Cell::from(*title))).style(
        Style::default()
            .fg(theme.table_header_fg)
            .bg(theme.table_header_bg)
            .add_modifier(Modifier::BOLD),
    );

    let body = rows.iter().map(|record| process_row(record, theme));
    let table = Table::new(body, COLUMNS.map(|(_, width)| width))
        .header(header)
        .column_spacing(1);

    frame.render_widget(table, area);
}

fn process_row<'a>(record: &ProcessRecord, theme: &Theme) -> Row<'a> {
    let name_style = if record.is_running() {
        Style::default().fg(theme.running_state)
    } else {
        Style::default().fg(theme.text_primary)
    };

    Row::new([
        Cell::from(record.pid.to_string()),
        Cell::from(format_percent(Some(record.cpu_usage_percent), 1))
            .style(Style::default().fg(theme.cpu_color(record.cpu_usage_percent))),
        Cell::from(truncate_unicode(&record.name, COMMAND_WIDTH as usize)).style(name_style),
        Cell::from(record.cpu_time()),
        Cell::from(record.thread_count.to_string()),
        Cell::from(record.format_memory()),
        Cell::from(truncate_unicode(&record.username, USER_WIDTH as usize)),
    ])
    .style(Style::default().fg(theme.text_primary))
}

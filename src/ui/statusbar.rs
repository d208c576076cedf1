use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ui::theme::Theme;

/// One-based, inclusive description of the visible slice.
pub fn range_label(visible: &Range<usize>, total: usize) -> String {
    if visible.is_empty() {
        return format!("Showing 0 of {total} processes");
    }
    format!(
        "Showing {}-{} of {total} processes",
        visible.start + 1,
        visible.end
    )
}

pub fn render(frame: &mut Frame, area: Rect, visible: Range<usize>, total: usize, theme: &Theme) {
    let bg_style = Style::default().bg(theme.statusbar_bg);

    let mut spans = vec![Span::styled(
        format!(" {}", range_label(&visible, total)),
        Style::default()
            .fg(theme.pill_desc_fg)
            .add_modifier(Modifier::BOLD),
    )];
    spans.extend(pill_spans("q", "Quit", theme));
    spans.extend(pill_spans("\u{2191}\u{2193}", "Page", theme));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
}

fn pill_spans<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Vec<Span<'a>> {
    vec![
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {desc}"),
            Style::default().fg(theme.pill_desc_fg).bg(theme.surface_bg),
        ),
    ]
}

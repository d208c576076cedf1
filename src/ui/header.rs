use std::collections::BTreeMap;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::format::{format_percent, format_size};
use crate::system::snapshot::Frame as Sample;
use crate::ui::theme::Theme;

const PLACEHOLDER: &str = "--";

/// Rows the header needs, borders included.
pub fn height(show_per_core: bool) -> u16 {
    if show_per_core { 6 } else { 5 }
}

pub fn render(frame: &mut Frame, area: Rect, sample: &Sample, theme: &Theme, show_per_core: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        summary_line(sample, theme),
        cpu_line(sample, theme),
        memory_line(sample, theme),
    ];
    if show_per_core {
        lines.push(core_line(&sample.cpu_per_core, theme));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn label(text: &'static str, theme: &Theme) -> Span<'static> {
    Span::styled(
        text,
        Style::default()
            .fg(theme.text_secondary)
            .add_modifier(Modifier::BOLD),
    )
}

fn value(text: String, theme: &Theme) -> Span<'static> {
    Span::styled(text, Style::default().fg(theme.text_primary))
}

fn missing(theme: &Theme) -> Span<'static> {
    Span::styled(PLACEHOLDER, Style::default().fg(theme.placeholder))
}

fn summary_line(sample: &Sample, theme: &Theme) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            " proctop ",
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        label("Time: ", theme),
        value(sample.taken_at.format("%H:%M:%S").to_string(), theme),
        Span::raw("  "),
        label("Load Avg: ", theme),
    ];
    spans.push(match sample.load_average {
        Some(load) => value(
            format!("{:.2}, {:.2}, {:.2}", load.one, load.five, load.fifteen),
            theme,
        ),
        None => missing(theme),
    });
    spans.extend([Span::raw("  "), label("Uptime: ", theme)]);
    spans.push(match sample.uptime {
        Some(uptime) => value(uptime.formatted(), theme),
        None => missing(theme),
    });
    spans.extend([
        Span::raw("  "),
        label("Procs: ", theme),
        match sample.processes {
            Some(_) => value(sample.process_count().to_string(), theme),
            None => missing(theme),
        },
    ]);
    Line::from(spans)
}

fn cpu_line(sample: &Sample, theme: &Theme) -> Line<'static> {
    let text = format!(
        "{} user, {} sys, {} idle",
        format_percent(sample.cpu.map(|cpu| cpu.user), 2),
        format_percent(sample.cpu.map(|cpu| cpu.system), 2),
        format_percent(sample.cpu.map(|cpu| cpu.idle), 2)
    );
    let breakdown = match sample.cpu {
        Some(_) => value(text, theme),
        None => Span::styled(text, Style::default().fg(theme.placeholder)),
    };
    Line::from(vec![label("CPU usage: ", theme), breakdown])
}

fn memory_line(sample: &Sample, theme: &Theme) -> Line<'static> {
    let mut spans = vec![label("PhysMem: ", theme)];
    // A zero total means the record carried no usable figures.
    match sample.memory.filter(|memory| memory.total_kb > 0) {
        Some(memory) => spans.push(value(
            format!(
                "{} used ({} wired, {} compressor), {} unused.",
                format_size(memory.used_kb()),
                format_size(memory.wired_kb()),
                format_size(memory.compressor_kb()),
                format_size(memory.unused_kb())
            ),
            theme,
        )),
        None => spans.push(missing(theme)),
    }
    Line::from(spans)
}

fn core_line(per_core: &BTreeMap<usize, f64>, theme: &Theme) -> Line<'static> {
    let mut spans = vec![label("Cores: ", theme)];
    if per_core.is_empty() {
        spans.push(missing(theme));
        return Line::from(spans);
    }
    for (core, usage) in per_core {
        spans.push(Span::styled(
            format!("{core}:"),
            Style::default().fg(theme.text_secondary),
        ));
        spans.push(Span::styled(
            format!("{} ", format_percent(Some(*usage), 0)),
            Style::default().fg(theme.cpu_color(*usage)),
        ));
    }
    Line::from(spans)
}

use std::collections::BTreeMap;

use chrono::{Local, TimeZone};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::app::App;
use crate::config::Config;
use crate::system::collector::Collector;
use crate::system::cpu::CpuBreakdown;
use crate::system::memory::MemorySnapshot;
use crate::system::process::ProcessRecord;
use crate::system::snapshot::Frame as Sample;
use crate::system::source::{MemoryProcess, MemorySource};
use crate::system::uptime::{LoadAverage, Uptime};
use crate::system::users::UserDirectory;
use crate::ui::theme::Theme;
use crate::ui::{header, process_table, statusbar};

fn buffer_to_string(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            let cell = buf.cell((x, y)).unwrap();
            out.push_str(cell.symbol());
        }
        if y + 1 < area.height {
            out.push('\n');
        }
    }
    out
}

fn render_to_string<F>(width: u16, height: u16, draw: F) -> String
where
    F: FnOnce(&mut ratatui::Frame),
{
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(draw).unwrap();
    let buf = terminal.backend().buffer();
    buffer_to_string(buf)
}

fn make_record(pid: u32, name: &str, cpu: f64, user: &str) -> ProcessRecord {
    ProcessRecord {
        pid,
        ppid: 1,
        name: name.to_string(),
        state: 'S',
        uid: Some(1000),
        username: user.to_string(),
        thread_count: 4,
        memory_kb: 204_800,
        utime: 12_000,
        stime: 600,
        start_time: 500,
        previous: None,
        cpu_usage_percent: cpu,
    }
}

fn make_sample() -> Sample {
    let mut cpu_per_core = BTreeMap::new();
    cpu_per_core.insert(0, 12.0);
    cpu_per_core.insert(1, 75.0);
    Sample {
        taken_at: Local.with_ymd_and_hms(2026, 3, 14, 12, 34, 56).single().unwrap(),
        cpu: Some(CpuBreakdown {
            user: 12.5,
            system: 4.25,
            idle: 80.0,
        }),
        cpu_per_core,
        memory: Some(MemorySnapshot {
            total_kb: 16_777_216,
            available_kb: 8_388_608,
            free_kb: 2_097_152,
            buffers_kb: 524_288,
            cached_kb: 1_048_576,
            unevictable_kb: 0,
            active_kb: 4_194_304,
            swap_cached_kb: 0,
        }),
        load_average: Some(LoadAverage {
            one: 0.5,
            five: 0.25,
            fifteen: 0.1,
        }),
        uptime: Some(Uptime { seconds: 93_784.0 }),
        processes: Some(vec![
            make_record(100, "compiler", 110.0, "alice"),
            make_record(7, "shell", 0.0, "root"),
        ]),
    }
}

fn empty_sample() -> Sample {
    Sample {
        taken_at: Local.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).single().unwrap(),
        cpu: None,
        cpu_per_core: BTreeMap::new(),
        memory: None,
        load_average: None,
        uptime: None,
        processes: None,
    }
}

#[test]
fn header_shows_every_section() {
    let sample = make_sample();
    let output = render_to_string(110, 6, |frame| {
        header::render(frame, Rect::new(0, 0, 110, 6), &sample, &Theme::dark(), true);
    });

    assert!(output.contains("proctop"));
    assert!(output.contains("Time: 12:34:56"));
    assert!(output.contains("Load Avg: 0.50, 0.25, 0.10"));
    assert!(output.contains("Uptime: 1 days, 02:03:04"));
    assert!(output.contains("Procs: 2"));
    assert!(output.contains("CPU usage: 12.50% user, 4.25% sys, 80.00% idle"));
    assert!(output.contains("PhysMem: 8GB used (1GB wired, 1GB compressor), 2GB unused."));
    assert!(output.contains("0:12%"));
    assert!(output.contains("1:75%"));
}

#[test]
fn header_degrades_to_placeholders() {
    let sample = empty_sample();
    let output = render_to_string(110, 6, |frame| {
        header::render(frame, Rect::new(0, 0, 110, 6), &sample, &Theme::dark(), true);
    });

    assert!(output.contains("Load Avg: --"));
    assert!(output.contains("Uptime: --"));
    assert!(output.contains("Procs: --"));
    assert!(output.contains("CPU usage: --% user, --% sys, --% idle"));
    assert!(output.contains("PhysMem: --"));
    assert!(output.contains("Cores: --"));
}

#[test]
fn header_hides_memory_with_zero_total() {
    let sample = Sample {
        memory: Some(MemorySnapshot::default()),
        ..make_sample()
    };
    let output = render_to_string(110, 6, |frame| {
        header::render(frame, Rect::new(0, 0, 110, 6), &sample, &Theme::dark(), true);
    });

    assert!(output.contains("PhysMem: --"));
    assert!(!output.contains("0KB used"));
    assert!(output.contains("CPU usage: 12.50% user"));
}

#[test]
fn header_without_per_core_line() {
    let sample = make_sample();
    let output = render_to_string(110, 5, |frame| {
        header::render(frame, Rect::new(0, 0, 110, 5), &sample, &Theme::mono(), false);
    });

    assert!(!output.contains("Cores:"));
    assert_eq!(header::height(false), 5);
    assert_eq!(header::height(true), 6);
}

#[test]
fn process_table_lists_columns_and_rows() {
    let sample = make_sample();
    let rows = sample.processes.as_deref();
    let output = render_to_string(80, 4, |frame| {
        process_table::render(frame, Rect::new(0, 0, 80, 4), rows, &Theme::dark());
    });

    let lines: Vec<&str> = output.lines().collect();
    for column in ["PID", "%CPU", "COMMAND", "TIME", "#TH", "MEM", "USER"] {
        assert!(lines[0].contains(column), "missing column {column}");
    }
    assert!(lines[1].contains("100"));
    assert!(lines[1].contains("110.0%"));
    assert!(lines[1].contains("compiler"));
    assert!(lines[1].contains("00:02:06"));
    assert!(lines[1].contains("200MB"));
    assert!(lines[1].contains("alice"));
    assert!(lines[2].contains("shell"));
    assert!(lines[2].contains("0.0%"));
}

#[test]
fn process_table_truncates_long_names() {
    let records = vec![make_record(
        1,
        "an-extremely-long-process-name-that-overflows",
        1.0,
        "someone",
    )];
    let output = render_to_string(80, 2, |frame| {
        process_table::render(frame, Rect::new(0, 0, 80, 2), Some(records.as_slice()), &Theme::dark());
    });

    assert!(output.contains('\u{2026}'));
    assert!(!output.contains("overflows"));
}

#[test]
fn process_table_placeholder_when_unavailable() {
    let output = render_to_string(80, 2, |frame| {
        process_table::render(frame, Rect::new(0, 0, 80, 2), None, &Theme::dark());
    });

    assert!(output.contains("process list unavailable (--)"));
}

#[test]
fn statusbar_shows_range_and_keys() {
    let output = render_to_string(80, 1, |frame| {
        statusbar::render(frame, Rect::new(0, 0, 80, 1), 20..40, 57, &Theme::dark());
    });

    assert!(output.contains("Showing 21-40 of 57 processes"));
    assert!(output.contains(" q "));
    assert!(output.contains("Quit"));
    assert!(output.contains("Page"));
}

#[test]
fn range_label_for_empty_list() {
    assert_eq!(statusbar::range_label(&(0..0), 0), "Showing 0 of 0 processes");
    assert_eq!(statusbar::range_label(&(0..1), 1), "Showing 1-1 of 1 processes");
}

#[test]
fn draw_renders_visible_page_only() {
    let mut source = MemorySource::new();
    source.set_cpu_stat("cpu 1 0 1 8 0 0 0 0\n");
    for pid in 1..=30 {
        source.insert_process(
            pid,
            MemoryProcess {
                comm: format!("proc{pid:02}\n"),
                stat: format!("{pid} (proc{pid:02}) S 1 1 1 0 -1 0 0 0 0 0 0 0 0 0 20 0 1 0 9 0 0"),
                status: String::new(),
                threads: 1,
            },
        );
    }
    let collector = Collector::new(Box::new(source), UserDirectory::default());
    let mut config = Config::default();
    config.general.page_size = 10;
    let app = App::new(&config, collector).unwrap();

    let output = render_to_string(100, 24, |frame| crate::ui::draw(frame, &app));

    assert!(output.contains("Showing 1-10 of 30 processes"));
    assert!(output.contains("proc01"));
    assert!(output.contains("proc10"));
    assert!(!output.contains("proc11"));
}

//! Per-process identity and CPU accounting.

use std::collections::HashMap;
use std::time::Instant;

use super::error::SampleError;
use super::source::{CounterSource, ProcessFile};
use super::users::UserDirectory;
use crate::format::format_cpu_time;

/// Kernel clock ticks per second (USER_HZ). Usually 100; hard-coded.
pub const CLOCK_TICKS_PER_SECOND: f64 = 100.0;

/// Display ceiling for a single process's CPU usage.
pub const MAX_CPU_PERCENT: f64 = 999.9;

const STAT_RECORD: &str = "process stat";

// Offsets into the fields that follow the `(comm)` field of `stat`. The
// record's 1-indexed numbering is: state 3, ppid 4, utime 14, stime 15,
// starttime 22.
const STATE: usize = 0;
const PPID: usize = 1;
const UTIME: usize = 11;
const STIME: usize = 12;
const START_TIME: usize = 19;

/// CPU counters carried from one pass to the next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CpuSample {
    pub utime: u64,
    pub stime: u64,
    pub start_time: u64,
    pub taken_at: Instant,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProcessRecord {
    pub pid: u32,
    pub ppid: u32,
    pub name: String,
    pub state: char,
    pub uid: Option<u32>,
    pub username: String,
    pub thread_count: usize,
    pub memory_kb: u64,
    pub utime: u64,
    pub stime: u64,
    pub start_time: u64,
    /// The previous pass's counters for this PID, if any.
    pub previous: Option<CpuSample>,
    pub cpu_usage_percent: f64,
}

/// Fields parsed out of a `stat` record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatFields {
    pub state: char,
    pub ppid: u32,
    pub utime: u64,
    pub stime: u64,
    pub start_time: u64,
}

/// Fields parsed out of a `status` record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusFields {
    pub uid: Option<u32>,
    pub rss_kb: u64,
}

pub fn parse_stat(pid: u32, text: &str) -> Result<StatFields, SampleError> {
    // comm may contain spaces and parens, so fields start after the last ')'.
    let after_comm = text
        .rfind(')')
        .map(|idx| &text[idx + 1..])
        .ok_or_else(|| SampleError::malformed(STAT_RECORD, format!("pid {pid}: no command field")))?;
    let fields: Vec<&str> = after_comm.split_whitespace().collect();
    if fields.len() <= START_TIME {
        return Err(SampleError::malformed(
            STAT_RECORD,
            format!(
                "pid {pid}: expected at least {} fields, found {}",
                START_TIME + 3,
                fields.len() + 2
            ),
        ));
    }

    let number = |index: usize| -> Result<u64, SampleError> {
        fields[index].parse().map_err(|_| {
            SampleError::malformed(
                STAT_RECORD,
                format!("pid {pid}: field {} is {:?}", index + 3, fields[index]),
            )
        })
    };

    let state = fields[STATE]
        .chars()
        .next()
        .ok_or_else(|| SampleError::malformed(STAT_RECORD, format!("pid {pid}: empty state")))?;
    let ppid = u32::try_from(number(PPID)?)
        .map_err(|_| SampleError::malformed(STAT_RECORD, format!("pid {pid}: ppid out of range")))?;

    Ok(StatFields {
        state,
        ppid,
        utime: number(UTIME)?,
        stime: number(STIME)?,
        start_time: number(START_TIME)?,
    })
}

pub fn parse_status(text: &str) -> StatusFields {
    let mut status = StatusFields::default();
    let mut found_rss = false;
    for line in text.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            continue;
        }
        match fields[0].trim_end_matches(':') {
            "Uid" if status.uid.is_none() => status.uid = fields[1].parse().ok(),
            "VmRSS" if !found_rss => {
                if let Ok(kb) = fields[1].parse() {
                    status.rss_kb = kb;
                    found_rss = true;
                }
            }
            _ => {}
        }
        if status.uid.is_some() && found_rss {
            break;
        }
    }
    status
}

impl ProcessRecord {
    pub fn has_previous_sample(&self) -> bool {
        self.previous.is_some()
    }

    /// `utime + stime`, saturating at `u64::MAX`.
    pub fn total_cpu_ticks(&self) -> u64 {
        self.utime.saturating_add(self.stime)
    }

    /// Cumulative CPU time as `HH:MM:SS`.
    pub fn cpu_time(&self) -> String {
        format_cpu_time(self.total_cpu_ticks(), CLOCK_TICKS_PER_SECOND)
    }

    pub fn is_running(&self) -> bool {
        self.state == 'R'
    }

    pub fn is_sleeping(&self) -> bool {
        matches!(self.state, 'S' | 'D')
    }

    pub fn format_memory(&self) -> String {
        const MB: u64 = 1024;
        const GB: u64 = 1024 * 1024;
        match self.memory_kb {
            0 => "0".to_string(),
            kb if kb >= GB => format!("{:.1}GB", kb as f64 / GB as f64),
            kb if kb >= MB => format!("{:.0}MB", kb as f64 / MB as f64),
            kb => format!("{kb}KB"),
        }
    }

    /// CPU usage since `previous`, as a percentage of one CPU.
    ///
    /// Zero when there is no previous sample, no wall time elapsed, or the
    /// counters went backwards.
    pub fn compute_cpu_usage(&self, now: Instant) -> f64 {
        let Some(previous) = self.previous else {
            return 0.0;
        };
        let elapsed = now.saturating_duration_since(previous.taken_at).as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        let before = u128::from(previous.utime) + u128::from(previous.stime);
        let after = u128::from(self.utime) + u128::from(self.stime);
        let Some(ticks) = after.checked_sub(before) else {
            return 0.0;
        };
        let cpu_seconds = ticks as f64 / CLOCK_TICKS_PER_SECOND;
        (100.0 * cpu_seconds / elapsed).min(MAX_CPU_PERCENT)
    }

    fn sample_at(&self, taken_at: Instant) -> CpuSample {
        CpuSample {
            utime: self.utime,
            stime: self.stime,
            start_time: self.start_time,
            taken_at,
        }
    }
}

/// Enumerates processes from a [`CounterSource`].
pub struct ProcessSampler<'a> {
    source: &'a dyn CounterSource,
    users: &'a UserDirectory,
}

impl<'a> ProcessSampler<'a> {
    pub fn new(source: &'a dyn CounterSource, users: &'a UserDirectory) -> Self {
        ProcessSampler { source, users }
    }

    /// Reads every process currently listed.
    ///
    /// Only a failure to list the process directory is an error. Processes
    /// that exit mid-read or have malformed records are left out.
    pub fn enumerate(&self) -> Result<Vec<ProcessRecord>, SampleError> {
        let entries = self
            .source
            .process_entries()
            .map_err(|err| SampleError::unavailable("process directory", err))?;

        let mut records = Vec::with_capacity(entries.len());
        let mut dropped = 0usize;
        for entry in entries {
            let Ok(pid) = entry.parse::<u32>() else {
                continue;
            };
            match self.read(pid) {
                Ok(record) => records.push(record),
                Err(err) => {
                    dropped += 1;
                    tracing::trace!(pid, error = %err, "dropping process from pass");
                }
            }
        }
        if dropped > 0 {
            tracing::debug!(kept = records.len(), dropped, "process enumeration finished");
        }
        Ok(records)
    }

    /// Reads a single process.
    pub fn read(&self, pid: u32) -> Result<ProcessRecord, SampleError> {
        let vanished = |source| SampleError::ProcessVanished { pid, source };

        let comm = self
            .source
            .process_file(pid, ProcessFile::Comm)
            .map_err(vanished)?;
        let stat_text = self
            .source
            .process_file(pid, ProcessFile::Stat)
            .map_err(vanished)?;
        let stat = parse_stat(pid, &stat_text)?;
        let status_text = self
            .source
            .process_file(pid, ProcessFile::Status)
            .map_err(vanished)?;
        let status = parse_status(&status_text);
        let thread_count = self.source.thread_count(pid).map_err(vanished)?;

        let username = match status.uid {
            Some(uid) => self.users.resolve(uid),
            None => "-".to_string(),
        };

        Ok(ProcessRecord {
            pid,
            ppid: stat.ppid,
            name: comm.trim().to_string(),
            state: stat.state,
            uid: status.uid,
            username,
            thread_count,
            memory_kb: status.rss_kb,
            utime: stat.utime,
            stime: stat.stime,
            start_time: stat.start_time,
            previous: None,
            cpu_usage_percent: 0.0,
        })
    }
}

/// The previous CPU sample of every PID seen so far.
///
/// Entries are overwritten on every pass and never evicted, so the table
/// grows with the number of distinct PIDs observed during a session.
// TODO: evict PIDs unseen for many passes once long-session growth is measured.
#[derive(Debug, Default)]
pub struct ProcessHistory {
    previous: HashMap<u32, CpuSample>,
}

impl ProcessHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carries previous samples into `records`, computes their CPU usage at
    /// `now`, then stores their current counters for the next pass.
    ///
    /// A stored sample whose start time differs belongs to an earlier
    /// process that had the same PID and is not carried forward.
    pub fn apply(&mut self, records: &mut [ProcessRecord], now: Instant) {
        for record in records.iter_mut() {
            record.previous = self
                .previous
                .get(&record.pid)
                .filter(|sample| sample.start_time == record.start_time)
                .copied();
            record.cpu_usage_percent = record.compute_cpu_usage(now);
            self.previous.insert(record.pid, record.sample_at(now));
        }
    }

    pub fn get(&self, pid: u32) -> Option<&CpuSample> {
        self.previous.get(&pid)
    }

    pub fn len(&self) -> usize {
        self.previous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.previous.is_empty()
    }
}

/// Orders by CPU usage, highest first. Equal usages keep enumeration order.
pub fn sort_by_cpu(records: &mut [ProcessRecord]) {
    records.sort_by(|a, b| b.cpu_usage_percent.total_cmp(&a.cpu_usage_percent));
}

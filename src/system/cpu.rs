//! Aggregate and per-core CPU tick counters.
//!
//! See `proc_stat(5)`: each `cpu`/`cpuN` line carries the ticks the CPU spent
//! in user, nice, system, idle, iowait, irq, softirq and steal, followed on
//! newer kernels by guest and guest_nice, which are ignored here.

use std::collections::BTreeMap;

use super::error::SampleError;
use super::source::CounterSource;

const RECORD: &str = "cpu stat";
const AGGREGATE_LABEL: &str = "cpu";
const COUNTER_FIELDS: usize = 8;

/// Tick counters for one logical CPU, or for the system as a whole.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoreCounters {
    /// time spent in user mode.
    pub user: u64,
    /// time spent in user mode with low priority (nice).
    pub nice: u64,
    /// time spent in system mode.
    pub system: u64,
    /// time spent in the idle task.
    pub idle: u64,
    /// time waiting for i/o to complete. may decrease on some kernels.
    pub iowait: u64,
    /// time servicing interrupts.
    pub irq: u64,
    /// time servicing softirqs.
    pub softirq: u64,
    /// time stolen by other guests under virtualization.
    pub steal: u64,
}

impl CoreCounters {
    /// Sum of every counter, widened so that no combination of `u64`
    /// readings can overflow.
    pub fn total(&self) -> u128 {
        sum(&[
            self.user,
            self.nice,
            self.system,
            self.idle,
            self.iowait,
            self.irq,
            self.softirq,
            self.steal,
        ])
    }

    /// Field-wise `self - earlier`, or `None` if any counter went backwards.
    pub fn delta_since(&self, earlier: &CoreCounters) -> Option<CoreCounters> {
        Some(CoreCounters {
            user: self.user.checked_sub(earlier.user)?,
            nice: self.nice.checked_sub(earlier.nice)?,
            system: self.system.checked_sub(earlier.system)?,
            idle: self.idle.checked_sub(earlier.idle)?,
            iowait: self.iowait.checked_sub(earlier.iowait)?,
            irq: self.irq.checked_sub(earlier.irq)?,
            softirq: self.softirq.checked_sub(earlier.softirq)?,
            steal: self.steal.checked_sub(earlier.steal)?,
        })
    }

    fn parse(label: &str, values: &[&str]) -> Result<Self, SampleError> {
        if values.len() < COUNTER_FIELDS {
            return Err(SampleError::invalid_data(
                RECORD,
                format!(
                    "{label}: expected {COUNTER_FIELDS} counters, found {}",
                    values.len()
                ),
            ));
        }
        let mut parsed = [0u64; COUNTER_FIELDS];
        for (slot, raw) in parsed.iter_mut().zip(values) {
            *slot = raw.parse().map_err(|_| {
                SampleError::invalid_data(RECORD, format!("{label}: non-numeric counter {raw:?}"))
            })?;
        }
        let [user, nice, system, idle, iowait, irq, softirq, steal] = parsed;
        Ok(CoreCounters {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
        })
    }
}

fn sum(values: &[u64]) -> u128 {
    values.iter().map(|&v| u128::from(v)).sum()
}

/// The system-wide counters plus each core's, in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub total: CoreCounters,
    pub cores: Vec<CoreCounters>,
}

impl CpuSnapshot {
    /// Parses a `stat` record. Non-CPU lines are ignored.
    pub fn parse(text: &str) -> Result<Self, SampleError> {
        let mut total = None;
        let mut cores = Vec::new();

        for line in text.lines() {
            let mut tokens = line.split_whitespace();
            let Some(label) = tokens.next() else {
                continue;
            };
            let Some(suffix) = label.strip_prefix(AGGREGATE_LABEL) else {
                continue;
            };
            let values: Vec<&str> = tokens.collect();

            if suffix.is_empty() {
                total = Some(CoreCounters::parse(label, &values)?);
            } else if suffix.bytes().all(|b| b.is_ascii_digit()) {
                cores.push(CoreCounters::parse(label, &values)?);
            }
        }

        let total =
            total.ok_or_else(|| SampleError::invalid_data(RECORD, "aggregate cpu line missing"))?;
        Ok(CpuSnapshot { total, cores })
    }
}

/// Percentages of the elapsed ticks spent in each class of work.
///
/// iowait and steal count toward neither, so the three fields need not sum
/// to 100.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CpuBreakdown {
    pub user: f64,
    pub system: f64,
    pub idle: f64,
}

/// Reads CPU counters from a [`CounterSource`].
pub struct CpuSampler<'a> {
    source: &'a dyn CounterSource,
}

impl<'a> CpuSampler<'a> {
    pub fn new(source: &'a dyn CounterSource) -> Self {
        CpuSampler { source }
    }

    pub fn sample(&self) -> Result<CpuSnapshot, SampleError> {
        let text = self
            .source
            .cpu_stat()
            .map_err(|err| SampleError::unavailable(RECORD, err))?;
        CpuSnapshot::parse(&text)
    }
}

/// Aggregate breakdown between two snapshots.
///
/// The first observation has nothing to diff against and reports zeros, as do
/// a zero tick delta and any counter that went backwards.
pub fn compute_usage(previous: Option<&CpuSnapshot>, current: &CpuSnapshot) -> CpuBreakdown {
    let Some(previous) = previous else {
        return CpuBreakdown::default();
    };
    let Some(delta) = current.total.delta_since(&previous.total) else {
        return CpuBreakdown::default();
    };
    let total = delta.total();
    if total == 0 {
        return CpuBreakdown::default();
    }

    let total = total as f64;
    CpuBreakdown {
        user: 100.0 * (sum(&[delta.user, delta.nice]) as f64 / total),
        system: 100.0 * (sum(&[delta.system, delta.irq, delta.softirq]) as f64 / total),
        idle: 100.0 * (delta.idle as f64 / total),
    }
}

/// Busy percentage per core index.
///
/// Idle includes iowait here. When the core count changed between the two
/// snapshots (hot-plug), only the indices present in both are reported.
pub fn compute_usage_per_core(previous: &CpuSnapshot, current: &CpuSnapshot) -> BTreeMap<usize, f64> {
    previous
        .cores
        .iter()
        .zip(&current.cores)
        .enumerate()
        .map(|(index, (before, after))| (index, core_busy_percent(before, after)))
        .collect()
}

fn core_busy_percent(before: &CoreCounters, after: &CoreCounters) -> f64 {
    let Some(delta) = after.delta_since(before) else {
        return 0.0;
    };
    let total = delta.total();
    if total == 0 {
        return 0.0;
    }
    let idle = sum(&[delta.idle, delta.iowait]) as f64;
    100.0 * (1.0 - idle / total as f64)
}

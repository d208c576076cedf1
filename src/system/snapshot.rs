use std::collections::BTreeMap;

use chrono::{DateTime, Local};

use super::cpu::CpuBreakdown;
use super::memory::MemorySnapshot;
use super::process::ProcessRecord;
use super::uptime::{LoadAverage, Uptime};

/// Everything one sampling pass produced. A `None` section failed this pass.
#[derive(Clone, Debug)]
pub struct Frame {
    pub taken_at: DateTime<Local>,
    pub cpu: Option<CpuBreakdown>,
    pub cpu_per_core: BTreeMap<usize, f64>,
    pub memory: Option<MemorySnapshot>,
    pub load_average: Option<LoadAverage>,
    pub uptime: Option<Uptime>,
    /// Sorted by CPU usage, highest first.
    pub processes: Option<Vec<ProcessRecord>>,
}

impl Frame {
    pub fn process_count(&self) -> usize {
        self.processes.as_ref().map_or(0, Vec::len)
    }
}

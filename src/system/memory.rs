use super::error::SampleError;
use super::source::CounterSource;

const RECORD: &str = "meminfo";

/// Memory counters in kilobytes, as reported by `meminfo`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub total_kb: u64,
    pub available_kb: u64,
    pub free_kb: u64,
    pub buffers_kb: u64,
    pub cached_kb: u64,
    pub unevictable_kb: u64,
    pub active_kb: u64,
    pub swap_cached_kb: u64,
}

impl MemorySnapshot {
    /// Parses a `meminfo` record. Keys that are absent or unparsable read as zero.
    pub fn parse(text: &str) -> Self {
        let mut snapshot = MemorySnapshot::default();
        for line in text.lines() {
            let mut fields = line.split_whitespace();
            let (Some(key), Some(raw)) = (fields.next(), fields.next()) else {
                continue;
            };
            let Ok(value) = raw.parse::<u64>() else {
                continue;
            };
            let slot = match key.trim_end_matches(':') {
                "MemTotal" => &mut snapshot.total_kb,
                "MemAvailable" => &mut snapshot.available_kb,
                "MemFree" => &mut snapshot.free_kb,
                "Buffers" => &mut snapshot.buffers_kb,
                "Cached" => &mut snapshot.cached_kb,
                "Unevictable" => &mut snapshot.unevictable_kb,
                "Active" => &mut snapshot.active_kb,
                "SwapCached" => &mut snapshot.swap_cached_kb,
                _ => continue,
            };
            *slot = value;
        }
        snapshot
    }

    pub fn used_kb(&self) -> u64 {
        self.total_kb.saturating_sub(self.available_kb)
    }

    pub fn unused_kb(&self) -> u64 {
        self.free_kb
    }

    /// Rough "wired" figure: unevictable plus a quarter of active.
    pub fn wired_kb(&self) -> u64 {
        self.unevictable_kb + self.active_kb / 4
    }

    /// Rough "compressor" figure: buffers, swap cache and half the page cache.
    pub fn compressor_kb(&self) -> u64 {
        self.buffers_kb + self.swap_cached_kb + self.cached_kb / 2
    }

    /// Fraction of total memory in use, in `0.0..=1.0`.
    pub fn percent_used(&self) -> f64 {
        if self.total_kb == 0 {
            return 0.0;
        }
        self.used_kb() as f64 / self.total_kb as f64
    }
}

pub struct MemorySampler<'a> {
    source: &'a dyn CounterSource,
}

impl<'a> MemorySampler<'a> {
    pub fn new(source: &'a dyn CounterSource) -> Self {
        MemorySampler { source }
    }

    pub fn sample(&self) -> Result<MemorySnapshot, SampleError> {
        let text = self
            .source
            .meminfo()
            .map_err(|err| SampleError::unavailable(RECORD, err))?;
        Ok(MemorySnapshot::parse(&text))
    }
}

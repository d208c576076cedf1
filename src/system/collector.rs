use std::time::Instant;

use chrono::Local;

use super::cpu::{CpuSampler, CpuSnapshot, compute_usage, compute_usage_per_core};
use super::error::SampleError;
use super::memory::MemorySampler;
use super::process::{ProcessHistory, ProcessSampler, sort_by_cpu};
use super::snapshot::Frame;
use super::source::CounterSource;
use super::uptime::UptimeSampler;
use super::users::UserDirectory;

/// Runs the samplers against one counter source and keeps the state needed
/// to turn counters into rates: the last CPU snapshot and the per-PID history.
pub struct Collector {
    source: Box<dyn CounterSource>,
    users: UserDirectory,
    previous_cpu: Option<CpuSnapshot>,
    history: ProcessHistory,
}

impl Collector {
    pub fn new(source: Box<dyn CounterSource>, users: UserDirectory) -> Self {
        Collector {
            source,
            users,
            previous_cpu: None,
            history: ProcessHistory::new(),
        }
    }

    /// Checks that the CPU record can be read and keeps it as the baseline
    /// for the next pass.
    pub fn prime(&mut self) -> Result<(), SampleError> {
        let snapshot = CpuSampler::new(self.source.as_ref()).sample()?;
        self.previous_cpu = Some(snapshot);
        Ok(())
    }

    pub fn history(&self) -> &ProcessHistory {
        &self.history
    }

    /// Samples every section. A failing sampler leaves its section empty.
    pub fn refresh(&mut self) -> Frame {
        self.refresh_at(Instant::now())
    }

    pub fn refresh_at(&mut self, now: Instant) -> Frame {
        let _span = tracing::debug_span!("collector.refresh").entered();
        let source = self.source.as_ref();

        let (cpu, cpu_per_core) = match CpuSampler::new(source).sample() {
            Ok(current) => {
                let usage = compute_usage(self.previous_cpu.as_ref(), &current);
                let per_core = self
                    .previous_cpu
                    .as_ref()
                    .map(|previous| compute_usage_per_core(previous, &current))
                    .unwrap_or_default();
                self.previous_cpu = Some(current);
                (Some(usage), per_core)
            }
            Err(err) => {
                tracing::warn!(error = %err, "cpu section degraded");
                (None, Default::default())
            }
        };

        let memory = MemorySampler::new(source)
            .sample()
            .inspect_err(|err| tracing::warn!(error = %err, "memory section degraded"))
            .ok();

        let uptime_sampler = UptimeSampler::new(source);
        let uptime = uptime_sampler
            .sample()
            .inspect_err(|err| tracing::warn!(error = %err, "uptime section degraded"))
            .ok();
        let load_average = uptime_sampler
            .load_average()
            .inspect_err(|err| tracing::warn!(error = %err, "load average section degraded"))
            .ok();

        let processes = match ProcessSampler::new(source, &self.users).enumerate() {
            Ok(mut records) => {
                self.history.apply(&mut records, now);
                sort_by_cpu(&mut records);
                Some(records)
            }
            Err(err) => {
                tracing::warn!(error = %err, "process section degraded");
                None
            }
        };

        tracing::debug!(
            processes = processes.as_ref().map_or(0, Vec::len),
            tracked_pids = self.history.len(),
            cores = cpu_per_core.len(),
            "sampling pass complete"
        );

        Frame {
            taken_at: Local::now(),
            cpu,
            cpu_per_core,
            memory,
            load_average,
            uptime,
            processes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::source::{MemoryProcess, MemorySource};
    use std::time::Duration;

    fn stat_line(pid: u32, utime: u64, stime: u64) -> String {
        format!(
            "{pid} (p{pid}) S 1 {pid} {pid} 0 -1 0 0 0 0 0 {utime} {stime} 0 0 20 0 1 0 100 0 0"
        )
    }

    fn process(pid: u32, utime: u64, stime: u64) -> MemoryProcess {
        MemoryProcess {
            comm: format!("p{pid}\n"),
            stat: stat_line(pid, utime, stime),
            status: "Uid:\t0\t0\t0\t0\nVmRSS:\t100 kB\n".to_string(),
            threads: 1,
        }
    }

    fn full_source() -> MemorySource {
        let mut source = MemorySource::new();
        source
            .set_cpu_stat("cpu 100 0 100 800 0 0 0 0\ncpu0 100 0 100 800 0 0 0 0\n")
            .set_meminfo("MemTotal: 1000 kB\nMemAvailable: 400 kB\n")
            .set_uptime("60.0 100.0\n")
            .set_loadavg("0.10 0.20 0.30 1/100 5\n")
            .insert_process(100, process(100, 1000, 200))
            .insert_process(200, process(200, 50, 50));
        source
    }

    #[test]
    fn missing_sections_degrade_independently() {
        let mut source = MemorySource::new();
        source.set_meminfo("MemTotal: 1000 kB\nMemAvailable: 400 kB\n");
        let mut collector = Collector::new(Box::new(source), UserDirectory::default());

        let frame = collector.refresh();
        assert!(frame.cpu.is_none());
        assert!(frame.uptime.is_none());
        assert!(frame.load_average.is_none());
        assert_eq!(frame.memory.map(|m| m.used_kb()), Some(600));
        assert_eq!(frame.process_count(), 0);
    }

    #[test]
    fn prime_fails_without_cpu_record() {
        let mut collector = Collector::new(Box::new(MemorySource::new()), UserDirectory::default());
        assert!(matches!(
            collector.prime(),
            Err(SampleError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn first_pass_reports_zero_cpu() {
        let mut collector = Collector::new(Box::new(full_source()), UserDirectory::default());
        let frame = collector.refresh();
        let cpu = frame.cpu.expect("cpu sampled");
        assert_eq!(cpu.user, 0.0);
        assert!(frame.cpu_per_core.is_empty());
        assert!(
            frame
                .processes
                .as_ref()
                .unwrap()
                .iter()
                .all(|p| p.cpu_usage_percent == 0.0)
        );
        assert_eq!(collector.history().len(), 2);
    }

    #[test]
    fn second_pass_uses_previous_samples() {
        let mut collector = Collector::new(Box::new(full_source()), UserDirectory::default());
        let t0 = Instant::now();
        collector.refresh_at(t0);

        // Same counters, one second later: idle CPU and zero process usage.
        let frame = collector.refresh_at(t0 + Duration::from_secs(1));
        assert_eq!(frame.cpu_per_core.get(&0), Some(&0.0));
        let processes = frame.processes.unwrap();
        assert_eq!(processes.len(), 2);
        assert!(processes.iter().all(|p| p.has_previous_sample()));
    }
}

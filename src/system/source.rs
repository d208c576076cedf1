//! Read-only access to kernel counters.
//!
//! Samplers never open files themselves; they ask a [`CounterSource`] for
//! the raw text of a record and parse it. [`ProcFs`] serves the records from
//! a procfs mount and [`MemorySource`] serves them from memory.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Per-process records exposed under `<root>/<pid>/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessFile {
    Comm,
    Stat,
    Status,
}

impl ProcessFile {
    pub fn file_name(self) -> &'static str {
        match self {
            ProcessFile::Comm => "comm",
            ProcessFile::Stat => "stat",
            ProcessFile::Status => "status",
        }
    }
}

/// A source of kernel statistics.
pub trait CounterSource {
    /// Aggregate and per-core CPU tick record (`stat`).
    fn cpu_stat(&self) -> io::Result<String>;

    /// Memory counter record (`meminfo`).
    fn meminfo(&self) -> io::Result<String>;

    /// Seconds since boot (`uptime`).
    fn uptime(&self) -> io::Result<String>;

    /// Load averages (`loadavg`).
    fn loadavg(&self) -> io::Result<String>;

    /// Names of the entries in the process directory. Not every entry is a process.
    fn process_entries(&self) -> io::Result<Vec<String>>;

    fn process_file(&self, pid: u32, file: ProcessFile) -> io::Result<String>;

    /// Number of subdirectories in the process's `task` directory.
    fn thread_count(&self, pid: u32) -> io::Result<usize>;
}

/// Counters backed by a procfs mount.
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new(Self::ROOT)
    }
}

impl ProcFs {
    const ROOT: &'static str = "/proc";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        ProcFs { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.root.join(name))
    }

    fn pid_dir(&self, pid: u32) -> PathBuf {
        self.root.join(pid.to_string())
    }
}

impl CounterSource for ProcFs {
    fn cpu_stat(&self) -> io::Result<String> {
        self.read("stat")
    }

    fn meminfo(&self) -> io::Result<String> {
        self.read("meminfo")
    }

    fn uptime(&self) -> io::Result<String> {
        self.read("uptime")
    }

    fn loadavg(&self) -> io::Result<String> {
        self.read("loadavg")
    }

    fn process_entries(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)?.flatten() {
            // Entries can disappear between readdir and file_type.
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir && let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    fn process_file(&self, pid: u32, file: ProcessFile) -> io::Result<String> {
        fs::read_to_string(self.pid_dir(pid).join(file.file_name()))
    }

    fn thread_count(&self, pid: u32) -> io::Result<usize> {
        let mut count = 0;
        for entry in fs::read_dir(self.pid_dir(pid).join("task"))? {
            if entry?.file_type()?.is_dir() {
                count += 1;
            }
        }
        Ok(count)
    }
}

/// In-memory process entry served by [`MemorySource`].
#[derive(Debug, Clone, Default)]
pub struct MemoryProcess {
    pub comm: String,
    pub stat: String,
    pub status: String,
    pub threads: usize,
}

/// Counters held in memory. Records that were never set read as `NotFound`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    cpu_stat: Option<String>,
    meminfo: Option<String>,
    uptime: Option<String>,
    loadavg: Option<String>,
    extra_entries: Vec<String>,
    processes: HashMap<u32, MemoryProcess>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cpu_stat(&mut self, text: impl Into<String>) -> &mut Self {
        self.cpu_stat = Some(text.into());
        self
    }

    pub fn set_meminfo(&mut self, text: impl Into<String>) -> &mut Self {
        self.meminfo = Some(text.into());
        self
    }

    pub fn set_uptime(&mut self, text: impl Into<String>) -> &mut Self {
        self.uptime = Some(text.into());
        self
    }

    pub fn set_loadavg(&mut self, text: impl Into<String>) -> &mut Self {
        self.loadavg = Some(text.into());
        self
    }

    /// Adds a directory entry that is not a process (e.g. `self`, `sys`).
    pub fn add_entry(&mut self, name: impl Into<String>) -> &mut Self {
        self.extra_entries.push(name.into());
        self
    }

    pub fn insert_process(&mut self, pid: u32, process: MemoryProcess) -> &mut Self {
        self.processes.insert(pid, process);
        self
    }

    pub fn remove_process(&mut self, pid: u32) -> Option<MemoryProcess> {
        self.processes.remove(&pid)
    }

    pub fn process_mut(&mut self, pid: u32) -> Option<&mut MemoryProcess> {
        self.processes.get_mut(&pid)
    }
}

fn not_found(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{what} not present"))
}

impl CounterSource for MemorySource {
    fn cpu_stat(&self) -> io::Result<String> {
        self.cpu_stat.clone().ok_or_else(|| not_found("stat"))
    }

    fn meminfo(&self) -> io::Result<String> {
        self.meminfo.clone().ok_or_else(|| not_found("meminfo"))
    }

    fn uptime(&self) -> io::Result<String> {
        self.uptime.clone().ok_or_else(|| not_found("uptime"))
    }

    fn loadavg(&self) -> io::Result<String> {
        self.loadavg.clone().ok_or_else(|| not_found("loadavg"))
    }

    fn process_entries(&self) -> io::Result<Vec<String>> {
        let mut pids: Vec<u32> = self.processes.keys().copied().collect();
        pids.sort_unstable();
        let mut names: Vec<String> = pids.iter().map(u32::to_string).collect();
        names.extend(self.extra_entries.iter().cloned());
        Ok(names)
    }

    fn process_file(&self, pid: u32, file: ProcessFile) -> io::Result<String> {
        let process = self
            .processes
            .get(&pid)
            .ok_or_else(|| not_found(&format!("/{pid}")))?;
        Ok(match file {
            ProcessFile::Comm => process.comm.clone(),
            ProcessFile::Stat => process.stat.clone(),
            ProcessFile::Status => process.status.clone(),
        })
    }

    fn thread_count(&self, pid: u32) -> io::Result<usize> {
        self.processes
            .get(&pid)
            .map(|p| p.threads)
            .ok_or_else(|| not_found(&format!("/{pid}/task")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_missing_records_are_not_found() {
        let source = MemorySource::new();
        let err = source.cpu_stat().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        let err = source.process_file(7, ProcessFile::Stat).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn memory_source_lists_pids_then_extra_entries() {
        let mut source = MemorySource::new();
        source
            .insert_process(20, MemoryProcess::default())
            .insert_process(3, MemoryProcess::default())
            .add_entry("self");
        assert_eq!(source.process_entries().unwrap(), vec!["3", "20", "self"]);
    }

    #[test]
    fn procfs_reads_from_its_root() {
        let root = std::env::temp_dir().join(format!("proctop_source_{}", std::process::id()));
        let task = root.join("42").join("task");
        std::fs::create_dir_all(task.join("42")).unwrap();
        std::fs::create_dir_all(task.join("43")).unwrap();
        std::fs::write(root.join("42").join("comm"), "bash\n").unwrap();
        std::fs::write(root.join("uptime"), "12.5 40.0\n").unwrap();
        std::fs::write(root.join("version"), "not a dir").unwrap();

        let fs = ProcFs::new(&root);
        assert_eq!(fs.uptime().unwrap(), "12.5 40.0\n");
        assert_eq!(fs.process_file(42, ProcessFile::Comm).unwrap(), "bash\n");
        assert_eq!(fs.thread_count(42).unwrap(), 2);
        assert_eq!(fs.process_entries().unwrap(), vec!["42".to_string()]);

        let _ = std::fs::remove_dir_all(&root);
    }
}

use std::path::Path;
use std::process::{Child, Command, Stdio};

use proctop::system::cpu::CpuSampler;
use proctop::system::error::SampleError;
use proctop::system::memory::MemorySampler;
use proctop::system::process::ProcessSampler;
use proctop::system::source::ProcFs;
use proctop::system::users::UserDirectory;

fn procfs_available() -> bool {
    Path::new("/proc/stat").exists()
}

fn spawn_long_lived_child() -> Child {
    Command::new("sleep")
        .arg("30")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn child process")
}

#[test]
fn live_counters_parse() {
    if !procfs_available() {
        eprintln!("skipping: /proc is not mounted");
        return;
    }
    let source = ProcFs::default();

    let cpu = CpuSampler::new(&source).sample().unwrap();
    assert!(cpu.total.total() > 0);
    assert!(!cpu.cores.is_empty());

    let memory = MemorySampler::new(&source).sample().unwrap();
    assert!(memory.total_kb > 0);
    assert!(memory.used_kb() <= memory.total_kb);
}

#[test]
fn spawned_child_is_enumerated_then_vanishes() {
    if !procfs_available() {
        eprintln!("skipping: /proc is not mounted");
        return;
    }
    let mut child = spawn_long_lived_child();
    let pid = child.id();

    let source = ProcFs::default();
    let users = UserDirectory::from_system();
    let sampler = ProcessSampler::new(&source, &users);

    let records = sampler.enumerate().unwrap();
    let found = records.iter().find(|r| r.pid == pid).cloned();

    let _ = child.kill();
    let _ = child.wait();

    let record = found.expect("spawned child missing from enumeration");
    assert_eq!(record.name, "sleep");
    assert_eq!(record.ppid, std::process::id());
    assert!(record.thread_count >= 1);

    assert!(matches!(
        sampler.read(pid),
        Err(SampleError::ProcessVanished { pid: gone, .. }) if gone == pid
    ));
}

//! Wall-clock and resident-memory sampling around a single fetch

use std::time::Instant;

use sysinfo::{Pid, System};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Timing and memory readings for exactly one access-method invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub duration_seconds: f64,
    pub memory_peak_mb: f64,
    pub memory_delta_mb: f64,
}

/// Samples process RSS and wall-clock time around one unit of work.
///
/// `start()` takes the baseline, `stop()` consumes the monitor and returns
/// the deltas, so a monitor cannot be reused across measurements. Memory
/// readings are best effort: if the process cannot be introspected they
/// come back as zero rather than failing the cell.
pub struct PerformanceMonitor {
    system: System,
    pid: Option<Pid>,
    baseline_mb: f64,
    started: Instant,
}

impl PerformanceMonitor {
    pub fn start() -> Self {
        let mut system = System::new();
        let pid = sysinfo::get_current_pid().ok();
        let baseline_mb = resident_mb(&mut system, pid);
        Self {
            system,
            pid,
            baseline_mb,
            // The clock starts after the memory read so the fetch itself
            // is the only thing inside the timed window.
            started: Instant::now(),
        }
    }

    pub fn stop(mut self) -> Measurement {
        let duration_seconds = self.started.elapsed().as_secs_f64();
        let end_mb = resident_mb(&mut self.system, self.pid);
        Measurement {
            duration_seconds,
            memory_peak_mb: end_mb,
            memory_delta_mb: end_mb - self.baseline_mb,
        }
    }
}

fn resident_mb(system: &mut System, pid: Option<Pid>) -> f64 {
    let Some(pid) = pid else {
        return 0.0;
    };
    if !system.refresh_process(pid) {
        return 0.0;
    }
    system
        .process(pid)
        .map(|p| p.memory() as f64 / BYTES_PER_MB)
        .unwrap_or(0.0)
}

//! Worker placement.
//!
//! Pins the calling thread to one of the CPUs the process is allowed to run on.
//! Pinning is advisory: on unsupported platforms, or when the kernel refuses,
//! the worker simply keeps running unpinned.

use tracing::debug;

/// CPUs the current process may run on, in ascending order.
#[cfg(target_os = "linux")]
pub fn allowed_cpus() -> Vec<usize> {
    // SAFETY: `cpu_set_t` is plain data; zeroed is the empty set.
    let mut set: libc::cpu_set_t = unsafe { core::mem::zeroed() };
    // SAFETY: pid 0 means the calling thread; `set` is a valid out-pointer of the given size.
    let rc = unsafe { libc::sched_getaffinity(0, core::mem::size_of::<libc::cpu_set_t>(), &mut set) };
    if rc != 0 {
        return Vec::new();
    }
    (0..libc::CPU_SETSIZE as usize)
        // SAFETY: `cpu` is below `CPU_SETSIZE`.
        .filter(|&cpu| unsafe { libc::CPU_ISSET(cpu, &set) })
        .collect()
}

/// CPUs the current process may run on, in ascending order.
#[cfg(not(target_os = "linux"))]
pub fn allowed_cpus() -> Vec<usize> {
    Vec::new()
}

/// Pins the calling thread to the `worker`-th allowed CPU (modulo the count).
///
/// Returns `true` if the thread is now pinned.
pub fn pin_current_thread(worker: usize, allowed: &[usize]) -> bool {
    if allowed.is_empty() {
        debug!(worker, "no cpu affinity information, running unpinned");
        return false;
    }
    let cpu = allowed[worker % allowed.len()];
    let pinned = set_affinity(cpu);
    if !pinned {
        debug!(worker, cpu, "failed to pin worker, running unpinned");
    }
    pinned
}

#[cfg(target_os = "linux")]
fn set_affinity(cpu: usize) -> bool {
    // SAFETY: zeroed `cpu_set_t` is the empty set; `cpu` comes from the allowed set.
    unsafe {
        let mut set: libc::cpu_set_t = core::mem::zeroed();
        libc::CPU_SET(cpu, &mut set);
        libc::sched_setaffinity(0, core::mem::size_of::<libc::cpu_set_t>(), &set) == 0
    }
}

#[cfg(not(target_os = "linux"))]
fn set_affinity(_cpu: usize) -> bool {
    false
}

//! Address-based wait/wake and the phase handoff built on top of it.
//!
//! No OS barrier or lock is used anywhere in the engine. Blocking waits go
//! straight to the kernel's address-wait facility:
//! - Linux: `futex(FUTEX_WAIT | FUTEX_PRIVATE_FLAG)` via `libc`
//! - Windows: `WaitOnAddress` / `WakeByAddressAll` via `windows-sys`
//! - elsewhere: a `yield_now` poll loop

pub mod handoff;

pub use handoff::{HandoffPolicy, PanicGuard, PhaseHandoff, Poisoned, Role};

use core::sync::atomic::AtomicU32;
#[cfg(not(any(windows, target_os = "linux")))]
use core::sync::atomic::Ordering;

#[cfg(windows)]
use windows_sys::Win32::System::Threading::{WaitOnAddress, WakeByAddressAll};

#[cfg(target_os = "linux")]
use libc::{SYS_futex, FUTEX_PRIVATE_FLAG, FUTEX_WAIT, FUTEX_WAKE};

#[cfg(target_os = "linux")]
#[inline]
fn futex_wait(addr: *const u32, expected: u32) {
    // SAFETY: `addr` points to a live `AtomicU32`; the kernel re-checks the value
    // atomically and returns immediately (EAGAIN) if it no longer equals `expected`.
    unsafe {
        libc::syscall(
            SYS_futex,
            addr,
            FUTEX_WAIT | FUTEX_PRIVATE_FLAG,
            expected,
            core::ptr::null::<libc::timespec>(),
        );
    }
}

#[cfg(target_os = "linux")]
#[inline]
fn futex_wake(addr: *const u32, count: i32) {
    // SAFETY: waking on a valid address has no memory effects.
    unsafe {
        libc::syscall(SYS_futex, addr, FUTEX_WAKE | FUTEX_PRIVATE_FLAG, count);
    }
}

/// Wakes all threads waiting on the given address.
#[inline]
pub fn wake_all_u32(addr: &AtomicU32) {
    #[cfg(windows)]
    unsafe {
        WakeByAddressAll(addr as *const _ as *mut _);
    }
    #[cfg(target_os = "linux")]
    {
        futex_wake(addr as *const _ as *const u32, i32::MAX);
    }
    #[cfg(not(any(windows, target_os = "linux")))]
    let _ = addr;
}

/// Waits on the given address while it holds `expected`.
///
/// May return spuriously; callers re-check their condition in a loop.
#[inline]
pub fn wait_on_u32(addr: &AtomicU32, expected: u32) {
    #[cfg(windows)]
    unsafe {
        let expected_ptr = &expected as *const u32 as *const _;
        let addr_ptr = addr as *const _ as *mut _;
        let size = core::mem::size_of::<u32>();
        WaitOnAddress(addr_ptr, expected_ptr, size, u32::MAX);
    }
    #[cfg(target_os = "linux")]
    {
        futex_wait(addr as *const _ as *const u32, expected);
    }
    #[cfg(not(any(windows, target_os = "linux")))]
    while addr.load(Ordering::SeqCst) == expected {
        std::thread::yield_now();
    }
}

#[cfg(test)]
mod tests;

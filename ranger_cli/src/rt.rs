//! Real-time scheduling for the control thread (Linux SCHED_FIFO / affinity / mlockall).
//!
//! Everything here is best-effort: each failure is logged with a hint and the
//! loop still runs, just without the guarantee.

use crate::cli::RtLock;

#[derive(Debug, Clone, Copy)]
pub struct RtOptions {
    pub enabled: bool,
    pub prio: Option<i32>,
    pub lock: RtLock,
    pub cpu: Option<usize>,
}

#[cfg(target_os = "linux")]
pub fn setup_rt_once(opts: RtOptions) {
    use std::sync::OnceLock;
    static RT_ONCE: OnceLock<()> = OnceLock::new();

    if !opts.enabled {
        return;
    }
    RT_ONCE.get_or_init(|| {
        match linux::apply_mem_lock(opts.lock) {
            Ok(()) => tracing::info!(mode = ?opts.lock, "rt: memory locked"),
            Err(e) => tracing::warn!(error = %e, "rt: mlockall failed"),
        }
        match linux::apply_fifo_priority(opts.prio) {
            Ok(p) => tracing::info!(prio = p, "rt: SCHED_FIFO applied"),
            Err(e) => tracing::warn!(error = %e, "rt: SCHED_FIFO not applied"),
        }
        match linux::apply_affinity(opts.cpu.unwrap_or(0)) {
            Ok(cpu) => tracing::info!(cpu, "rt: pinned to cpu"),
            Err(e) => tracing::warn!(error = %e, "rt: affinity not applied"),
        }
    });
}

#[cfg(not(target_os = "linux"))]
pub fn setup_rt_once(opts: RtOptions) {
    if opts.enabled {
        tracing::warn!("rt: real-time mode is only supported on Linux; ignoring --rt");
    }
}

#[cfg(target_os = "linux")]
mod linux {
    use super::RtLock;
    use libc::{CPU_ISSET, CPU_SET, CPU_ZERO, MCL_CURRENT, MCL_FUTURE, SCHED_FIFO};

    /// Capacity of cpu_set_t in CPU indices (bits).
    const MAX_CPUSET_BITS: usize = std::mem::size_of::<libc::cpu_set_t>() * 8;

    fn is_memlock_limit(err: &std::io::Error) -> bool {
        matches!(err.raw_os_error(), Some(code) if code == libc::EPERM || code == libc::ENOMEM)
    }

    fn memlock_limit_hint() -> Option<String> {
        let mut rlim = std::mem::MaybeUninit::<libc::rlimit>::uninit();
        // SAFETY: getrlimit writes a full rlimit on success.
        let rc = unsafe { libc::getrlimit(libc::RLIMIT_MEMLOCK, rlim.as_mut_ptr()) };
        if rc != 0 {
            return None;
        }
        // SAFETY: rc == 0 means rlim was initialized.
        let cur = unsafe { rlim.assume_init() }.rlim_cur;
        Some(if cur == libc::RLIM_INFINITY {
            "memlock limit: unlimited".to_string()
        } else {
            format!("memlock limit: {} KiB", cur / 1024)
        })
    }

    fn mlockall(flags: libc::c_int) -> std::io::Result<()> {
        // SAFETY: plain syscall, no pointers.
        if unsafe { libc::mlockall(flags) } != 0 {
            Err(std::io::Error::last_os_error())
        } else {
            Ok(())
        }
    }

    pub fn apply_mem_lock(lock: RtLock) -> eyre::Result<()> {
        let res = match lock {
            RtLock::None => return Ok(()),
            RtLock::Current => mlockall(MCL_CURRENT),
            // Fall back to current pages if future pages exceed the limit.
            RtLock::All => mlockall(MCL_CURRENT | MCL_FUTURE).or_else(|e| {
                if is_memlock_limit(&e) {
                    mlockall(MCL_CURRENT)
                } else {
                    Err(e)
                }
            }),
        };
        let Err(err) = res else {
            return Ok(());
        };
        let mut msg = format!("mlockall({lock:?}) failed: {err}");
        if is_memlock_limit(&err) {
            if let Some(h) = memlock_limit_hint() {
                msg.push_str(&format!("; {h}"));
            }
            msg.push_str("; hint: needs CAP_IPC_LOCK (or root) and sufficient 'ulimit -l'");
        }
        Err(eyre::eyre!(msg))
    }

    /// Returns the priority actually applied.
    pub fn apply_fifo_priority(prio: Option<i32>) -> eyre::Result<i32> {
        // SAFETY: plain syscalls, no pointers.
        let (min, max) = unsafe {
            (
                libc::sched_get_priority_min(SCHED_FIFO),
                libc::sched_get_priority_max(SCHED_FIFO),
            )
        };
        let (min, max) = if min < 0 || max < 0 { (1, 99) } else { (min, max) };
        let value = prio.unwrap_or(max).clamp(min, max);
        let param = libc::sched_param {
            sched_priority: value,
        };
        // SAFETY: param outlives the call.
        let rc = unsafe { libc::sched_setscheduler(0, SCHED_FIFO, &param) };
        if rc != 0 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EPERM) {
                eyre::bail!(
                    "{err}; hint: run as root or grant CAP_SYS_NICE: 'sudo setcap cap_sys_nice=ep /path/to/ranger'"
                );
            }
            return Err(eyre::eyre!(err));
        }
        Ok(value)
    }

    /// Pin to `cpu` if the current affinity mask allows it.
    pub fn apply_affinity(cpu: usize) -> eyre::Result<usize> {
        if cpu >= MAX_CPUSET_BITS {
            eyre::bail!("requested CPU {cpu} exceeds cpu_set_t capacity {MAX_CPUSET_BITS}");
        }
        // SAFETY: cpu_set_t is plain data; zeroed is a valid empty set.
        let mut allowed: libc::cpu_set_t = unsafe { std::mem::zeroed() };
        let size = std::mem::size_of::<libc::cpu_set_t>();
        // SAFETY: `allowed` is a valid cpu_set_t of `size` bytes.
        if unsafe { libc::sched_getaffinity(0, size, &mut allowed) } != 0 {
            return Err(eyre::eyre!(std::io::Error::last_os_error()));
        }
        // SAFETY: cpu < MAX_CPUSET_BITS.
        if !unsafe { CPU_ISSET(cpu, &allowed) } {
            eyre::bail!("CPU {cpu} not permitted by current affinity mask");
        }
        // SAFETY: as above.
        let mut desired: libc::cpu_set_t = unsafe { std::mem::zeroed() };
        unsafe {
            CPU_ZERO(&mut desired);
            CPU_SET(cpu, &mut desired);
        }
        // SAFETY: `desired` is a valid cpu_set_t of `size` bytes.
        if unsafe { libc::sched_setaffinity(0, size, &desired) } != 0 {
            return Err(eyre::eyre!(std::io::Error::last_os_error()));
        }
        Ok(cpu)
    }
}

//! Engage/disengage latch shared between the button-edge handler and the loop.
//!
//! Both flags live in one atomic byte so every reader sees a consistent pair:
//! - `ENGAGED`: the control task runs the state machine.
//! - `RESET_PENDING`: set on a disengaged→engaged edge, consumed by the loop
//!   (only while disengaged) to run the one-time reset.
//!
//! The edge handler never blocks, allocates, or does I/O; every operation is a
//! single atomic read-modify-write.

use std::sync::atomic::{AtomicU8, Ordering};

const ENGAGED: u8 = 0b01;
const RESET_PENDING: u8 = 0b10;

/// Snapshot of the latch at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatchState {
    pub engaged: bool,
    pub needs_reset_once: bool,
}

impl LatchState {
    fn from_bits(bits: u8) -> Self {
        Self {
            engaged: bits & ENGAGED != 0,
            needs_reset_once: bits & RESET_PENDING != 0,
        }
    }
}

/// Off→on arms the one-time reset for the next disengage; on→off keeps it.
const fn toggled(bits: u8) -> u8 {
    if bits & ENGAGED == 0 {
        bits | ENGAGED | RESET_PENDING
    } else {
        bits & !ENGAGED
    }
}

#[derive(Debug, Default)]
pub struct ToggleLatch {
    bits: AtomicU8,
}

impl ToggleLatch {
    /// Disengaged, nothing pending.
    pub const fn new() -> Self {
        Self {
            bits: AtomicU8::new(0),
        }
    }

    /// Button-edge handler: flip `engaged`, arm the reset when it turns on.
    ///
    /// Returns the state after the edge.
    pub fn on_edge(&self) -> LatchState {
        let (Ok(prev) | Err(prev)) = self
            .bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |b| Some(toggled(b)));
        LatchState::from_bits(toggled(prev))
    }

    /// Unconditionally disengage; leaves a pending reset untouched.
    pub fn force_disengage(&self) {
        self.bits.fetch_and(!ENGAGED, Ordering::AcqRel);
    }

    #[inline]
    pub fn is_engaged(&self) -> bool {
        self.bits.load(Ordering::Acquire) & ENGAGED != 0
    }

    pub fn snapshot(&self) -> LatchState {
        LatchState::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Consume the pending reset.
    ///
    /// Succeeds only while disengaged with a reset pending; returns whether the
    /// caller must now perform the reset.
    pub fn take_reset(&self) -> bool {
        self.bits
            .compare_exchange(RESET_PENDING, 0, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Clear the pending flag regardless of `engaged`.
    pub fn clear_reset(&self) {
        self.bits.fetch_and(!RESET_PENDING, Ordering::AcqRel);
    }
}

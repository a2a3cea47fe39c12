//! Cooperative scheduling - Deadlines, yield policy and idle hosts.
//!
//! The work loop never owns the clock. A host hands it a [`Deadline`] for
//! each idle slice, a [`YieldPolicy`] decides when the slice is spent, and
//! an [`IdleHost`] supplies the next slice once the loop has yielded.
//!
//! ```text
//! host slot ──▶ work_loop(deadline) ──▶ unit, unit, unit ── policy says yield ──▶ back to host
//!                                            └── walk done ──▶ commit
//! ```

use std::thread;
use std::time::{Duration, Instant};

use super::session::{RenderSession, WorkStatus};
use crate::config::DEFAULT_YIELD_THRESHOLD;
use crate::error::Result;
use crate::target::RenderTarget;

// =============================================================================
// Deadlines
// =============================================================================

/// Time budget of one idle slice.
pub trait Deadline {
    fn time_remaining(&self) -> Duration;
}

impl<D: Deadline + ?Sized> Deadline for &D {
    fn time_remaining(&self) -> Duration {
        (**self).time_remaining()
    }
}

/// Wall-clock deadline ending at a fixed instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdleDeadline {
    end: Instant,
}

impl IdleDeadline {
    pub fn at(end: Instant) -> Self {
        Self { end }
    }

    /// A slice of `slice` starting now.
    pub fn after(slice: Duration) -> Self {
        Self::at(Instant::now() + slice)
    }
}

impl Deadline for IdleDeadline {
    fn time_remaining(&self) -> Duration {
        self.end.saturating_duration_since(Instant::now())
    }
}

/// A deadline that always reports the same budget.
///
/// `FixedDeadline(Duration::ZERO)` simulates a slice that is already spent:
/// the loop performs exactly one unit of work and yields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedDeadline(pub Duration);

impl Deadline for FixedDeadline {
    fn time_remaining(&self) -> Duration {
        self.0
    }
}

/// A deadline that never runs out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

// =============================================================================
// Yield Policy
// =============================================================================

/// Decides, after each unit of work, whether to give control back.
pub trait YieldPolicy {
    fn should_yield(&self, deadline: &dyn Deadline) -> bool;
}

/// Yield once less than `threshold` remains in the slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinRemaining {
    pub threshold: Duration,
}

impl MinRemaining {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold }
    }
}

impl Default for MinRemaining {
    fn default() -> Self {
        Self::new(DEFAULT_YIELD_THRESHOLD)
    }
}

impl YieldPolicy for MinRemaining {
    fn should_yield(&self, deadline: &dyn Deadline) -> bool {
        deadline.time_remaining() < self.threshold
    }
}

// =============================================================================
// Idle Host
// =============================================================================

/// The host's idle-callback primitive.
///
/// Each call registers interest in the next idle slot and returns its
/// deadline once the slot begins. `None` means the host is shutting down.
pub trait IdleHost {
    type Deadline: Deadline;

    fn request_idle_slot(&mut self) -> Option<Self::Deadline>;
}

/// Idle host for native threads: fixed-length slices separated by a sleep.
#[derive(Clone, Debug)]
pub struct ThreadIdleHost {
    slice: Duration,
    gap: Duration,
    started: bool,
}

impl ThreadIdleHost {
    pub fn new(slice: Duration, gap: Duration) -> Self {
        Self {
            slice,
            gap,
            started: false,
        }
    }
}

impl Default for ThreadIdleHost {
    /// ~60 fps frame: 16 ms of work, 1 ms handed back between slices.
    fn default() -> Self {
        Self::new(Duration::from_millis(16), Duration::from_millis(1))
    }
}

impl IdleHost for ThreadIdleHost {
    type Deadline = IdleDeadline;

    fn request_idle_slot(&mut self) -> Option<IdleDeadline> {
        if self.started && !self.gap.is_zero() {
            thread::sleep(self.gap);
        }
        self.started = true;
        Some(IdleDeadline::after(self.slice))
    }
}

/// Drive `session` slice by slice until it has no work left or the host
/// stops handing out slots. Returns how many commits happened.
///
/// A component that queues a state update on every render never runs out
/// of work; this loop then only ends when the host stops.
pub fn run_until_idle<T, H>(session: &mut RenderSession<T>, host: &mut H) -> Result<usize>
where
    T: RenderTarget,
    H: IdleHost,
{
    let mut commits = 0;
    while session.has_pending_work() {
        let Some(deadline) = host.request_idle_slot() else {
            tracing::debug!("idle host stopped with work pending");
            break;
        };
        if let WorkStatus::Committed(_) = session.work_loop(&deadline)? {
            commits += 1;
        }
    }
    Ok(commits)
}

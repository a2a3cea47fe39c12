//! Reconciler - Incremental render, diff and commit.
//!
//! # Pipeline
//!
//! ```text
//! render(node, container) → work_loop(deadline)* → commit_root → current tree
//! ```
//!
//! ## Modules
//!
//! - **session** - [`RenderSession`]: owned render-cycle state and the work loop
//! - **work** - Units of work and the positional child diff
//! - **commit** - Applying a finished tree to the target ([`CommitReport`])
//! - **scheduler** - [`Deadline`], [`YieldPolicy`], [`IdleHost`], [`run_until_idle`]

mod commit;
mod session;
mod work;
pub mod scheduler;

pub use commit::CommitReport;
pub use scheduler::{
    Deadline, FixedDeadline, IdleDeadline, IdleHost, MinRemaining, ThreadIdleHost, Unbounded,
    YieldPolicy, run_until_idle,
};
pub use session::{RenderSession, WorkStatus};

#[cfg(test)]
mod tests;

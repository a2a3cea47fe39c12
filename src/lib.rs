//! # spark-reconciler
//!
//! Incremental, interruptible fiber reconciler for declarative UI trees.
//!
//! Given a tree of [`Node`]s and the previously committed tree, the
//! reconciler computes the minimal set of mutations and applies them to a
//! [`RenderTarget`]. The diff is split into small units of work that run
//! inside host-provided idle slices, so a large update never blocks the
//! host for longer than one slice.
//!
//! ## Architecture
//!
//! ```text
//! Node tree ──render──▶ work-in-progress fibers ──work_loop (sliced)──▶ commit ──▶ RenderTarget
//!                               │ alternate
//!                               ▼
//!                        committed fibers
//! ```
//!
//! Two fiber trees exist at most: the committed one and the one being
//! built. Work-in-progress fibers point at their committed counterparts
//! (`alternate`) to reuse handles and hook state without touching the
//! committed tree. Nothing reaches the target until the whole tree has
//! been walked.
//!
//! ## Example
//!
//! ```ignore
//! use spark_reconciler::*;
//!
//! fn counter(_: &Props, hooks: &mut Hooks<'_>) -> Node {
//!     let (count, set_count) = hooks.use_state(1);
//!     create_element(
//!         "h1",
//!         Props::new().with("onClick", Value::listener(move |_| set_count.update(|c| c + 1))),
//!         [count.into()],
//!     )
//! }
//!
//! let mut target = MemoryTarget::new();
//! let container = target.create_container();
//! let mut session = RenderSession::new(target);
//!
//! session.render(create_element(Component::new(counter), Props::new(), []), container);
//! run_until_idle(&mut session, &mut ThreadIdleHost::default())?;
//! ```
//!
//! ## Modules
//!
//! - [`node`] - Node model: tags, props, values, factories
//! - [`fiber`] - Fiber arena and effect tags
//! - [`target`] - Render-target trait, prop diff, in-memory target
//! - [`hooks`] - Positional state hooks
//! - [`reconciler`] - Session, work loop, diff, commit, scheduling

pub mod config;
pub mod error;
pub mod fiber;
pub mod hooks;
pub mod node;
pub mod reconciler;
pub mod target;

pub use config::SessionConfig;
pub use error::{ReconcileError, Result};
pub use fiber::{EffectTag, Fiber, FiberArena, FiberId, FiberType};
pub use hooks::{Hooks, SetState};
pub use node::{
    Child, Component, Event, Listener, Node, Props, RenderFn, Tag, Value, create_element,
    create_text_element,
};
pub use reconciler::{
    CommitReport, Deadline, FixedDeadline, IdleDeadline, IdleHost, MinRemaining, RenderSession,
    ThreadIdleHost, Unbounded, WorkStatus, YieldPolicy, run_until_idle,
};
pub use target::{
    HostKind, MemoryKind, MemoryTarget, Mutation, MutationKinds, NodeHandle, RenderTarget,
    update_props,
};

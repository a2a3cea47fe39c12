//! RenderSession - The one owned value holding all render-cycle state.
//!
//! There are no statics. Everything the work loop touches lives here and
//! is mutated only through `&mut self`, so the single-writer rule holds by
//! construction. The session is `!Send` (hooks and listeners are `Rc`), so
//! it cannot be shared across threads either.
//!
//! # Render Cycle
//!
//! ```text
//! render(node, container)
//!     └─▶ wip_root = Root { handle: container, children: [node], alternate: current_root }
//! work_loop(deadline)            (repeated, one per idle slice)
//!     └─▶ perform_unit_of_work ... until walk done or policy yields
//! walk done
//!     └─▶ commit_root: deletions, then wip tree, then current_root = wip_root
//! ```
//!
//! # Known Race: Last Caller Wins
//!
//! A `render` call, or a state update, while a previous render is still
//! being walked overwrites the in-flight tree. The abandoned tree was
//! never committed, so it is simply released; nothing is cancelled and
//! nothing is merged. A state update restarts from the committed root, so
//! it also discards a node passed to an in-flight `render`. The reverse
//! order is safe: `render` after a state update consumes the request and
//! the updates fold into the new tree.

use std::rc::Rc;

use spark_signals::{Signal, signal};
use tracing::debug;

use super::commit::CommitReport;
use super::scheduler::{Deadline, MinRemaining, Unbounded, YieldPolicy};
use crate::config::SessionConfig;
use crate::error::Result;
use crate::fiber::{EffectTag, Fiber, FiberArena, FiberId};
use crate::hooks::RenderRequest;
use crate::node::{Node, Props};
use crate::target::RenderTarget;

/// Outcome of one [`RenderSession::work_loop`] slice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkStatus {
    /// Nothing to do.
    Idle,
    /// The slice ran out; work resumes on the next call.
    Yielded,
    /// The walk finished and the tree was committed.
    Committed(CommitReport),
}

/// Incremental reconciler bound to one render target.
pub struct RenderSession<T: RenderTarget> {
    pub(super) target: T,
    pub(super) arena: FiberArena<T::Handle>,
    pub(super) next_unit_of_work: Option<FiberId>,
    pub(super) wip_root: Option<FiberId>,
    pub(super) current_root: Option<FiberId>,
    pub(super) deletions: Vec<FiberId>,
    pub(super) config: SessionConfig,
    pub(super) request: RenderRequest,
    policy: Box<dyn YieldPolicy>,
    commits: Signal<u64>,
}

impl<T: RenderTarget> RenderSession<T> {
    pub fn new(target: T) -> Self {
        Self::with_config(target, SessionConfig::default())
    }

    pub fn with_config(target: T, config: SessionConfig) -> Self {
        let policy = MinRemaining::new(config.yield_threshold);
        Self {
            target,
            arena: FiberArena::new(),
            next_unit_of_work: None,
            wip_root: None,
            current_root: None,
            deletions: Vec::new(),
            config,
            request: RenderRequest::default(),
            policy: Box::new(policy),
            commits: signal(0),
        }
    }

    /// Replace the default [`MinRemaining`] policy.
    pub fn set_yield_policy(&mut self, policy: impl YieldPolicy + 'static) {
        self.policy = Box::new(policy);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }

    pub fn arena(&self) -> &FiberArena<T::Handle> {
        &self.arena
    }

    /// Root of the last committed tree.
    pub fn current_root(&self) -> Option<FiberId> {
        self.current_root
    }

    /// Root of the tree being walked, if a render is in flight.
    pub fn work_in_progress_root(&self) -> Option<FiberId> {
        self.wip_root
    }

    /// Committed fibers marked for removal by the in-flight render.
    pub fn pending_deletions(&self) -> &[FiberId] {
        &self.deletions
    }

    /// Reactive commit counter, bumped once per commit.
    ///
    /// Hosts can subscribe with `spark_signals::effect` to react to commits.
    pub fn commits(&self) -> Signal<u64> {
        self.commits.clone()
    }

    /// Whether a render is in flight or a state update is waiting for one.
    pub fn has_pending_work(&self) -> bool {
        self.wip_root.is_some() || (self.request.is_raised() && self.current_root.is_some())
    }

    // =========================================================================
    // Render
    // =========================================================================

    /// Start rendering `node` into `container`.
    ///
    /// No work happens here; it starts with the next [`work_loop`](Self::work_loop).
    /// Overwrites any render still in flight. Also satisfies any pending
    /// state update: the new tree diffs against the committed one, so every
    /// queued update is folded in.
    pub fn render(&mut self, node: Node, container: T::Handle) {
        let props = Rc::new(Props::new().with_children(vec![node]));
        debug!(?container, "render requested");
        self.request.take();
        self.begin(props, container);
    }

    fn begin(&mut self, props: Rc<Props>, container: T::Handle) {
        self.abandon_work_in_progress();
        let root = self
            .arena
            .insert(Fiber::root(props, container, self.current_root));
        self.wip_root = Some(root);
        self.next_unit_of_work = Some(root);
    }

    /// Drop the in-flight tree, if any, and undo the deletion marks it put
    /// on committed fibers.
    fn abandon_work_in_progress(&mut self) {
        for id in self.deletions.drain(..) {
            if let Some(fiber) = self.arena.get_mut(id) {
                fiber.effect = EffectTag::None;
            }
        }
        if let Some(root) = self.wip_root.take() {
            let released = self.arena.release_tree(root);
            debug!(released, "abandoned uncommitted render");
        }
        self.next_unit_of_work = None;
    }

    /// Restart from the committed root if a setter asked for it.
    ///
    /// Requests made before the first commit stay pending until one exists.
    fn restart_for_updates(&mut self) {
        if !self.request.is_raised() {
            return;
        }
        let Some(current) = self.current_root else { return };
        self.request.take();

        let Some((props, handle)) = self
            .arena
            .get(current)
            .and_then(|root| Some((root.props.clone(), root.handle.clone()?)))
        else {
            tracing::warn!("committed root missing; dropping state update request");
            return;
        };
        debug!("state update: re-rendering from root");
        self.begin(props, handle);
    }

    // =========================================================================
    // Work Loop
    // =========================================================================

    /// Run one idle slice.
    ///
    /// Performs units of work until the walk completes or the yield policy
    /// says the slice is spent, checking after every unit. Commits only once
    /// the whole tree has been walked.
    ///
    /// On error the in-flight tree is discarded and the committed tree is
    /// left as it was.
    pub fn work_loop(&mut self, deadline: &dyn Deadline) -> Result<WorkStatus> {
        self.restart_for_updates();

        while let Some(fiber) = self.next_unit_of_work {
            match self.perform_unit_of_work(fiber) {
                Ok(next) => self.next_unit_of_work = next,
                Err(err) => {
                    tracing::warn!(error = %err, "render aborted");
                    self.abandon_work_in_progress();
                    return Err(err);
                }
            }
            self.restart_for_updates();
            if self.policy.should_yield(deadline) {
                break;
            }
        }

        if self.next_unit_of_work.is_none() && self.wip_root.is_some() {
            let report = self.commit_root();
            self.commits.set(self.commits.get() + 1);
            return Ok(WorkStatus::Committed(report));
        }

        if self.next_unit_of_work.is_some() {
            Ok(WorkStatus::Yielded)
        } else {
            Ok(WorkStatus::Idle)
        }
    }

    /// Run slices without a deadline until no work is left.
    /// Returns how many commits happened.
    pub fn flush(&mut self) -> Result<usize> {
        let mut commits = 0;
        while self.has_pending_work() {
            if let WorkStatus::Committed(_) = self.work_loop(&Unbounded)? {
                commits += 1;
            }
        }
        Ok(commits)
    }
}

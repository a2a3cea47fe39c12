//! Commit phase - Apply a finished tree to the render target.
//!
//! Runs only after the whole work-in-progress tree has been walked, and
//! runs to completion in one go, so the target never sees a half-built
//! tree. Order:
//!
//! 1. removals queued during the diff
//! 2. the new tree, pre-order (self, child, sibling)
//! 3. publish the new tree as current, release the previous one

use tracing::{debug, warn};

use super::session::RenderSession;
use crate::fiber::{EffectTag, FiberArena, FiberId};
use crate::node::{Listener, Props, Value};
use crate::target::{HostKind, MutationKinds, RenderTarget, update_props};

/// Summary of one commit.
///
/// Fiber counts include component fibers, which carry effect tags but
/// never touch the target themselves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub placements: usize,
    pub updates: usize,
    pub deletions: usize,
    /// Target operations issued.
    pub operations: usize,
    /// Which kinds of operations were issued.
    pub kinds: MutationKinds,
}

impl CommitReport {
    /// Whether the commit changed tree shape in the target.
    pub fn is_structural(&self) -> bool {
        self.kinds.intersects(MutationKinds::STRUCTURAL)
    }
}

// =============================================================================
// Recorder
// =============================================================================

/// Forwards to the real target while counting what passes through.
struct Recorder<'a, T> {
    target: &'a mut T,
    operations: usize,
    kinds: MutationKinds,
}

impl<'a, T> Recorder<'a, T> {
    fn new(target: &'a mut T) -> Self {
        Self {
            target,
            operations: 0,
            kinds: MutationKinds::empty(),
        }
    }

    fn note(&mut self, kind: MutationKinds) {
        self.operations += 1;
        self.kinds |= kind;
    }
}

impl<T: RenderTarget> RenderTarget for Recorder<'_, T> {
    type Handle = T::Handle;

    fn create_handle(&mut self, kind: HostKind<'_>) -> Self::Handle {
        self.note(MutationKinds::CREATE);
        self.target.create_handle(kind)
    }

    fn set_property(&mut self, handle: &Self::Handle, name: &str, value: &Value) {
        self.note(MutationKinds::SET);
        self.target.set_property(handle, name, value);
    }

    fn clear_property(&mut self, handle: &Self::Handle, name: &str) {
        self.note(MutationKinds::CLEAR);
        self.target.clear_property(handle, name);
    }

    fn add_listener(&mut self, handle: &Self::Handle, event: &str, listener: &Listener) {
        self.note(MutationKinds::LISTEN);
        self.target.add_listener(handle, event, listener);
    }

    fn remove_listener(&mut self, handle: &Self::Handle, event: &str, listener: &Listener) {
        self.note(MutationKinds::UNLISTEN);
        self.target.remove_listener(handle, event, listener);
    }

    fn append_child(&mut self, parent: &Self::Handle, child: &Self::Handle) {
        self.note(MutationKinds::APPEND);
        self.target.append_child(parent, child);
    }

    fn remove_child(&mut self, parent: &Self::Handle, child: &Self::Handle) {
        self.note(MutationKinds::REMOVE);
        self.target.remove_child(parent, child);
    }
}

// =============================================================================
// Commit
// =============================================================================

impl<T: RenderTarget> RenderSession<T> {
    pub(super) fn commit_root(&mut self) -> CommitReport {
        let mut report = CommitReport::default();
        let Some(wip) = self.wip_root.take() else { return report };

        let deletions = std::mem::take(&mut self.deletions);
        let tree = self.arena.descendants(wip);
        let prefix = self.config.listener_prefix.as_ref();
        let mut ops = Recorder::new(&mut self.target);

        for &id in &deletions {
            commit_deletion(&self.arena, &mut ops, id);
            report.deletions += 1;
        }
        // Skip the root itself: it is the caller's container.
        for &id in tree.iter().skip(1) {
            commit_work(&self.arena, &mut ops, id, prefix, &mut report);
        }

        report.operations = ops.operations;
        report.kinds = ops.kinds;

        // The committed tree carries no effect tags and no history.
        for &id in &tree {
            if let Some(fiber) = self.arena.get_mut(id) {
                fiber.effect = EffectTag::None;
                fiber.alternate = None;
            }
        }

        let released = self
            .current_root
            .replace(wip)
            .map_or(0, |old| self.arena.release_tree(old));

        debug!(
            placements = report.placements,
            updates = report.updates,
            deletions = report.deletions,
            operations = report.operations,
            released,
            "committed"
        );
        report
    }
}

fn commit_work<T: RenderTarget>(
    arena: &FiberArena<T::Handle>,
    ops: &mut T,
    id: FiberId,
    prefix: &str,
    report: &mut CommitReport,
) {
    let Some(fiber) = arena.get(id) else { return };
    match fiber.effect {
        EffectTag::Placement => {
            report.placements += 1;
            let Some(handle) = &fiber.handle else { return };
            update_props(ops, handle, &Props::default(), &fiber.props, prefix);
            match host_parent(arena, id) {
                Some(parent) => ops.append_child(&parent, handle),
                None => warn!(?id, "placement has no host ancestor"),
            }
        }
        EffectTag::Update => {
            report.updates += 1;
            let Some(handle) = &fiber.handle else { return };
            match fiber.alternate.and_then(|alt| arena.get(alt)) {
                Some(old) => update_props(ops, handle, &old.props, &fiber.props, prefix),
                None => warn!(?id, "update has no alternate"),
            }
        }
        EffectTag::Deletion => commit_deletion(arena, ops, id),
        EffectTag::None => {}
    }
}

/// Remove the nearest handle owned by `id` or, for a component fiber,
/// by its first descendant that has one.
fn commit_deletion<T: RenderTarget>(arena: &FiberArena<T::Handle>, ops: &mut T, id: FiberId) {
    let Some(parent) = host_parent(arena, id) else {
        warn!(?id, "deletion has no host ancestor");
        return;
    };
    let mut cursor = Some(id);
    while let Some(current) = cursor {
        let Some(fiber) = arena.get(current) else { return };
        if let Some(handle) = &fiber.handle {
            ops.remove_child(&parent, handle);
            return;
        }
        cursor = fiber.child;
    }
}

/// Handle of the nearest ancestor that owns one (components are skipped).
fn host_parent<H: Clone>(arena: &FiberArena<H>, id: FiberId) -> Option<H> {
    arena
        .ancestors(id)
        .find_map(|ancestor| arena.get(ancestor).and_then(|f| f.handle.clone()))
}

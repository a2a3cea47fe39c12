//! Fiber arena - Allocation, traversal and release of fiber trees.

use slotmap::SlotMap;

use super::{Fiber, FiberId};

/// Storage for every live fiber: the committed tree, the work-in-progress
/// tree and fibers queued for deletion.
#[derive(Debug)]
pub struct FiberArena<H> {
    fibers: SlotMap<FiberId, Fiber<H>>,
}

impl<H> FiberArena<H> {
    pub fn new() -> Self {
        Self {
            fibers: SlotMap::with_key(),
        }
    }

    pub fn insert(&mut self, fiber: Fiber<H>) -> FiberId {
        self.fibers.insert(fiber)
    }

    pub fn get(&self, id: FiberId) -> Option<&Fiber<H>> {
        self.fibers.get(id)
    }

    pub fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber<H>> {
        self.fibers.get_mut(id)
    }

    pub fn contains(&self, id: FiberId) -> bool {
        self.fibers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// Children of `id` in sibling order.
    pub fn children(&self, id: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut cursor = self.get(id).and_then(|f| f.child);
        while let Some(child) = cursor {
            out.push(child);
            cursor = self.get(child).and_then(|f| f.sibling);
        }
        out
    }

    /// `id` and everything below it, pre-order. Siblings of `id` are not included.
    pub fn descendants(&self, id: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(fiber) = self.get(current) else { continue };
            out.push(current);
            if current != id {
                if let Some(sibling) = fiber.sibling {
                    stack.push(sibling);
                }
            }
            if let Some(child) = fiber.child {
                stack.push(child);
            }
        }
        out
    }

    /// Walk parent links starting at the parent of `id`.
    pub fn ancestors(&self, id: FiberId) -> impl Iterator<Item = FiberId> + '_ {
        std::iter::successors(self.get(id).and_then(|f| f.parent), move |&current| {
            self.get(current).and_then(|f| f.parent)
        })
    }

    /// Remove `id` and its subtree. Returns how many fibers were released.
    pub fn release_tree(&mut self, id: FiberId) -> usize {
        let ids = self.descendants(id);
        for fiber in &ids {
            self.fibers.remove(*fiber);
        }
        ids.len()
    }
}

impl<H> Default for FiberArena<H> {
    fn default() -> Self {
        Self::new()
    }
}

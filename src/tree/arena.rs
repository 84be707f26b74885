//! Slot storage for tree nodes.
//!
//! Nodes are addressed by [`NodeId`] indices instead of pointers. Every slot
//! carries a generation counter that is bumped when its node is destroyed,
//! so a [`Handle`] taken before the destruction no longer resolves, even if
//! the slot has since been reused for a new node. Every arena also carries
//! a process-wide unique id, so a handle never resolves in another arena.

use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ARENA_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

pub(crate) type Link = Option<NodeId>;

/// A node index paired with its arena and the generation it was created in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Handle {
    arena: usize,
    index: usize,
    generation: u32,
}

pub(crate) struct Node<K> {
    pub(crate) key: K,
    pub(crate) left: Link,
    pub(crate) right: Link,
    pub(crate) parent: Link,
    // Leaf is 1, absent child is 0.
    pub(crate) height: u8,
}

struct Slot<K> {
    generation: u32,
    node: Option<Node<K>>,
}

pub(crate) struct Arena<K> {
    id: usize,
    slots: Vec<Slot<K>>,
    free: Vec<NodeId>,
}

impl<K> Arena<K> {
    pub(crate) fn new() -> Self {
        Self {
            id: NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Allocates a detached leaf node below `parent`.
    /// The caller links it into the parent's child slot.
    pub(crate) fn create(&mut self, parent: Link, key: K) -> NodeId {
        let node = Node {
            key,
            parent,
            left: None,
            right: None,
            height: 1,
        };
        match self.free.pop() {
            Some(id) => {
                let slot = &mut self.slots[id.0];
                debug_assert!(slot.node.is_none());
                slot.node = Some(node);
                id
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Releases a node and returns its key.
    /// The node must already be unlinked from its parent and children.
    pub(crate) fn destroy(&mut self, id: NodeId) -> K {
        let slot = &mut self.slots[id.0];
        let node = match slot.node.take() {
            Some(node) => node,
            None => unreachable!("destroying vacant node slot {}", id.0),
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id);
        node.key
    }

    pub(crate) fn handle(&self, id: NodeId) -> Handle {
        Handle {
            arena: self.id,
            index: id.0,
            generation: self.slots[id.0].generation,
        }
    }

    /// Returns the node a handle refers to, if that node is still alive
    /// and the handle was taken from this arena.
    pub(crate) fn resolve(&self, handle: Handle) -> Link {
        if handle.arena != self.id {
            return None;
        }
        let slot = self.slots.get(handle.index)?;
        if slot.generation == handle.generation && slot.node.is_some() {
            Some(NodeId(handle.index))
        } else {
            None
        }
    }

    /// Number of node slots, live or free. Slots are never released.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub(crate) fn num_live(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

impl<K> Index<NodeId> for Arena<K> {
    type Output = Node<K>;

    fn index(&self, id: NodeId) -> &Node<K> {
        match &self.slots[id.0].node {
            Some(node) => node,
            None => unreachable!("link to vacant node slot {}", id.0),
        }
    }
}

impl<K> IndexMut<NodeId> for Arena<K> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K> {
        match &mut self.slots[id.0].node {
            Some(node) => node,
            None => unreachable!("link to vacant node slot {}", id.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Arena;

    #[test]
    fn test_reuse_invalidates_handle() {
        let mut arena = Arena::new();
        let a = arena.create(None, 'a');
        let handle = arena.handle(a);
        assert_eq!(arena.resolve(handle), Some(a));

        assert_eq!(arena.destroy(a), 'a');
        assert_eq!(arena.resolve(handle), None);

        // Same slot, new generation
        let b = arena.create(None, 'b');
        assert_eq!(a, b);
        assert_eq!(arena.resolve(handle), None);
        assert_eq!(arena.resolve(arena.handle(b)), Some(b));
        assert_eq!(arena[b].key, 'b');
        assert_eq!(arena[b].height, 1);
        assert_eq!(arena.num_live(), 1);
        assert_eq!(arena.capacity(), 1);
    }

    #[test]
    fn test_handle_from_other_arena() {
        let mut first = Arena::new();
        let mut second = Arena::new();
        let a = first.create(None, 'a');
        let b = second.create(None, 'b');
        // Same slot index and generation in both arenas
        assert_eq!(a, b);
        assert_eq!(second.resolve(first.handle(a)), None);
        assert_eq!(first.resolve(second.handle(b)), None);
        assert_eq!(first.resolve(first.handle(a)), Some(a));
    }
}

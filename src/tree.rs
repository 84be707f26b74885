//! The AVL tree behind [`AvlTreeSet`](crate::AvlTreeSet).
//!
//! Nodes keep a parent link next to their child links, so in-order
//! neighbours can be found without a stack and rotations can be applied
//! bottom-up while walking towards the root.

mod arena;

use std::borrow::Borrow;
use std::cmp::{self, Ordering};

use log::{debug, trace};

use arena::Arena;
pub(crate) use arena::{Handle, Link, NodeId};

pub(crate) struct Tree<K> {
    arena: Arena<K>,
    root: Link,
    num_nodes: usize,
}

enum InsertPos {
    Found(NodeId),
    Root,
    Child(NodeId, Side),
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

impl<K> Tree<K> {
    pub(crate) fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            num_nodes: 0,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn len(&self) -> usize {
        self.num_nodes
    }

    pub(crate) fn height(&self) -> usize {
        usize::from(self.height_of(self.root))
    }

    pub(crate) fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    pub(crate) fn key(&self, node: NodeId) -> &K {
        &self.arena[node].key
    }

    pub(crate) fn handle(&self, node: NodeId) -> Handle {
        self.arena.handle(node)
    }

    pub(crate) fn resolve(&self, handle: Handle) -> Link {
        self.arena.resolve(handle)
    }

    pub(crate) fn has_two_children(&self, node: NodeId) -> bool {
        let node = &self.arena[node];
        node.left.is_some() && node.right.is_some()
    }

    /// Destroys all nodes, children before parents.
    pub(crate) fn clear(&mut self) {
        debug!("clearing tree with {} nodes", self.num_nodes);
        let mut nodes = Vec::with_capacity(self.num_nodes);
        self.postorder(|node| nodes.push(node));
        for node in nodes {
            self.arena.destroy(node);
        }
        self.root = None;
        self.num_nodes = 0;
    }

    /// Empties the tree and returns its keys in ascending order.
    pub(crate) fn drain_sorted(&mut self) -> Vec<K> {
        let mut nodes = Vec::with_capacity(self.num_nodes);
        self.inorder(|node| nodes.push(node));
        let keys = nodes
            .into_iter()
            .map(|node| self.arena.destroy(node))
            .collect();
        self.root = None;
        self.num_nodes = 0;
        keys
    }

    pub(crate) fn first(&self) -> Link {
        self.root.map(|root| self.leftmost(root))
    }

    pub(crate) fn last(&self) -> Link {
        self.root.map(|root| self.rightmost(root))
    }

    /// Returns the node following `node` in key order,
    /// or `None` if `node` holds the largest key.
    pub(crate) fn successor(&self, node: NodeId) -> Link {
        if let Some(right) = self.arena[node].right {
            return Some(self.leftmost(right));
        }
        let mut child = node;
        let mut parent = self.arena[node].parent;
        while let Some(parent_id) = parent {
            if self.arena[parent_id].left == Some(child) {
                break;
            }
            child = parent_id;
            parent = self.arena[parent_id].parent;
        }
        parent
    }

    /// Returns the node preceding `node` in key order,
    /// or `None` if `node` holds the smallest key.
    pub(crate) fn predecessor(&self, node: NodeId) -> Link {
        if let Some(left) = self.arena[node].left {
            return Some(self.rightmost(left));
        }
        let mut child = node;
        let mut parent = self.arena[node].parent;
        while let Some(parent_id) = parent {
            if self.arena[parent_id].right == Some(child) {
                break;
            }
            child = parent_id;
            parent = self.arena[parent_id].parent;
        }
        parent
    }

    fn leftmost(&self, mut node: NodeId) -> NodeId {
        while let Some(left) = self.arena[node].left {
            node = left;
        }
        node
    }

    fn rightmost(&self, mut node: NodeId) -> NodeId {
        while let Some(right) = self.arena[node].right {
            node = right;
        }
        node
    }

    /// Unlinks and destroys the key held by `target`.
    ///
    /// A node with two children is not unlinked itself: it takes over the
    /// key of its in-order successor and the successor's node is destroyed
    /// instead. Returns the removed key and the parent of the destroyed
    /// node, from where the tree has been rebalanced.
    pub(crate) fn remove_node(&mut self, target: NodeId) -> (K, Link) {
        debug_assert!(self.num_nodes >= 1);

        // Node to-unlink is stem or leaf
        let unlinked = match (self.arena[target].left, self.arena[target].right) {
            (Some(_), Some(right)) => self.leftmost(right),
            _ => target,
        };
        debug_assert!(unlinked == target || self.arena[unlinked].left.is_none());

        let child = self.arena[unlinked].left.or(self.arena[unlinked].right);
        let parent = self.arena[unlinked].parent;
        if let Some(child) = child {
            self.arena[child].parent = parent;
        }
        self.replace_child(parent, unlinked, child);

        let mut key = self.arena.destroy(unlinked);
        if unlinked != target {
            std::mem::swap(&mut self.arena[target].key, &mut key);
        }
        self.num_nodes -= 1;

        // Parent node might be out of balance now
        self.rebalance(parent);
        (key, parent)
    }

    // Points the child slot of `parent` that holds `old` at `new`.
    // Without a parent, `old` is the root.
    fn replace_child(&mut self, parent: Link, old: NodeId, new: Link) {
        match parent {
            None => self.root = new,
            Some(parent_id) => {
                let parent = &mut self.arena[parent_id];
                if parent.left == Some(old) {
                    parent.left = new;
                } else {
                    debug_assert!(parent.right == Some(old));
                    parent.right = new;
                }
            }
        }
    }

    fn height_of(&self, link: Link) -> u8 {
        match link {
            None => 0,
            Some(node) => self.arena[node].height,
        }
    }

    /// Right subtree height minus left subtree height.
    fn balance_factor(&self, node: NodeId) -> i32 {
        let node = &self.arena[node];
        i32::from(self.height_of(node.right)) - i32::from(self.height_of(node.left))
    }

    fn adjust_height(&mut self, node: NodeId) {
        let height = 1 + cmp::max(
            self.height_of(self.arena[node].left),
            self.height_of(self.arena[node].right),
        );
        self.arena[node].height = height;
    }

    fn rotate_left(&mut self, node: NodeId) {
        if let Some(right) = self.arena[node].right {
            trace!("rotate left at {:?}", node);
            let right_left = self.arena[right].left;
            self.arena[node].right = right_left;
            if let Some(right_left) = right_left {
                self.arena[right_left].parent = Some(node);
            }

            let parent = self.arena[node].parent;
            self.arena[right].parent = parent;
            self.replace_child(parent, node, Some(right));

            self.arena[right].left = Some(node);
            self.arena[node].parent = Some(right);

            // Lowered node first, it is a child of the promoted one now
            self.adjust_height(node);
            self.adjust_height(right);
        }
    }

    fn rotate_right(&mut self, node: NodeId) {
        if let Some(left) = self.arena[node].left {
            trace!("rotate right at {:?}", node);
            let left_right = self.arena[left].right;
            self.arena[node].left = left_right;
            if let Some(left_right) = left_right {
                self.arena[left_right].parent = Some(node);
            }

            let parent = self.arena[node].parent;
            self.arena[left].parent = parent;
            self.replace_child(parent, node, Some(left));

            self.arena[left].right = Some(node);
            self.arena[node].parent = Some(left);

            self.adjust_height(node);
            self.adjust_height(left);
        }
    }

    /// Rebalances nodes starting from given position up to the root node.
    fn rebalance(&mut self, start_from: Link) {
        trace!("rebalance from {:?}", start_from);
        let mut current = start_from;
        while let Some(node) = current {
            let parent = self.arena[node].parent;
            self.rebalance_node(node);
            current = parent;
        }
    }

    /// Rebalances nodes starting from given position up to the root node.
    /// Stops after first rebalance operation.
    /// This is enough to restore balance after a single insert operation.
    fn rebalance_once(&mut self, start_from: Link) {
        let mut current = start_from;
        while let Some(node) = current {
            let parent = self.arena[node].parent;
            if self.rebalance_node(node) {
                break;
            }
            current = parent;
        }
    }

    /// Restores AVL condition (balance) at given node if necessary and adjusts height.
    /// Resulting balance factor will be -1, 0 or +1.
    /// Initial balance factor must not exceed +2 or -2, which always holds after a single update.
    /// Returns whether a rotation had been necessary.
    fn rebalance_node(&mut self, node: NodeId) -> bool {
        let balance = self.balance_factor(node);
        debug_assert!((-2..=2).contains(&balance));
        if balance > 1 {
            // Right heavy, a left heavy right child needs a double rotation
            if let Some(right) = self.arena[node].right {
                if self.balance_factor(right) < 0 {
                    self.rotate_right(right);
                }
            }
            self.rotate_left(node);
            true
        } else if balance < -1 {
            if let Some(left) = self.arena[node].left {
                if self.balance_factor(left) > 0 {
                    self.rotate_left(left);
                }
            }
            self.rotate_right(node);
            true
        } else {
            self.adjust_height(node);
            false
        }
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn preorder<F: FnMut(NodeId)>(&self, f: F) {
        self.traverse(f, |_| {}, |_| {});
    }

    fn inorder<F: FnMut(NodeId)>(&self, f: F) {
        self.traverse(|_| {}, f, |_| {});
    }

    fn postorder<F: FnMut(NodeId)>(&self, f: F) {
        self.traverse(|_| {}, |_| {}, f);
    }

    fn traverse<Pre, In, Post>(&self, mut preorder: Pre, mut inorder: In, mut postorder: Post)
    where
        Pre: FnMut(NodeId),
        In: FnMut(NodeId),
        Post: FnMut(NodeId),
    {
        if let Some(mut node) = self.root {
            let mut dir = Direction::FromParent;
            loop {
                match dir {
                    Direction::FromParent => {
                        preorder(node);
                        if let Some(left) = self.arena[node].left {
                            node = left;
                        } else {
                            dir = Direction::FromLeft;
                        }
                    }
                    Direction::FromLeft => {
                        inorder(node);
                        if let Some(right) = self.arena[node].right {
                            node = right;
                            dir = Direction::FromParent;
                        } else {
                            dir = Direction::FromRight;
                        }
                    }
                    Direction::FromRight => {
                        postorder(node);
                        match self.arena[node].parent {
                            Some(parent) => {
                                if self.arena[parent].left == Some(node) {
                                    dir = Direction::FromLeft;
                                } else {
                                    dir = Direction::FromRight;
                                }
                                node = parent;
                            }
                            None => break,
                        }
                    }
                }
            }
        }
    }
}

impl<K: Ord> Tree<K> {
    pub(crate) fn find<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(node) = current {
            current = match key.cmp(self.arena[node].key.borrow()) {
                Ordering::Equal => break,
                Ordering::Less => self.arena[node].left,
                Ordering::Greater => self.arena[node].right,
            };
        }
        current
    }

    /// Inserts `key` unless an equal key is present.
    /// Returns the node holding the key and whether it was newly created.
    pub(crate) fn insert(&mut self, key: K) -> (NodeId, bool) {
        match self.find_insert_pos(&key) {
            InsertPos::Found(node) => (node, false),
            InsertPos::Root => {
                let node = self.arena.create(None, key);
                self.root = Some(node);
                self.num_nodes += 1;
                (node, true)
            }
            InsertPos::Child(parent, side) => {
                let node = self.arena.create(Some(parent), key);
                match side {
                    Side::Left => self.arena[parent].left = Some(node),
                    Side::Right => self.arena[parent].right = Some(node),
                }
                self.num_nodes += 1;
                self.rebalance_once(Some(parent));
                (node, true)
            }
        }
    }

    fn find_insert_pos(&self, key: &K) -> InsertPos {
        let mut node = match self.root {
            None => return InsertPos::Root,
            Some(root) => root,
        };
        loop {
            let (side, next) = match key.cmp(&self.arena[node].key) {
                Ordering::Equal => return InsertPos::Found(node),
                Ordering::Less => (Side::Left, self.arena[node].left),
                Ordering::Greater => (Side::Right, self.arena[node].right),
            };
            match next {
                Some(child) => node = child,
                None => return InsertPos::Child(node, side),
            }
        }
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub(crate) fn check_consistency(&self) {
        // Check root link
        if let Some(root) = self.root {
            assert!(self.arena[root].parent.is_none());
        }

        // Check tree nodes
        let mut num_nodes = 0;
        self.preorder(|node| {
            let mut left_height = 0;
            let mut right_height = 0;

            // Check link for left child node
            if let Some(left) = self.arena[node].left {
                assert!(self.arena[left].parent == Some(node));
                assert!(self.arena[left].key < self.arena[node].key);
                left_height = self.arena[left].height;
            }

            // Check link for right child node
            if let Some(right) = self.arena[node].right {
                assert!(self.arena[right].parent == Some(node));
                assert!(self.arena[right].key > self.arena[node].key);
                right_height = self.arena[right].height;
            }

            // Check height
            assert_eq!(
                self.arena[node].height,
                1 + cmp::max(left_height, right_height)
            );

            // Check AVL condition (nearly balance)
            assert!(left_height <= right_height + 1);
            assert!(right_height <= left_height + 1);

            num_nodes += 1;
        });

        // Check number of nodes
        assert_eq!(num_nodes, self.num_nodes);
        assert_eq!(self.arena.num_live(), self.num_nodes);

        // Check in-order neighbours, strictly ascending across subtrees
        let mut previous: Link = None;
        let mut current = self.first();
        while let Some(node) = current {
            assert_eq!(self.predecessor(node), previous);
            if let Some(previous) = previous {
                assert!(self.arena[previous].key < self.arena[node].key);
            }
            previous = current;
            current = self.successor(node);
        }
        assert_eq!(previous, self.last());
    }
}

#[cfg(test)]
mod tests {
    use super::Tree;

    fn perfect_tree() -> Tree<i32> {
        //     4
        //   2   6
        //  1 3 5 7
        let mut tree = Tree::new();
        for key in 1..=7 {
            tree.insert(key);
        }
        assert_eq!(tree.root.map(|root| tree.arena[root].key), Some(4));
        tree
    }

    #[test]
    fn test_check_consistency() {
        perfect_tree().check_consistency();
    }

    #[test]
    #[should_panic]
    fn test_check_consistency_misordered_subtree() {
        // 10 is larger than its parent 2 but sits left of the root 4
        let mut tree = perfect_tree();
        let node = tree.find(&3).unwrap();
        tree.arena[node].key = 10;
        tree.check_consistency();
    }
}

//! An ordered set implemented with an AVL tree.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::{FromIterator, FusedIterator};

use crate::error::{Error, Result};
use crate::tree::{Handle, Link, NodeId, Tree};

/// An ordered set implemented with an AVL tree.
///
/// Besides the usual by-value operations the set hands out [`Position`]s,
/// lightweight handles to single elements that stay valid across unrelated
/// insertions and erasures.
///
/// ```
/// use avl_set::AvlTreeSet;
/// let mut set = AvlTreeSet::new();
/// set.insert(0);
/// set.insert(1);
/// set.insert(2);
/// assert_eq!(set.get(&1), Some(&1));
/// let pos = set.find(&1);
/// set.erase(pos);
/// assert!(set.get(&1).is_none());
/// ```
pub struct AvlTreeSet<T> {
    tree: Tree<T>,
}

/// A handle to an element of an [`AvlTreeSet`], or to the end position
/// one past its largest element.
///
/// Positions do not borrow the set. They are compared by identity: two
/// positions are equal if they name the same element slot, or if both are
/// the end position. A position becomes stale when its element's node is
/// erased; stale positions are detected and rejected by the set.
///
/// A position is only meaningful for the set that returned it. Any other set,
/// including a clone, treats it as stale.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    handle: Option<Handle>,
}

/// A read-only cursor over the elements of a set.
///
/// The cursor points either at an element or at the end position, which
/// sits between the largest and the smallest element: moving past the last
/// element reaches the end position, moving once more wraps to the first.
pub struct Cursor<'a, T> {
    tree: &'a Tree<T>,
    current: Link,
}

/// An iterator over the values of a set.
pub struct Iter<'a, T> {
    tree: &'a Tree<T>,
    front: Link,
    back: Link,
    remaining: usize,
}

/// An owning iterator over the values of a set.
pub struct IntoIter<T> {
    values: std::vec::IntoIter<T>,
}

impl Position {
    /// Returns the end position, shared by all sets.
    pub const fn end() -> Self {
        Self { handle: None }
    }

    /// Returns true if this is the end position.
    pub fn is_end(&self) -> bool {
        self.handle.is_none()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.handle {
            None => write!(f, "Position(end)"),
            Some(handle) => write!(f, "Position({:?})", handle),
        }
    }
}

impl<T: Ord> AvlTreeSet<T> {
    /// Creates an empty set.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self { tree: Tree::new() }
    }

    /// Returns the position of the value equal to the given value,
    /// or the end position if there is none.
    ///
    /// The value may be any borrowed form of the set's value type, but the ordering
    /// on the borrowed form *must* match the ordering on the value type.
    pub fn find<Q>(&self, value: &Q) -> Position
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.position(self.tree.find(value))
    }

    /// Returns a reference to the value in the set that is equal to the given value.
    ///
    /// The value may be any borrowed form of the set's value type, but the ordering
    /// on the borrowed form *must* match the ordering on the value type.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(value).map(|node| self.tree.key(node))
    }

    /// Returns true if the set contains a value.
    ///
    /// The value may be any borrowed form of the set's value type, but the ordering
    /// on the borrowed form *must* match the ordering on the value type.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(value).is_some()
    }

    /// Inserts a value into the set.
    ///
    /// Returns the position of the value in the set and whether it has been
    /// inserted. If an equal value is already present, the set is left
    /// unchanged, the given value is dropped and the position of the
    /// present value is returned along with `false`.
    pub fn insert(&mut self, value: T) -> (Position, bool) {
        let (node, inserted) = self.tree.insert(value);
        (self.position(Some(node)), inserted)
    }

    /// Removes a value from the set.
    /// Returns whether the value was previously in the set.
    ///
    /// The value may be any borrowed form of the set's value type, but the ordering
    /// on the borrowed form *must* match the ordering on the value type.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.take(value).is_some()
    }

    /// Removes a value from the set.
    /// Returns the value if it was previously in the set.
    ///
    /// The value may be any borrowed form of the set's value type, but the ordering
    /// on the borrowed form *must* match the ordering on the value type.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.tree.find(value)?;
        Some(self.tree.remove_node(node).0)
    }

    /// Removes all values from `first` up to, but excluding, `last`.
    ///
    /// Returns the position of the value `last` referred to, or the end
    /// position if `last` is the end position. Since erasure may move a value
    /// into another tree node, the returned position can differ from `last`.
    ///
    /// # Panics
    ///
    /// Panics if `first` or `last` is stale, if `first` is the end position
    /// while `last` is not, or if the value at `last` is smaller than the
    /// value at `first`. Nothing is removed before panicking.
    /// See [`try_erase_range`](Self::try_erase_range) for a non-panicking variant.
    pub fn erase_range(&mut self, first: Position, last: Position) -> Position {
        match self.try_erase_range(first, last) {
            Ok(pos) => pos,
            Err(err) => panic!("erase_range: {}", err),
        }
    }

    /// Removes all values from `first` up to, but excluding, `last`,
    /// like [`erase_range`](Self::erase_range).
    ///
    /// Both bounds are checked before anything is removed: on error the set
    /// is left unchanged.
    pub fn try_erase_range(&mut self, first: Position, last: Position) -> Result<Position> {
        let mut current = self.resolve_or_end(first)?;
        let mut last = self.resolve_or_end(last)?;
        match (current, last) {
            (None, Some(_)) => return Err(Error::EndPosition),
            (Some(first), Some(last)) if self.tree.key(last) < self.tree.key(first) => {
                return Err(Error::ReversedRange);
            }
            _ => {}
        }

        // `last` is end or not before `current`, so the walk stops at it
        while let Some(node) = current {
            if current == last {
                break;
            }
            let next = self.tree.successor(node);
            if self.tree.has_two_children(node) {
                // The next value moves into `node`, whose node stays in place
                // while the node of the next value is destroyed.
                if next == last {
                    last = current;
                }
            } else {
                current = next;
            }
            self.tree.remove_node(node);
        }
        Ok(self.position(last))
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        self.tree.check_consistency()
    }
}

impl<T> AvlTreeSet<T> {
    /// Returns true if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns the height of the underlying tree, 0 for an empty set.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Clears the set, dropping all values.
    /// Every position into the set becomes stale.
    ///
    /// The node storage is kept for reuse by later insertions, see
    /// [`capacity`](Self::capacity). Drop the set to release it.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the number of values the set can hold without allocating
    /// more node storage.
    ///
    /// Node storage only grows: erased values leave their storage behind
    /// for later insertions to reuse.
    pub fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Returns the position of the smallest value,
    /// or the end position if the set is empty.
    pub fn begin(&self) -> Position {
        self.position(self.tree.first())
    }

    /// Returns the end position, one past the largest value.
    pub fn end(&self) -> Position {
        Position::end()
    }

    /// Returns the value at the given position.
    /// Returns `None` for the end position and for stale positions.
    pub fn key_at(&self, pos: Position) -> Option<&T> {
        match self.resolve(pos) {
            Ok(node) => Some(self.tree.key(node)),
            Err(_) => None,
        }
    }

    /// Returns true if the position refers to a value of this set.
    pub fn is_valid(&self, pos: Position) -> bool {
        self.resolve(pos).is_ok()
    }

    /// Returns the position following `pos` in ascending order.
    /// The successor of the largest value is the end position,
    /// the successor of the end position is the smallest value.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is stale.
    pub fn successor(&self, pos: Position) -> Position {
        match self.resolve_or_end(pos) {
            Ok(Some(node)) => self.position(self.tree.successor(node)),
            Ok(None) => self.begin(),
            Err(err) => panic!("successor: {}", err),
        }
    }

    /// Returns the position preceding `pos` in ascending order.
    /// The predecessor of the smallest value is the end position,
    /// the predecessor of the end position is the largest value.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is stale.
    pub fn predecessor(&self, pos: Position) -> Position {
        match self.resolve_or_end(pos) {
            Ok(Some(node)) => self.position(self.tree.predecessor(node)),
            Ok(None) => self.position(self.tree.last()),
            Err(err) => panic!("predecessor: {}", err),
        }
    }

    /// Removes the value at the given position.
    ///
    /// Returns the position from where the tree has been rebalanced, which is
    /// the parent of the removed tree node, or the end position if the root
    /// has been removed. It is *not* the position of the next value; use
    /// [`successor`](Self::successor) before erasing to get that.
    ///
    /// If the value at `pos` has two children in the tree, the next larger
    /// value is moved into its place: `pos` stays valid and refers to that
    /// next value, whereas the position previously referring to the next
    /// value becomes stale. In all other cases `pos` becomes stale.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is the end position or stale.
    /// See [`try_erase`](Self::try_erase) for a non-panicking variant.
    pub fn erase(&mut self, pos: Position) -> Position {
        match self.try_erase(pos) {
            Ok(pos) => pos,
            Err(err) => panic!("erase: {}", err),
        }
    }

    /// Removes the value at the given position, like [`erase`](Self::erase).
    ///
    /// Returns an error instead of panicking if `pos` is the end position or
    /// stale; the set is left unchanged in that case.
    pub fn try_erase(&mut self, pos: Position) -> Result<Position> {
        let node = self.resolve(pos)?;
        let (_, rebalanced_from) = self.tree.remove_node(node);
        Ok(self.position(rebalanced_from))
    }

    /// Returns a reference to the smallest value in the set, if any.
    pub fn first(&self) -> Option<&T> {
        self.tree.first().map(|node| self.tree.key(node))
    }

    /// Returns a reference to the largest value in the set, if any.
    pub fn last(&self) -> Option<&T> {
        self.tree.last().map(|node| self.tree.key(node))
    }

    /// Removes and returns the smallest value in the set, if any.
    pub fn pop_first(&mut self) -> Option<T> {
        let node = self.tree.first()?;
        Some(self.tree.remove_node(node).0)
    }

    /// Removes and returns the largest value in the set, if any.
    pub fn pop_last(&mut self) -> Option<T> {
        let node = self.tree.last()?;
        Some(self.tree.remove_node(node).0)
    }

    /// Returns a cursor pointing at the smallest value,
    /// or at the end position if the set is empty.
    pub fn cursor(&self) -> Cursor<'_, T> {
        Cursor {
            tree: &self.tree,
            current: self.tree.first(),
        }
    }

    /// Returns a cursor pointing at the given position.
    pub fn cursor_at(&self, pos: Position) -> Result<Cursor<'_, T>> {
        Ok(Cursor {
            tree: &self.tree,
            current: self.resolve_or_end(pos)?,
        })
    }

    /// Gets an iterator over the values of the set in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            tree: &self.tree,
            front: self.tree.first(),
            back: self.tree.last(),
            remaining: self.tree.len(),
        }
    }

    fn position(&self, link: Link) -> Position {
        Position {
            handle: link.map(|node| self.tree.handle(node)),
        }
    }

    fn resolve(&self, pos: Position) -> Result<NodeId> {
        match pos.handle {
            None => Err(Error::EndPosition),
            Some(handle) => self.tree.resolve(handle).ok_or(Error::StalePosition),
        }
    }

    // Like `resolve`, but the end position resolves to `None`.
    fn resolve_or_end(&self, pos: Position) -> Result<Link> {
        match pos.handle {
            None => Ok(None),
            Some(handle) => match self.tree.resolve(handle) {
                Some(node) => Ok(Some(node)),
                None => Err(Error::StalePosition),
            },
        }
    }
}

impl<T: Ord> Default for AvlTreeSet<T> {
    /// Creates an empty set.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Clone> Clone for AvlTreeSet<T> {
    /// Creates a set with clones of all values, inserted one by one.
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: Ord> FromIterator<T> for AvlTreeSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for AvlTreeSet<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T: PartialEq> PartialEq for AvlTreeSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for AvlTreeSet<T> {}

impl<T: PartialOrd> PartialOrd for AvlTreeSet<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for AvlTreeSet<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: fmt::Debug> fmt::Debug for AvlTreeSet<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a AvlTreeSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for AvlTreeSet<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;
    fn into_iter(mut self) -> Self::IntoIter {
        IntoIter {
            values: self.tree.drain_sorted().into_iter(),
        }
    }
}

impl<T: Ord> Extend<T> for AvlTreeSet<T> {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        iter.into_iter().for_each(move |value| {
            self.insert(value);
        });
    }
}

impl<'a, T> Extend<&'a T> for AvlTreeSet<T>
where
    T: Ord + Copy,
    T: 'a,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = &'a T>,
    {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a, T> Cursor<'a, T> {
    /// Returns the value the cursor points at, or `None` at the end position.
    pub fn get(&self) -> Option<&'a T> {
        self.current.map(|node| self.tree.key(node))
    }

    /// Returns the position the cursor points at.
    pub fn position(&self) -> Position {
        Position {
            handle: self.current.map(|node| self.tree.handle(node)),
        }
    }

    /// Moves the cursor to the next larger value.
    /// From the largest value it moves to the end position,
    /// from the end position it moves to the smallest value.
    pub fn move_next(&mut self) {
        self.current = self.next_link();
    }

    /// Moves the cursor to the next smaller value.
    /// From the smallest value it moves to the end position,
    /// from the end position it moves to the largest value.
    pub fn move_prev(&mut self) {
        self.current = self.prev_link();
    }

    /// Returns the value [`move_next`](Self::move_next) would move to.
    pub fn peek_next(&self) -> Option<&'a T> {
        self.next_link().map(|node| self.tree.key(node))
    }

    /// Returns the value [`move_prev`](Self::move_prev) would move to.
    pub fn peek_prev(&self) -> Option<&'a T> {
        self.prev_link().map(|node| self.tree.key(node))
    }

    fn next_link(&self) -> Link {
        match self.current {
            Some(node) => self.tree.successor(node),
            None => self.tree.first(),
        }
    }

    fn prev_link(&self) -> Link {
        match self.current {
            Some(node) => self.tree.predecessor(node),
            None => self.tree.last(),
        }
    }
}

// Auto derived clone seems to have an invalid type bound of T: Clone
impl<'a, T> Clone for Cursor<'a, T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            current: self.current,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.get()).finish()
    }
}

// Auto derived clone seems to have an invalid type bound of T: Clone
impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front?;
        self.front = self.tree.successor(node);
        self.remaining -= 1;
        Some(self.tree.key(node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back?;
        self.back = self.tree.predecessor(node);
        self.remaining -= 1;
        Some(self.tree.key(node))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.values.as_slice()).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.values.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.values.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.values.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

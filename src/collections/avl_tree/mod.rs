//! [`AvlTree`], the height-balanced binary search tree behind [`AvlSet`](crate::collections::AvlSet).
//!
//! # Implementation notes
//!
//! Nodes are held in a `Vec` arena owned by the tree and linked by [`NodeId`].
//! Left and right links are the only owning relation (every node except the root
//! is the child of exactly one other node); the parent link is a plain index used
//! to walk back towards the root, both for rebalancing and for in-order
//! successor/predecessor steps.
//!
//! A removed node is released with `swap_remove`: the last arena slot is moved into
//! the hole and the (at most three) links that referred to it are patched. This means
//! a [`NodeId`] is only meaningful until the tree is next mutated.
//!
//! Rebalancing after an insertion and after an erase use different rules for picking
//! a single or a double rotation, see [`AvlTree::insert`] and [`AvlTree::take`].

use std::{
    borrow::Borrow,
    cmp::{max, Ordering},
    fmt::{self, Debug},
    hash::{Hash, Hasher},
    iter::FusedIterator,
    mem,
};

use super::InvariantError;

/// Position of a node inside an [`AvlTree`].
///
/// Ids are only valid for the tree that returned them, and only until that tree is next mutated.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    fn ix(self) -> usize {
        self.0
    }
}

#[derive(Clone)]
struct Node<T> {
    value: T,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
    height: u32,
}

impl<T> Node<T> {
    fn leaf(value: T, parent: Option<NodeId>) -> Self {
        Self {
            value,
            left: None,
            right: None,
            parent,
            height: 1,
        }
    }
}

/// Height-balanced (AVL) binary search tree of unique values.
///
/// This is the engine used by [`AvlSet`](crate::collections::AvlSet). It works in terms of
/// [`NodeId`] positions, which the set wraps into cursors.
///
/// # Example
///
/// ```
/// use avlset::collections::AvlTree;
///
/// let mut tree = AvlTree::new();
/// for x in [5, 3, 8, 1, 4, 7, 9] {
///     tree.insert(x);
/// }
/// let n = tree.lower_bound(&6).unwrap();
/// assert_eq!(tree.value(n), &7);
/// assert_eq!(tree.height(), 3);
/// assert!(tree.validate().is_ok());
/// ```
pub struct AvlTree<T> {
    nodes: Vec<Node<T>>,
    root: Option<NodeId>,
    len: usize,
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for AvlTree<T> {
    /// Deep copy: the clone owns a separate arena with the same values and shape.
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            len: self.len,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.nodes.clone_from(&source.nodes);
        self.root = source.root;
        self.len = source.len;
    }
}

impl<T> AvlTree<T> {
    /// Returns a new, empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            len: 0,
        }
    }

    /// Number of values in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Is the tree empty?
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree, 0 when empty and 1 for a single node.
    pub fn height(&self) -> u32 {
        self.height_of(self.root)
    }

    /// Releases every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// The value held by node `id`.
    ///
    /// # Panics
    ///
    /// May panic if `id` did not come from this tree, or the tree has been mutated since.
    pub fn value(&self, id: NodeId) -> &T {
        &self.node(id).value
    }

    /// Node holding the smallest value, if any.
    pub fn find_min_node(&self) -> Option<NodeId> {
        self.root.map(|r| self.subtree_min(r))
    }

    /// Node holding the largest value, if any.
    pub fn find_max_node(&self) -> Option<NodeId> {
        self.root.map(|r| self.subtree_max(r))
    }

    /// In-order successor of `id`.
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(r) = self.node(id).right {
            return Some(self.subtree_min(r));
        }
        let mut now = id;
        while let Some(p) = self.node(now).parent {
            if self.node(p).right == Some(now) {
                now = p;
            } else {
                return Some(p);
            }
        }
        None
    }

    /// In-order predecessor of `id`.
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(l) = self.node(id).left {
            return Some(self.subtree_max(l));
        }
        let mut now = id;
        while let Some(p) = self.node(now).parent {
            if self.node(p).left == Some(now) {
                now = p;
            } else {
                return Some(p);
            }
        }
        None
    }

    /// Returns an iterator over the values in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            tree: self,
            front: self.find_min_node(),
            back: self.find_max_node(),
            len: self.len,
        }
    }

    /// Removes and returns the smallest value.
    pub fn pop_first(&mut self) -> Option<T> {
        let id = self.find_min_node()?;
        Some(self.remove_node(id))
    }

    /// Removes and returns the largest value.
    pub fn pop_last(&mut self) -> Option<T> {
        let id = self.find_max_node()?;
        Some(self.remove_node(id))
    }

    #[inline]
    fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.ix()]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id.ix()]
    }

    fn subtree_min(&self, mut id: NodeId) -> NodeId {
        while let Some(l) = self.node(id).left {
            id = l;
        }
        id
    }

    fn subtree_max(&self, mut id: NodeId) -> NodeId {
        while let Some(r) = self.node(id).right {
            id = r;
        }
        id
    }

    fn height_of(&self, id: Option<NodeId>) -> u32 {
        id.map_or(0, |i| self.node(i).height)
    }

    fn update_height(&mut self, id: NodeId) {
        let n = self.node(id);
        let h = 1 + max(self.height_of(n.left), self.height_of(n.right));
        self.node_mut(id).height = h;
    }

    fn balance(&self, id: NodeId) -> i64 {
        let n = self.node(id);
        i64::from(self.height_of(n.left)) - i64::from(self.height_of(n.right))
    }

    fn set_left(&mut self, t: NodeId, son: Option<NodeId>) {
        self.node_mut(t).left = son;
        if let Some(s) = son {
            self.node_mut(s).parent = Some(t);
        }
    }

    fn set_right(&mut self, t: NodeId, son: Option<NodeId>) {
        self.node_mut(t).right = son;
        if let Some(s) = son {
            self.node_mut(s).parent = Some(t);
        }
    }

    /// Puts `new` where `old` hangs below `parent` (or at the root).
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                if self.node(p).left == Some(old) {
                    self.node_mut(p).left = new;
                } else {
                    self.node_mut(p).right = new;
                }
            }
        }
        if let Some(n) = new {
            self.node_mut(n).parent = parent;
        }
    }

    /// Single rotation lifting the right child of `t`. Returns the new subtree root.
    fn rotate_left(&mut self, t: NodeId) -> NodeId {
        let Some(pivot) = self.node(t).right else {
            return t;
        };
        let parent = self.node(t).parent;
        let inner = self.node(pivot).left;
        self.set_right(t, inner);
        self.replace_child(parent, t, Some(pivot));
        self.set_left(pivot, Some(t));
        self.update_height(t);
        self.update_height(pivot);
        pivot
    }

    /// Single rotation lifting the left child of `t`. Returns the new subtree root.
    fn rotate_right(&mut self, t: NodeId) -> NodeId {
        let Some(pivot) = self.node(t).left else {
            return t;
        };
        let parent = self.node(t).parent;
        let inner = self.node(pivot).right;
        self.set_left(t, inner);
        self.replace_child(parent, t, Some(pivot));
        self.set_right(pivot, Some(t));
        self.update_height(t);
        self.update_height(pivot);
        pivot
    }

    /// Erase-side rule: a single rotation unless the inner grandchild subtree is strictly taller.
    fn rebalance_by_height(&mut self, t: NodeId) -> NodeId {
        self.update_height(t);
        let bal = self.balance(t);
        if bal > 1 {
            let Some(l) = self.node(t).left else {
                return t;
            };
            let (ll, lr) = (self.node(l).left, self.node(l).right);
            if self.height_of(ll) < self.height_of(lr) {
                self.rotate_left(l);
            }
            return self.rotate_right(t);
        }
        if bal < -1 {
            let Some(r) = self.node(t).right else {
                return t;
            };
            let (rl, rr) = (self.node(r).left, self.node(r).right);
            if self.height_of(rl) > self.height_of(rr) {
                self.rotate_right(r);
            }
            return self.rotate_left(t);
        }
        t
    }

    /// Unlinks `target` and returns its value. The node actually released from the arena
    /// always has at most one child.
    fn remove_node(&mut self, target: NodeId) -> T {
        let n = self.node(target);
        let victim = match (n.left, n.right) {
            (Some(l), Some(_)) => {
                // The largest value on the left takes the target's place.
                let max_l = self.subtree_max(l);
                self.swap_values(target, max_l);
                max_l
            }
            _ => target,
        };
        let n = self.node(victim);
        let (parent, child) = (n.parent, n.left.or(n.right));
        self.replace_child(parent, victim, child);
        let mut up = parent;
        while let Some(t) = up {
            let top = self.rebalance_by_height(t);
            up = self.node(top).parent;
        }
        self.len -= 1;
        self.release(victim)
    }

    fn swap_values(&mut self, a: NodeId, b: NodeId) {
        let (lo, hi) = if a.ix() < b.ix() { (a, b) } else { (b, a) };
        let (head, tail) = self.nodes.split_at_mut(hi.ix());
        mem::swap(&mut head[lo.ix()].value, &mut tail[0].value);
    }

    /// Drops an unlinked node from the arena, moving the last node into its slot.
    fn release(&mut self, id: NodeId) -> T {
        let last = NodeId(self.nodes.len() - 1);
        if id != last {
            let moved = self.node(last);
            let (parent, left, right) = (moved.parent, moved.left, moved.right);
            self.replace_child(parent, last, Some(id));
            if let Some(l) = left {
                self.node_mut(l).parent = Some(id);
            }
            if let Some(r) = right {
                self.node_mut(r).parent = Some(id);
            }
        }
        self.nodes.swap_remove(id.ix()).value
    }
}

impl<T: Ord> AvlTree<T> {
    /// Node holding a value equal to `key`.
    pub fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cur = self.root;
        while let Some(c) = cur {
            let n = self.node(c);
            match key.cmp(n.value.borrow()) {
                Ordering::Less => cur = n.left,
                Ordering::Greater => cur = n.right,
                Ordering::Equal => return Some(c),
            }
        }
        None
    }

    /// Node holding the smallest value not less than `key`.
    pub fn lower_bound<Q>(&self, key: &Q) -> Option<NodeId>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (mut cur, mut best) = (self.root, None);
        while let Some(c) = cur {
            let n = self.node(c);
            if n.value.borrow() < key {
                cur = n.right;
            } else {
                best = Some(c);
                cur = n.left;
            }
        }
        best
    }

    /// Node holding the smallest value greater than `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> Option<NodeId>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (mut cur, mut best) = (self.root, None);
        while let Some(c) = cur {
            let n = self.node(c);
            if n.value.borrow() <= key {
                cur = n.right;
            } else {
                best = Some(c);
                cur = n.left;
            }
        }
        best
    }

    /// Inserts `value`, returning false (and dropping `value`) if an equal value is present.
    ///
    /// After linking the new leaf each ancestor is rebalanced, choosing between a single
    /// and a double rotation by comparing the new value with the heavy child's value.
    pub fn insert(&mut self, value: T) -> bool {
        let (mut cur, mut parent, mut went_left) = (self.root, None, false);
        while let Some(c) = cur {
            let n = self.node(c);
            match value.cmp(&n.value) {
                Ordering::Less => (cur, went_left) = (n.left, true),
                Ordering::Greater => (cur, went_left) = (n.right, false),
                Ordering::Equal => return false,
            }
            parent = Some(c);
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::leaf(value, parent));
        self.len += 1;
        match parent {
            None => self.root = Some(id),
            Some(p) if went_left => self.node_mut(p).left = Some(id),
            Some(p) => self.node_mut(p).right = Some(id),
        }
        let mut up = parent;
        while let Some(t) = up {
            let top = self.rebalance_by_key(t, id);
            up = self.node(top).parent;
        }
        true
    }

    /// Removes the value equal to `key`, returning whether one was present.
    pub fn erase<Q>(&mut self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Removes and returns the value equal to `key`.
    ///
    /// A node with two children takes the largest value of its left subtree, and the node
    /// that held that value is unlinked instead. Each ancestor of the unlinked node is then
    /// rebalanced, choosing between a single and a double rotation by comparing the heights
    /// of the heavy child's subtrees.
    pub fn take<Q>(&mut self, key: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let target = self.find(key)?;
        Some(self.remove_node(target))
    }

    /// Checks every structural invariant, returning the first violation found.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlTree;
    ///
    /// let tree: AvlTree<u32> = (0..100).collect();
    /// assert_eq!(tree.validate(), Ok(()));
    /// ```
    pub fn validate(&self) -> Result<(), InvariantError> {
        let mut reachable = 0;
        if let Some(r) = self.root {
            if self.node(r).parent.is_some() {
                return Err(InvariantError::Parent);
            }
            self.validate_subtree(r, &mut reachable)?;
        }
        if reachable != self.len || self.len != self.nodes.len() {
            return Err(InvariantError::Count {
                len: self.len,
                reachable,
            });
        }
        Ok(())
    }

    fn validate_subtree(&self, id: NodeId, reachable: &mut usize) -> Result<u32, InvariantError> {
        *reachable += 1;
        if *reachable > self.nodes.len() {
            return Err(InvariantError::Count {
                len: self.len,
                reachable: *reachable,
            });
        }
        let n = self.node(id);
        let mut left = 0;
        if let Some(l) = n.left {
            if self.node(l).parent != Some(id) {
                return Err(InvariantError::Parent);
            }
            if self.node(self.subtree_max(l)).value >= n.value {
                return Err(InvariantError::Order);
            }
            left = self.validate_subtree(l, reachable)?;
        }
        let mut right = 0;
        if let Some(r) = n.right {
            if self.node(r).parent != Some(id) {
                return Err(InvariantError::Parent);
            }
            if self.node(self.subtree_min(r)).value <= n.value {
                return Err(InvariantError::Order);
            }
            right = self.validate_subtree(r, reachable)?;
        }
        if left.abs_diff(right) > 1 {
            return Err(InvariantError::Balance { left, right });
        }
        let actual = 1 + max(left, right);
        if n.height != actual {
            return Err(InvariantError::Height {
                stored: n.height,
                actual,
            });
        }
        Ok(actual)
    }

    /// Insert-side rule: `key` is the node just inserted below `t`.
    fn rebalance_by_key(&mut self, t: NodeId, key: NodeId) -> NodeId {
        self.update_height(t);
        let bal = self.balance(t);
        if bal > 1 {
            let Some(l) = self.node(t).left else {
                return t;
            };
            if self.node(key).value > self.node(l).value {
                self.rotate_left(l);
            }
            return self.rotate_right(t);
        }
        if bal < -1 {
            let Some(r) = self.node(t).right else {
                return t;
            };
            if self.node(key).value < self.node(r).value {
                self.rotate_right(r);
            }
            return self.rotate_left(t);
        }
        t
    }
}

impl<T: Debug> Debug for AvlTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for AvlTree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for AvlTree<T> {}

impl<T: PartialOrd> PartialOrd for AvlTree<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for AvlTree<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash> Hash for AvlTree<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for v in self {
            v.hash(state);
        }
    }
}

impl<T: Ord> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = AvlTree::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for AvlTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter {
            self.insert(v);
        }
    }
}

impl<T> IntoIterator for AvlTree<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { tree: self }
    }
}

impl<'a, T> IntoIterator for &'a AvlTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

#[cfg(feature = "serde")]
use serde::{
    de::{SeqAccess, Visitor},
    ser::SerializeSeq,
    Deserialize, Deserializer, Serialize, Serializer,
};

#[cfg(feature = "serde")]
impl<T: Serialize> Serialize for AvlTree<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for v in self {
            seq.serialize_element(v)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct AvlTreeVisitor<T> {
    marker: std::marker::PhantomData<fn() -> AvlTree<T>>,
}

#[cfg(feature = "serde")]
impl<'de, T> Visitor<'de> for AvlTreeVisitor<T>
where
    T: Deserialize<'de> + Ord,
{
    type Value = AvlTree<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<S>(self, mut access: S) -> Result<Self::Value, S::Error>
    where
        S: SeqAccess<'de>,
    {
        let mut tree = AvlTree::new();
        while let Some(v) = access.next_element()? {
            tree.insert(v);
        }
        Ok(tree)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> Deserialize<'de> for AvlTree<T>
where
    T: Deserialize<'de> + Ord,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(AvlTreeVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

/// Borrowing iterator over the values of an [`AvlTree`] in ascending order.
///
/// Returned by [`AvlTree::iter`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    tree: &'a AvlTree<T>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    len: usize,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            len: self.len,
        }
    }
}

impl<T: Debug> Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        let id = self.front?;
        self.len -= 1;
        self.front = self.tree.successor(id);
        Some(self.tree.value(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        let id = self.back?;
        self.len -= 1;
        self.back = self.tree.predecessor(id);
        Some(self.tree.value(id))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

/// Owning iterator over the values of an [`AvlTree`] in ascending order.
pub struct IntoIter<T> {
    tree: AvlTree<T>,
}

impl<T: Debug> Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.tree).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.tree.pop_first()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.tree.pop_last()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.tree.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

// Tests.

#[cfg(all(test, not(miri), feature = "cap"))]
#[global_allocator]
static ALLOCATOR: cap::Cap<std::alloc::System> = cap::Cap::new(std::alloc::System, usize::MAX);

#[cfg(test)]
pub(crate) fn print_memory() {
    #[cfg(all(test, not(miri), feature = "cap"))]
    println!("Memory allocated: {} bytes", ALLOCATOR.allocated());
}

/* mimalloc cannot be used with miri */
#[cfg(all(test, not(miri), not(feature = "cap")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

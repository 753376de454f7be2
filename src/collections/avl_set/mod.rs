//! [`AvlSet`] similar to [`std::collections::BTreeSet`], with bidirectional cursors that can step back from the end.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;

use super::avl_tree::{AvlTree, NodeId};
use super::InvariantError;

pub use super::avl_tree::{IntoIter, Iter};

/// An ordered set of unique values based on an AVL tree.
///
/// # Guide to methods
///
/// Set Creation: [`new`], [`from`], [`from_iter`], [`clone`], [`clone_from`]
///
/// Properties: [`len`] (alias [`size`]), [`is_empty`] (alias [`empty`]), [`contains`], [`validate`]
///
/// Insertion: [`insert`]
///
/// Retrieve: [`get`], [`first`], [`last`]
///
/// Removal: [`erase`] (alias [`remove`]), [`take`], [`pop_first`], [`pop_last`], [`clear`]
///
/// Iterators: [`iter`]
///
/// Cursors: [`begin`], [`end`], [`find`], [`lower_bound`], [`upper_bound`]
///
/// [`new`]: AvlSet::new
/// [`from`]: AvlSet::from
/// [`from_iter`]: AvlSet::from_iter
/// [`clone`]: AvlSet::clone
/// [`clone_from`]: AvlSet::clone_from
/// [`len`]: AvlSet::len
/// [`size`]: AvlSet::size
/// [`is_empty`]: AvlSet::is_empty
/// [`empty`]: AvlSet::empty
/// [`contains`]: AvlSet::contains
/// [`validate`]: AvlSet::validate
/// [`insert`]: AvlSet::insert
/// [`get`]: AvlSet::get
/// [`first`]: AvlSet::first
/// [`last`]: AvlSet::last
/// [`erase`]: AvlSet::erase
/// [`remove`]: AvlSet::remove
/// [`take`]: AvlSet::take
/// [`pop_first`]: AvlSet::pop_first
/// [`pop_last`]: AvlSet::pop_last
/// [`clear`]: AvlSet::clear
/// [`iter`]: AvlSet::iter
/// [`begin`]: AvlSet::begin
/// [`end`]: AvlSet::end
/// [`find`]: AvlSet::find
/// [`lower_bound`]: AvlSet::lower_bound
/// [`upper_bound`]: AvlSet::upper_bound
///
/// # Examples
///
/// ```
/// use avlset::collections::AvlSet;
///
/// let mut set = AvlSet::new();
/// for x in [5, 3, 8, 1, 4, 7, 9] {
///     set.insert(x);
/// }
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 3, 4, 5, 7, 8, 9]);
/// assert_eq!(set.lower_bound(&6).get(), Some(&7));
///
/// set.erase(&8);
/// assert_eq!(set.size(), 6);
/// assert!(set.find(&8) == set.end());
/// ```
///
/// An `AvlSet` with a known list of items can be initialized from an array:
///
/// ```
/// use avlset::collections::AvlSet;
///
/// let set = AvlSet::from([1, 2, 3]);
/// ```
pub struct AvlSet<T> {
    tree: AvlTree<T>,
}

impl<T> AvlSet<T> {
    /// Returns a new, empty `AvlSet`.
    ///
    /// # Example
    ///
    /// ```
    /// # #![allow(unused_mut)]
    /// use avlset::collections::AvlSet;
    ///
    /// let mut set: AvlSet<i32> = AvlSet::new();
    /// ```
    #[must_use]
    pub const fn new() -> AvlSet<T> {
        AvlSet {
            tree: AvlTree::new(),
        }
    }

    /// Returns number of elements in the set
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let mut v = AvlSet::new();
    /// assert_eq!(v.len(), 0);
    /// v.insert(1);
    /// assert_eq!(v.len(), 1);
    /// ```
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Same as [`len`](AvlSet::len).
    pub const fn size(&self) -> usize {
        self.tree.len()
    }

    /// Does the set have any elements
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let mut v = AvlSet::new();
    /// assert!(v.is_empty());
    /// v.insert(1);
    /// assert!(!v.is_empty());
    /// ```
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Same as [`is_empty`](AvlSet::is_empty).
    pub const fn empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Clears the set, removing all elements.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let mut v = AvlSet::new();
    /// v.insert(1);
    /// v.clear();
    /// assert!(v.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns a reference to the first element in the set, if any.
    /// This element is always the minimum of all elements in the set.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// assert_eq!(set.first(), None);
    /// set.insert(1);
    /// assert_eq!(set.first(), Some(&1));
    /// set.insert(2);
    /// assert_eq!(set.first(), Some(&1));
    /// ```
    pub fn first(&self) -> Option<&T> {
        self.tree.find_min_node().map(|id| self.tree.value(id))
    }

    /// Returns a reference to the last element in the set, if any.
    /// This element is always the maximum of all elements in the set.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// assert_eq!(set.last(), None);
    /// set.insert(1);
    /// assert_eq!(set.last(), Some(&1));
    /// set.insert(2);
    /// assert_eq!(set.last(), Some(&2));
    /// ```
    pub fn last(&self) -> Option<&T> {
        self.tree.find_max_node().map(|id| self.tree.value(id))
    }

    /// Removes the first element from the set and returns it, if any.
    /// The first element is always the minimum element in the set.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let mut set = AvlSet::from([2, 1]);
    /// assert_eq!(set.pop_first(), Some(1));
    /// assert_eq!(set.pop_first(), Some(2));
    /// assert_eq!(set.pop_first(), None);
    /// ```
    pub fn pop_first(&mut self) -> Option<T> {
        self.tree.pop_first()
    }

    /// Removes the last element from the set and returns it, if any.
    /// The last element is always the maximum element in the set.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let mut set = AvlSet::from([2, 1]);
    /// assert_eq!(set.pop_last(), Some(2));
    /// assert_eq!(set.pop_last(), Some(1));
    /// assert_eq!(set.pop_last(), None);
    /// ```
    pub fn pop_last(&mut self) -> Option<T> {
        self.tree.pop_last()
    }

    /// Gets an iterator that visits the elements in the `AvlSet` in ascending
    /// order.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let set = AvlSet::from([3, 1, 2]);
    /// let mut set_iter = set.iter();
    /// assert_eq!(set_iter.next(), Some(&1));
    /// assert_eq!(set_iter.next_back(), Some(&3));
    /// assert_eq!(set_iter.next(), Some(&2));
    /// assert_eq!(set_iter.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        self.tree.iter()
    }

    /// Returns a cursor at the smallest element, or [`end`](AvlSet::end) if the set is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let set = AvlSet::from([10, 20]);
    /// let mut c = set.begin();
    /// assert_eq!(c.get(), Some(&10));
    /// c.move_next();
    /// assert_eq!(c.get(), Some(&20));
    /// c.move_next();
    /// assert!(c == set.end());
    ///
    /// let empty: AvlSet<i32> = AvlSet::new();
    /// assert!(empty.begin() == empty.end());
    /// ```
    pub fn begin(&self) -> Cursor<'_, T> {
        match self.tree.find_min_node() {
            Some(id) => Cursor::at(&self.tree, id),
            None => self.end(),
        }
    }

    /// Returns the one-past-the-last cursor.
    ///
    /// The cursor is anchored at the largest element, so [`Cursor::move_prev`] steps to it.
    /// On an empty set there is nothing to step to and `move_prev` leaves it at the end.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let set = AvlSet::from([1, 2, 3]);
    /// let mut c = set.end();
    /// assert_eq!(c.get(), None);
    /// c.move_prev();
    /// assert_eq!(c.get(), Some(&3));
    /// ```
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor {
            tree: &self.tree,
            node: self.tree.find_max_node(),
            in_range: false,
        }
    }
}

impl<T: Ord> AvlSet<T> {
    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. If an equal value is already
    /// present the set is left unchanged and `value` is dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// assert_eq!(set.insert(2), true);
    /// assert_eq!(set.insert(2), false);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        self.tree.insert(value)
    }

    /// Removes a value from the set. Returns whether the value was present.
    ///
    /// The value may be any borrowed form of the set's element type,
    /// but the ordering on the borrowed form *must* match the
    /// ordering on the element type.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    ///
    /// set.insert(2);
    /// assert_eq!(set.erase(&2), true);
    /// assert_eq!(set.erase(&2), false);
    /// ```
    pub fn erase<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.erase(value)
    }

    /// Same as [`erase`](AvlSet::erase).
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.erase(value)
    }

    /// Remove and return element from set
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let mut set = AvlSet::from([1, 2, 3]);
    /// assert_eq!(set.take(&2), Some(2));
    /// assert_eq!(set.take(&2), None);
    /// ```
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.take(value)
    }

    /// Returns `true` if the set contains an element equal to the value.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let set = AvlSet::from([1, 2, 3]);
    /// assert_eq!(set.contains(&1), true);
    /// assert_eq!(set.contains(&4), false);
    /// ```
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.find(value).is_some()
    }

    /// Returns a reference to the element in the set, if any, that is equal to
    /// the value.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let set = AvlSet::from([1, 2, 3]);
    /// assert_eq!(set.get(&2), Some(&2));
    /// assert_eq!(set.get(&4), None);
    /// ```
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.find(value).map(|id| self.tree.value(id))
    }

    /// Returns a cursor at the element equal to the value, or [`end`](AvlSet::end) if there is none.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let set = AvlSet::from(["a", "b", "c"]);
    /// let mut c = set.find("b");
    /// c.move_next();
    /// assert_eq!(c.get(), Some(&"c"));
    /// assert!(set.find("z").is_end());
    /// ```
    pub fn find<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.cursor_or_end(self.tree.find(value))
    }

    /// Returns a cursor at the smallest element not less than the value, or
    /// [`end`](AvlSet::end) if every element is less.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let set = AvlSet::from([1, 3, 5]);
    /// assert_eq!(set.lower_bound(&3).get(), Some(&3));
    /// assert_eq!(set.lower_bound(&4).get(), Some(&5));
    /// assert!(set.lower_bound(&6) == set.end());
    /// ```
    pub fn lower_bound<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.cursor_or_end(self.tree.lower_bound(value))
    }

    /// Returns a cursor at the smallest element greater than the value, or
    /// [`end`](AvlSet::end) if there is none.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let set = AvlSet::from([1, 3, 5]);
    /// assert_eq!(set.upper_bound(&3).get(), Some(&5));
    /// assert!(set.upper_bound(&5).is_end());
    /// ```
    pub fn upper_bound<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.cursor_or_end(self.tree.upper_bound(value))
    }

    /// Checks the tree invariants (ordering, balance, heights, parent links, length).
    ///
    /// This never fails for a set built through the public API.
    pub fn validate(&self) -> Result<(), InvariantError> {
        self.tree.validate()
    }

    fn cursor_or_end(&self, id: Option<NodeId>) -> Cursor<'_, T> {
        match id {
            Some(id) => Cursor::at(&self.tree, id),
            None => self.end(),
        }
    }
}

// start impl for AvlSet

impl<T: Ord, const N: usize> From<[T; N]> for AvlSet<T> {
    /// Converts a `[T; N]` into an `AvlSet<T>`.
    ///
    /// If the array contains any equal values,
    /// all but one will be dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let set1 = AvlSet::from([1, 2, 3, 4]);
    /// let set2: AvlSet<_> = [1, 2, 3, 4].into();
    /// assert_eq!(set1, set2);
    /// ```
    fn from(arr: [T; N]) -> Self {
        let mut result = AvlSet::new();
        for e in arr {
            result.insert(e);
        }
        result
    }
}

impl<T> Default for AvlSet<T> {
    /// Creates an empty `AvlSet`.
    fn default() -> AvlSet<T> {
        AvlSet::new()
    }
}

impl<T: Hash> Hash for AvlSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tree.hash(state)
    }
}

impl<T: PartialEq> PartialEq for AvlSet<T> {
    fn eq(&self, other: &AvlSet<T>) -> bool {
        self.tree.eq(&other.tree)
    }
}

impl<T: Eq> Eq for AvlSet<T> {}

impl<T: PartialOrd> PartialOrd for AvlSet<T> {
    fn partial_cmp(&self, other: &AvlSet<T>) -> Option<Ordering> {
        self.tree.partial_cmp(&other.tree)
    }
}

impl<T: Ord> Ord for AvlSet<T> {
    fn cmp(&self, other: &AvlSet<T>) -> Ordering {
        self.tree.cmp(&other.tree)
    }
}

impl<T: Clone> Clone for AvlSet<T> {
    /// Copies every node; the two sets share nothing afterwards.
    fn clone(&self) -> Self {
        AvlSet {
            tree: self.tree.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.tree.clone_from(&source.tree);
    }
}

impl<T: Debug> Debug for AvlSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Ord> FromIterator<T> for AvlSet<T> {
    fn from_iter<X: IntoIterator<Item = T>>(iter: X) -> AvlSet<T> {
        AvlSet {
            tree: AvlTree::from_iter(iter),
        }
    }
}

impl<T> IntoIterator for AvlSet<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an iterator for moving out the `AvlSet`'s contents in ascending order.
    ///
    /// # Example
    ///
    /// ```
    /// use avlset::collections::AvlSet;
    ///
    /// let set = AvlSet::from([1, 2, 3, 4]);
    ///
    /// let v: Vec<_> = set.into_iter().collect();
    /// assert_eq!(v, [1, 2, 3, 4]);
    /// ```
    fn into_iter(self) -> IntoIter<T> {
        self.tree.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a AvlSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T: Ord> Extend<T> for AvlSet<T> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.tree.extend(iter);
    }
}

impl<'a, T: 'a + Ord + Copy> Extend<&'a T> for AvlSet<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.tree.extend(iter.into_iter().copied());
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for AvlSet<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.tree, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for AvlSet<T>
where
    T: serde::Deserialize<'de> + Ord,
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <AvlTree<T> as serde::Deserialize>::deserialize(deserializer).map(|tree| AvlSet { tree })
    }
}

// end impl for AvlSet

/// A bidirectional cursor over an `AvlSet`.
///
/// A cursor is either positioned at an element of the set, or out of range. The out of
/// range position reached by stepping forward past the largest element (and the one
/// returned by [`AvlSet::end`]) remembers that element, so [`move_prev`] steps back onto it.
/// Stepping backward past the smallest element also leaves the cursor out of range.
///
/// Two cursors compare equal when both are out of range, or when both are at elements
/// that compare equal. Cursors borrow the set, so it cannot be modified while one is held.
///
/// A `Cursor` is created with [`AvlSet::begin`], [`AvlSet::end`], [`AvlSet::find`],
/// [`AvlSet::lower_bound`] and [`AvlSet::upper_bound`]. As an [`Iterator`] it yields the
/// current element and then moves forward.
///
/// [`move_prev`]: Cursor::move_prev
pub struct Cursor<'a, T> {
    tree: &'a AvlTree<T>,
    node: Option<NodeId>,
    in_range: bool,
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T: Debug> Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(v) => f.debug_tuple("Cursor").field(v).finish(),
            None => f.write_str("Cursor(end)"),
        }
    }
}

impl<'a, T> Cursor<'a, T> {
    fn at(tree: &'a AvlTree<T>, id: NodeId) -> Self {
        Self {
            tree,
            node: Some(id),
            in_range: true,
        }
    }

    /// Returns the element at the cursor, or `None` when the cursor is out of range.
    #[must_use]
    pub fn get(&self) -> Option<&'a T> {
        if self.in_range {
            self.node.map(|id| self.tree.value(id))
        } else {
            None
        }
    }

    /// Is the cursor out of range?
    pub fn is_end(&self) -> bool {
        !self.in_range
    }

    /// Moves to the next element, going out of range after the largest one.
    ///
    /// Does nothing if the cursor is already out of range.
    pub fn move_next(&mut self) {
        if !self.in_range {
            return;
        }
        let Some(id) = self.node else {
            return;
        };
        match self.tree.successor(id) {
            Some(next) => self.node = Some(next),
            None => self.in_range = false,
        }
    }

    /// Moves to the previous element, going out of range before the smallest one.
    ///
    /// An out of range cursor moves back onto the element it is anchored at, normally the
    /// largest. The end cursor of an empty set stays where it is.
    pub fn move_prev(&mut self) {
        let Some(id) = self.node else {
            return;
        };
        if !self.in_range {
            self.in_range = true;
            return;
        }
        match self.tree.predecessor(id) {
            Some(prev) => self.node = Some(prev),
            None => self.in_range = false,
        }
    }
}

impl<T: Ord> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        match (self.get(), other.get()) {
            (None, None) => true,
            (Some(a), Some(b)) => a.cmp(b) == Ordering::Equal,
            _ => false,
        }
    }
}

impl<'a, T> Iterator for Cursor<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let v = self.get()?;
        self.move_next();
        Some(v)
    }
}

impl<T> FusedIterator for Cursor<'_, T> {}

#[cfg(test)]
mod mytests;

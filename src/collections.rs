pub mod avl_tree;

pub use avl_tree::AvlTree;

pub mod avl_set;

pub use avl_set::AvlSet;

use std::fmt;

/// The error type for [`AvlTree::validate`] and [`AvlSet::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    /// A value is not strictly between the values of its left and right subtrees.
    Order,

    /// The subtrees of a node differ in height by more than one.
    Balance {
        /// Height of the left subtree.
        left: u32,
        /// Height of the right subtree.
        right: u32,
    },

    /// A node's recorded height does not match its subtrees.
    Height {
        /// Height recorded in the node.
        stored: u32,
        /// Height computed from the children.
        actual: u32,
    },

    /// A parent link does not point back to the node holding the child link.
    Parent,

    /// The element count disagrees with the nodes reachable from the root.
    Count {
        /// Recorded element count.
        len: usize,
        /// Nodes reached before the check stopped.
        reachable: usize,
    },
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Order => write!(f, "values are not in order"),
            Self::Balance { left, right } => {
                write!(f, "subtree heights {left} and {right} are unbalanced")
            }
            Self::Height { stored, actual } => {
                write!(f, "stored height {stored} should be {actual}")
            }
            Self::Parent => write!(f, "parent link does not match child link"),
            Self::Count { len, reachable } => {
                write!(f, "length is {len} but {reachable} nodes are reachable")
            }
        }
    }
}

impl std::error::Error for InvariantError {}

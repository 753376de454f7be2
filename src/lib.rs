#![deny(missing_docs)]

//! Ordered set of unique values backed by a height-balanced (AVL) binary search tree, see [`collections::AvlSet`].
//!
//! Insertion, removal, membership, lower-bound search and each cursor step run in logarithmic time.
//! [`collections::AvlSet`] offers bidirectional cursors with a one-past-the-end position that can be
//! stepped back into the set, as well as ordinary Rust iterators.

//!# Features
//!
//! This crate supports the following cargo features:
//! - `serde` : enables serialisation of [`collections::AvlSet`] and [`collections::AvlTree`] via serde crate.
//! - `cap` : tests report allocated memory using the cap crate ( instead of running under mimalloc ).

/// Containers.
pub mod collections;

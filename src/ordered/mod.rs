//! # Ordered Module
//!
//! Insertion of a single value into an already-sorted sequence, keeping the
//! result sorted.
//!
//! ## Overview
//!
//! The module provides:
//! - [`insert`] - Copy-out insertion: returns a new sorted `Vec`, input untouched
//! - [`insert_in_place`] - Grow-and-shift insertion into an existing `Vec`
//! - [`insert_by`] / [`insertion_index_by`] - Variants taking an explicit comparator
//! - [`insert_checked`] - Validates the sortedness precondition first
//! - [`insertion_sort`] - Builds a sorted `Vec` by repeated ordered insertion
//!
//! ## Tie-break
//!
//! All variants place the new value immediately before the first element that is
//! not strictly less than it. Among equal elements the new value therefore lands
//! in the leftmost position:
//!
//! ```rust
//! use patternkit::ordered::{insert, insertion_index};
//!
//! let seq = [1, 3, 3, 5];
//! assert_eq!(insertion_index(&seq, &3), 1);
//! assert_eq!(insert(&seq, 3), vec![1, 3, 3, 3, 5]);
//! ```
//!
//! ## Complexity
//!
//! The scan is linear, as is the shift: O(n) time. [`insert`] allocates a new
//! buffer of `len + 1`; [`insert_in_place`] reuses the vector's amortized growth.
//!
//! ## Preconditions
//!
//! The input must be sorted non-decreasing. Unsorted input never panics, but the
//! result is then unspecified. Use [`insert_checked`] when the input comes from an
//! untrusted source.

mod core;
mod error;

pub use core::{
    insert, insert_by, insert_checked, insert_in_place, insertion_index, insertion_index_by,
    insertion_sort, is_sorted,
};
pub use error::OrderedError;

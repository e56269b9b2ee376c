//! Tree comparison and diffing.
//!
//! [`compare`] classifies a single node pair; [`get_diff`] walks two whole
//! trees and reports every divergence; [`check_sync`] is the boolean,
//! short-circuiting form.

pub mod compare;
pub mod engine;

pub use compare::{compare, key_compare, Comparison};
pub use engine::{check_sync, check_sync_many, get_diff, DiffEntry, TreeDiff, TreePath};

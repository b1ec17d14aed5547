//! Hierarchical ACL permission sets.
//!
//! This crate models authorization state as a tree of growable bit
//! vectors: a [`PermissionSet`] grants one capability per set bit, and any
//! bit position may own a nested set that refines that capability.
//!
//! ```text
//! PermissionSet (root: one subject's grants)
//!   bits:     0..1.1..              each set bit = one capability
//!   children: 5 → PermissionSet     refinement of capability 5
//!                   bits: ..1..     sub-actions on that resource
//!                   children: ...   nesting continues to any depth
//! ```
//!
//! It is a library, not a service: there is no network surface, no
//! persistence, and no enforcement point. Callers embed the structure
//! inside their own authorization decision point and own the mapping from
//! permission names to bit indices.
//!
//! # Module Map
//!
//! | Module | Provides |
//! |--------|----------|
//! | [`PermissionSet`] | The recursive structure and its algebra |
//! | [`BitVec`] | The flat word-packed bit vector underneath |
//! | binary codec | Compact recursive frame format ([`PermissionSet::to_bytes`]) |
//! | structured codec | JSON envelope ([`PermissionSet::to_json`]) |
//! | [`CodecError`] | The only failure surface (codecs; queries never fail) |
//!
//! # Example
//!
//! ```
//! use permtree::PermissionSet;
//!
//! // Bit 5 grants "manage resource"; its child refines the sub-actions.
//! let mut perms = PermissionSet::with_id(42);
//! perms.set(&[3, 5]);
//! perms.child(5).set(&[2]);
//!
//! // Hierarchical check: bit 5, then bit 2 of its refinement.
//! assert!(perms.walk(&[5, 2]));
//! assert!(!perms.walk(&[5, 9]));
//!
//! // Bit 3 is unrefined: a full grant at every depth below it.
//! assert!(perms.walk(&[3, 7]));
//!
//! // Round-trip through the compact binary codec.
//! let bytes = perms.to_bytes().expect("encode");
//! let restored = PermissionSet::from_bytes(&bytes).expect("decode");
//! assert_eq!(restored, perms);
//! ```
//!
//! # Concurrency
//!
//! Single-threaded by contract. Mutating operations take `&mut self`, so
//! exclusive access is compiler-enforced; callers needing shared access
//! wrap the root in their own lock. One lock guards the whole tree:
//! per-node locking would not compose with the recursive union and
//! intersection.

mod binary;
mod bits;
mod error;
mod json;
mod set;

pub use bits::{BitVec, Ones};
pub use error::CodecError;
pub use set::PermissionSet;

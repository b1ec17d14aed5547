//! Hierarchical permission sets.
//!
//! A [`PermissionSet`] is a growable bit vector where each set bit grants
//! one capability, plus an optional refinement set per bit position:
//!
//! ```text
//! PermissionSet { id: 7 }
//!   bits: ...101000            bit 3 = "read reports", bit 5 = "manage resource"
//!   children:
//!     5 → PermissionSet        fine-grained sub-actions on that resource
//!           bits: ...100       bit 2 = "rotate credentials"
//! ```
//!
//! The mapping from application-level permission names to bit indices is
//! entirely the caller's responsibility; this crate only carries the
//! algebra.
//!
//! # Grant semantics
//!
//! A set bit with **no** child at its slot is an *unrefined* grant: under
//! [`walk`](PermissionSet::walk) it authorizes everything below that level.
//! Attaching a child narrows the grant to whatever the child's bits allow.
//! An existing child with no bits set and an absent child are different
//! facts structurally, but behave identically under every query.
//!
//! # Concurrency
//!
//! Single-threaded by contract (mutating operations take `&mut self`, so
//! exclusive access is compiler-enforced). Callers that need shared access
//! wrap the root in their own lock; per-node locking would not compose with
//! the recursive combination operations.

use std::collections::{BTreeMap, HashMap};

use crate::bits::BitVec;

/// A recursive bundle of granted capabilities.
///
/// Created empty (or by one of the codecs), mutated in place, queried any
/// number of times. Dropping the root drops the whole tree; children are
/// exclusively owned, so no cycles can exist by construction.
///
/// # Example
///
/// ```
/// use permtree::PermissionSet;
///
/// let mut perms = PermissionSet::with_id(42);
/// perms.set(&[3, 5]);
/// perms.child(5).set(&[2]);
///
/// assert!(perms.has(3));
/// assert!(perms.walk(&[5, 2])); // bit 5, then bit 2 of its refinement
/// assert!(!perms.walk(&[5, 9]));
/// assert!(!perms.walk(&[4]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    /// Opaque caller-assigned identifier (e.g. a subject or resource id).
    ///
    /// Not used by the algebra; carried for identification and round-tripped
    /// by both codecs.
    pub id: u64,
    pub(crate) bits: BitVec,
    pub(crate) children: BTreeMap<usize, PermissionSet>,
}

impl PermissionSet {
    /// Creates an empty set with id 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set with the given identifier.
    #[must_use]
    pub fn with_id(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Returns `true` iff the bit at `index` is set.
    ///
    /// Indices beyond the current length read as `false`; this never grows
    /// the vector.
    #[must_use]
    pub fn has(&self, index: usize) -> bool {
        self.bits.test(index)
    }

    /// Sets each given bit, growing the vector as needed.
    ///
    /// Returns `&mut Self` for chaining:
    ///
    /// ```
    /// use permtree::PermissionSet;
    ///
    /// let mut perms = PermissionSet::new();
    /// perms.set(&[1, 2]).clear(&[2]).set(&[8]);
    /// assert!(perms.has(1));
    /// assert!(!perms.has(2));
    /// assert!(perms.has(8));
    /// ```
    pub fn set(&mut self, indices: &[usize]) -> &mut Self {
        for &i in indices {
            self.bits.set(i);
        }
        self
    }

    /// Clears each given bit. Never shrinks the vector.
    ///
    /// Children are untouched: clearing a parent bit leaves any existing
    /// child subtree intact but unreachable via [`walk`](Self::walk) and
    /// [`has_multiple`](Self::has_multiple).
    pub fn clear(&mut self, indices: &[usize]) -> &mut Self {
        for &i in indices {
            self.bits.clear(i);
        }
        self
    }

    /// Returns `true` iff every given bit is set (empty input ⇒ `true`).
    #[must_use]
    pub fn all(&self, indices: &[usize]) -> bool {
        let mut mask = BitVec::new();
        for &i in indices {
            mask.set(i);
        }
        self.bits.is_superset(&mask)
    }

    /// Returns `true` iff at least one given bit is set (empty input ⇒
    /// `false`).
    #[must_use]
    pub fn any(&self, indices: &[usize]) -> bool {
        let mut mask = BitVec::new();
        for &i in indices {
            mask.set(i);
        }
        self.bits.intersects(&mask)
    }

    /// Current bit-vector length (high-water mark, not the count of set
    /// bits).
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns `true` iff no bit is set, regardless of vector length or
    /// whether children exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.none()
    }

    /// Returns the child set at `index`, creating an empty one on first
    /// access.
    ///
    /// This is the crate's only create-on-read accessor; queries like
    /// [`walk`](Self::walk) use plain lookups and never materialize
    /// children. "Child exists" and "child has any bits set" are different
    /// facts:
    ///
    /// ```
    /// use permtree::PermissionSet;
    ///
    /// let mut perms = PermissionSet::new();
    /// let child = perms.child(5); // index 5 now owns an empty refinement
    /// assert!(child.is_empty());
    /// assert!(perms.get_child(5).is_some());
    /// ```
    pub fn child(&mut self, index: usize) -> &mut PermissionSet {
        self.children.entry(index).or_default()
    }

    /// Returns the child at `index` without creating one.
    #[must_use]
    pub fn get_child(&self, index: usize) -> Option<&PermissionSet> {
        self.children.get(&index)
    }

    /// Evaluates a path of bit positions across nested levels.
    ///
    /// Element 0 is tested against this set, element 1 against the child
    /// reached via element 0's slot, and so on. At each step:
    ///
    /// - unset bit ⇒ `false` (the walk fails);
    /// - set bit with no child at that slot ⇒ `true` (an unrefined grant is
    ///   a full grant at that level);
    /// - set bit with a child ⇒ descend and continue.
    ///
    /// An empty path always succeeds, as does a path exhausted with every
    /// bit tested set.
    ///
    /// # Example
    ///
    /// ```
    /// use permtree::PermissionSet;
    ///
    /// let mut perms = PermissionSet::new();
    /// perms.set(&[3, 5]);
    /// perms.child(5).set(&[2]);
    ///
    /// assert!(perms.walk(&[]));
    /// assert!(perms.walk(&[3]));        // unrefined grant
    /// assert!(perms.walk(&[3, 7, 9])); // ...authorizes everything below
    /// assert!(perms.walk(&[5, 2]));
    /// assert!(!perms.walk(&[5, 9]));
    /// ```
    #[must_use]
    pub fn walk(&self, path: &[usize]) -> bool {
        let mut set = self;
        for &index in path {
            if !set.bits.test(index) {
                return false;
            }
            match set.children.get(&index) {
                Some(next) => set = next,
                None => return true,
            }
        }
        true
    }

    /// Batch query over top-level bits and one child level each.
    ///
    /// For each requested index `k` paired with child indices `v`, the
    /// result holds `1 + v.len()` booleans: position 0 is whether bit `k`
    /// is set here; when it is and the child at `k` has any bit set,
    /// positions `1..=v.len()` are the child's answer for each element of
    /// `v` (otherwise they stay `false`). When multiple batches name the
    /// same key, later batches overwrite earlier results.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use permtree::PermissionSet;
    ///
    /// let mut perms = PermissionSet::new();
    /// perms.set(&[5]);
    /// perms.child(5).set(&[1]);
    ///
    /// let batch = HashMap::from([(5, vec![1, 2])]);
    /// let results = perms.has_multiple(&[batch]);
    /// assert_eq!(results[&5], vec![true, true, false]);
    /// ```
    #[must_use]
    pub fn has_multiple(
        &self,
        batches: &[HashMap<usize, Vec<usize>>],
    ) -> HashMap<usize, Vec<bool>> {
        let mut results = HashMap::new();
        for batch in batches {
            for (&key, child_indices) in batch {
                let mut values = vec![false; 1 + child_indices.len()];
                if self.has(key) {
                    values[0] = true;
                    if let Some(child) = self.children.get(&key) {
                        if !child.is_empty() {
                            for (i, &index) in child_indices.iter().enumerate() {
                                values[1 + i] = child.has(index);
                            }
                        }
                    }
                }
                results.insert(key, values);
            }
        }
        results
    }

    /// Set-algebra OR of `other` into `self`, over both bit positions and
    /// their subtrees.
    ///
    /// For every bit set in `other` the same bit is set here, and where
    /// `other` refines that bit its child is recursively unioned into this
    /// set's child (created when absent). The raw vectors are then combined
    /// with a bitwise OR so the binary representation matches the logical
    /// result.
    pub fn union_with(&mut self, other: &PermissionSet) -> &mut Self {
        for index in other.bits.ones() {
            self.bits.set(index);
            if let Some(other_child) = other.children.get(&index) {
                self.child(index).union_with(other_child);
            }
        }
        self.bits.union_with(&other.bits);
        self
    }

    /// In-place set-algebra AND of `other` into `self`.
    ///
    /// A bit survives only if it was set in both operands; the bitwise AND
    /// of the raw vectors is authoritative for that. The per-bit pre-pass
    /// exists solely to recurse into matching children (for every bit set
    /// in both operands where `other` carries a refinement, this set's
    /// child at that index is recursively intersected) and never mutates
    /// this set's own bits. Subtrees hanging off bits that do not survive
    /// are left in place (and stay unreachable via [`walk`](Self::walk)),
    /// like subtrees behind a [`clear`](Self::clear)ed bit.
    pub fn intersect_with(&mut self, other: &PermissionSet) -> &mut Self {
        for index in other.bits.ones() {
            if self.bits.test(index) {
                if let Some(other_child) = other.children.get(&index) {
                    self.child(index).intersect_with(other_child);
                }
            }
        }
        self.bits.intersect_with(&other.bits);
        self
    }

    /// Raw backing words of the set reached by descending through children
    /// at each given index in order.
    ///
    /// Each step goes through [`child`](Self::child), so missing
    /// intermediate levels are silently created. Low-level escape hatch for
    /// bulk copy/compare, not a semantic query.
    pub fn words(&mut self, path: &[usize]) -> &[u64] {
        let mut set = self;
        for &index in path {
            set = set.child(index);
        }
        set.bits.as_words()
    }

    /// Debug rendering of the bit vector; see [`BitVec::bit_string`].
    #[must_use]
    pub fn bit_string(&self) -> String {
        self.bits.bit_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_has() {
        let mut perms = PermissionSet::new();
        perms.set(&[1, 3, 200]);

        for i in [1, 3, 200] {
            assert!(perms.has(i), "bit {i} should be set");
        }
        for i in [0, 2, 4, 199, 201] {
            assert!(!perms.has(i), "bit {i} should not be set");
        }
    }

    #[test]
    fn clear_is_left_inverse_of_set() {
        let mut perms = PermissionSet::new();
        perms.set(&[7]).clear(&[7]);
        assert!(!perms.has(7));
        assert_eq!(perms.len(), 8); // length is a high-water mark
    }

    #[test]
    fn clear_leaves_children_intact() {
        let mut perms = PermissionSet::new();
        perms.set(&[5]);
        perms.child(5).set(&[2]);
        perms.clear(&[5]);

        assert!(perms.get_child(5).is_some());
        assert!(perms.get_child(5).is_some_and(|c| c.has(2)));
        // ...but the subtree is unreachable via walk.
        assert!(!perms.walk(&[5, 2]));
    }

    #[test]
    fn all_and_any() {
        let mut perms = PermissionSet::new();
        perms.set(&[1, 2, 3]);

        assert!(perms.all(&[1, 2]));
        assert!(perms.all(&[1, 2, 3]));
        assert!(!perms.all(&[1, 4]));
        assert!(perms.all(&[])); // vacuously true

        assert!(perms.any(&[4, 2]));
        assert!(!perms.any(&[4, 5]));
        assert!(!perms.any(&[])); // vacuously false
    }

    #[test]
    fn is_empty_ignores_length_and_children() {
        let mut perms = PermissionSet::new();
        assert!(perms.is_empty());

        perms.set(&[9]).clear(&[9]);
        assert!(perms.is_empty()); // length 10, no bits

        perms.child(3).set(&[1]);
        assert!(perms.is_empty()); // children don't count
    }

    #[test]
    fn child_materializes_on_first_access() {
        let mut perms = PermissionSet::new();
        assert!(perms.get_child(4).is_none());

        perms.child(4);
        assert!(perms.get_child(4).is_some());
        assert!(perms.get_child(4).is_some_and(PermissionSet::is_empty));
    }

    #[test]
    fn walk_empty_path_always_succeeds() {
        let perms = PermissionSet::new();
        assert!(perms.walk(&[]));
    }

    #[test]
    fn walk_single_index_equals_has_without_child() {
        let mut perms = PermissionSet::new();
        perms.set(&[3]);
        assert_eq!(perms.walk(&[3]), perms.has(3));
        assert_eq!(perms.walk(&[4]), perms.has(4));
    }

    #[test]
    fn walk_unrefined_grant_short_circuits() {
        let mut perms = PermissionSet::new();
        perms.set(&[3]);
        // Bit 3 has no refinement: everything below it is granted.
        assert!(perms.walk(&[3, 7, 9, 11]));
    }

    #[test]
    fn walk_exhausted_path_is_granted() {
        let mut perms = PermissionSet::new();
        perms.set(&[5]);
        perms.child(5).set(&[2]);
        perms.child(5).child(2).set(&[0]);
        // Every level's bit tested set, path ends mid-tree.
        assert!(perms.walk(&[5, 2]));
    }

    #[test]
    fn walk_unset_bit_fails_at_any_depth() {
        let mut perms = PermissionSet::new();
        perms.set(&[5]);
        perms.child(5).set(&[2]);
        perms.child(5).child(2); // refined with an empty set

        assert!(!perms.walk(&[4]));
        assert!(!perms.walk(&[5, 9]));
        assert!(!perms.walk(&[5, 2, 1])); // empty refinement denies everything
    }

    #[test]
    fn walk_refined_and_unrefined_paths() {
        // Root has bits {3,5}; child at 5 has bit {2}.
        let mut perms = PermissionSet::new();
        perms.set(&[3, 5]);
        perms.child(5).set(&[2]);

        assert!(perms.walk(&[5, 2]));
        assert!(!perms.walk(&[5, 9]));
        assert!(!perms.walk(&[4]));
    }

    #[test]
    fn has_multiple_parent_and_child_positions() {
        let mut perms = PermissionSet::new();
        perms.set(&[5]);
        perms.child(5).set(&[1]);

        let results = perms.has_multiple(&[HashMap::from([(5, vec![1, 2])])]);
        assert_eq!(results[&5], vec![true, true, false]);
    }

    #[test]
    fn has_multiple_unset_parent_is_all_false() {
        let mut perms = PermissionSet::new();
        perms.child(5).set(&[1]); // child granted but parent bit unset

        let results = perms.has_multiple(&[HashMap::from([(5, vec![1])])]);
        assert_eq!(results[&5], vec![false, false]);
    }

    #[test]
    fn has_multiple_without_child_indices() {
        let mut perms = PermissionSet::new();
        perms.set(&[2]);

        let results = perms.has_multiple(&[HashMap::from([(2, vec![]), (3, vec![])])]);
        assert_eq!(results[&2], vec![true]);
        assert_eq!(results[&3], vec![false]);
    }

    #[test]
    fn has_multiple_later_batches_overwrite() {
        let mut perms = PermissionSet::new();
        perms.set(&[5]);
        perms.child(5).set(&[1]);

        let first = HashMap::from([(5, vec![1])]);
        let second = HashMap::from([(5, vec![2])]);
        let results = perms.has_multiple(&[first, second]);
        assert_eq!(results[&5], vec![true, false]); // second batch won
    }

    #[test]
    fn union_merges_bits_and_subtrees() {
        let mut a = PermissionSet::new();
        a.set(&[1]);
        a.child(1).set(&[0]);

        let mut b = PermissionSet::new();
        b.set(&[1, 2]);
        b.child(1).set(&[3]);
        b.child(2).set(&[4]);

        a.union_with(&b);
        assert!(a.has(1));
        assert!(a.has(2));
        assert!(a.walk(&[1, 0])); // preserved
        assert!(a.walk(&[1, 3])); // merged into existing child
        assert!(a.walk(&[2, 4])); // child created on demand
    }

    #[test]
    fn union_is_commutative_on_bits() {
        let mut a = PermissionSet::new();
        a.set(&[1, 60, 190]);
        let mut b = PermissionSet::new();
        b.set(&[2, 60]);

        let mut ab = a.clone();
        ab.union_with(&b);
        let mut ba = b.clone();
        ba.union_with(&a);

        for i in 0..=200 {
            assert_eq!(ab.has(i), ba.has(i), "bit {i}");
        }
    }

    #[test]
    fn union_is_idempotent() {
        let mut a = PermissionSet::new();
        a.set(&[1, 5]);
        a.child(5).set(&[2]);

        let snapshot = a.clone();
        let other = a.clone();
        a.union_with(&other);
        assert_eq!(a, snapshot);
    }

    #[test]
    fn intersection_only_removes_bits() {
        let mut a = PermissionSet::new();
        a.set(&[1, 2, 3, 100]);
        let before = a.clone();

        let mut b = PermissionSet::new();
        b.set(&[2, 4, 100]);

        a.intersect_with(&b);
        for i in 0..=101 {
            if a.has(i) {
                assert!(before.has(i), "bit {i} appeared out of nowhere");
            }
        }
        assert!(a.has(2));
        assert!(a.has(100));
        assert!(!a.has(1));
        assert!(!a.has(3));
        assert!(!a.has(4)); // only in b, never added
    }

    #[test]
    fn intersection_refines_matching_children() {
        let mut a = PermissionSet::new();
        a.set(&[5]);
        a.child(5).set(&[1, 2]);

        let mut b = PermissionSet::new();
        b.set(&[5]);
        b.child(5).set(&[2, 3]);

        a.intersect_with(&b);
        assert!(a.has(5));
        assert!(!a.walk(&[5, 1]));
        assert!(a.walk(&[5, 2]));
        assert!(!a.walk(&[5, 3]));
    }

    #[test]
    fn words_descends_and_creates() {
        let mut perms = PermissionSet::new();
        perms.child(2).child(7).set(&[65]);

        let words = perms.words(&[2, 7]);
        assert_eq!(words.len(), 2);
        assert_eq!(words[1], 1u64 << 1); // bit 65 = word 1, bit 1

        // Missing intermediate levels are silently created.
        assert_eq!(perms.words(&[9, 9]), &[] as &[u64]);
        assert!(perms.get_child(9).is_some());
    }

    #[test]
    fn chaining_reads_naturally() {
        let mut perms = PermissionSet::with_id(9);
        perms.set(&[0, 1]).clear(&[0]).set(&[2]);
        assert!(!perms.has(0));
        assert!(perms.has(1));
        assert!(perms.has(2));
        assert_eq!(perms.id, 9);
    }
}

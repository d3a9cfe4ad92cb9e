//! Layer membership. Interactions are filtered by layer compatibility:
//! segments only interact with segments on the same layer; a point only
//! interacts with a segment whose layer is in the point's layer set.
//!
//! Membership is a bitmask when the problem uses at most 30 distinct
//! layers (fast, allocation-free intersection), falling back to a hashed
//! set otherwise. Both encodings must agree on every predicate below.

use std::collections::HashSet;

const MAX_BITMASK_LAYERS: usize = 30;

/// Interns string layer identifiers to small dense indices, and decides
/// which membership encoding the problem should use.
#[derive(Debug, Default)]
pub struct LayerTable {
    ids: Vec<String>,
}

impl LayerTable {
    pub fn new() -> LayerTable {
        LayerTable::default()
    }

    /// Returns the dense index for `id`, interning it if unseen.
    pub fn intern(&mut self, id: &str) -> usize {
        if let Some(i) = self.ids.iter().position(|s| s == id) {
            return i;
        }
        self.ids.push(id.to_string());
        self.ids.len() - 1
    }

    /// Looks up the dense index for `id` without interning; `None` means
    /// the id was never seen, which callers treat as "ignore this layer".
    pub fn get(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|s| s == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn uses_bitmask(&self) -> bool {
        self.ids.len() <= MAX_BITMASK_LAYERS
    }
}

/// A single segment's layer, or a point's set of layers.
#[derive(Clone, Debug)]
pub enum LayerMembership {
    Bitmask(u32),
    Set(HashSet<usize>),
}

impl LayerMembership {
    pub fn empty(uses_bitmask: bool) -> LayerMembership {
        if uses_bitmask {
            LayerMembership::Bitmask(0)
        } else {
            LayerMembership::Set(HashSet::new())
        }
    }

    pub fn single(uses_bitmask: bool, index: usize) -> LayerMembership {
        let mut m = LayerMembership::empty(uses_bitmask);
        m.insert(index);
        m
    }

    pub fn insert(&mut self, index: usize) {
        match self {
            LayerMembership::Bitmask(bits) => {
                if index < 32 {
                    *bits |= 1 << index;
                }
            }
            LayerMembership::Set(set) => {
                set.insert(index);
            }
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        match self {
            LayerMembership::Bitmask(bits) => index < 32 && (*bits & (1 << index)) != 0,
            LayerMembership::Set(set) => set.contains(&index),
        }
    }

    pub fn intersects(&self, other: &LayerMembership) -> bool {
        match (self, other) {
            (LayerMembership::Bitmask(a), LayerMembership::Bitmask(b)) => (a & b) != 0,
            _ => self.iter_indices().any(|i| other.contains(i)),
        }
    }

    fn iter_indices(&self) -> Box<dyn Iterator<Item = usize> + '_> {
        match self {
            LayerMembership::Bitmask(bits) => {
                Box::new((0..32).filter(move |i| (bits & (1 << i)) != 0))
            }
            LayerMembership::Set(set) => Box::new(set.iter().copied()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmask_and_set_agree_on_membership() {
        let mut bm = LayerMembership::empty(true);
        let mut set = LayerMembership::empty(false);
        for i in [0usize, 3, 7, 15] {
            bm.insert(i);
            set.insert(i);
        }
        for i in 0..20 {
            assert_eq!(bm.contains(i), set.contains(i), "index {i}");
        }
    }

    #[test]
    fn intersects_requires_shared_layer() {
        let a = LayerMembership::single(true, 1);
        let b = LayerMembership::single(true, 2);
        assert!(!a.intersects(&b));
        let c = LayerMembership::single(true, 1);
        assert!(a.intersects(&c));
    }

    #[test]
    fn unknown_layer_id_is_ignored() {
        let mut table = LayerTable::new();
        table.intern("ground");
        assert_eq!(table.get("ground"), Some(0));
        assert_eq!(table.get("nonexistent"), None);
    }

    #[test]
    fn switches_to_set_above_bit_width() {
        let mut table = LayerTable::new();
        for i in 0..31 {
            table.intern(&format!("layer{i}"));
        }
        assert!(!table.uses_bitmask());
    }
}

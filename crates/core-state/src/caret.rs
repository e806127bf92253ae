//! Caret collection.
//!
//! Native order is insertion order: the yank engine iterates carets exactly as stored
//! here and never sorts them by offset. The first caret added becomes primary.
//!
//! Merge policy: after carets are repositioned, carets sharing an offset collapse into
//! the first one encountered in native order, which keeps its selection. If the primary
//! caret is among those removed, the survivor at the same offset becomes primary.

use std::collections::HashMap;

use tracing::debug;

/// Stable caret identifier. Never reused within one `CaretSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaretId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caret {
    pub id: CaretId,
    pub offset: usize,
    /// Pending selection as `(anchor, head)`; `head` normally equals `offset`.
    pub selection: Option<(usize, usize)>,
}

/// Caret collection interface consumed by the yank engine.
pub trait CaretHost {
    /// Caret ids in native order.
    fn caret_ids(&self) -> Vec<CaretId>;
    fn primary_caret(&self) -> Option<CaretId>;
    fn caret_offset(&self, id: CaretId) -> Option<usize>;
    /// Request a caret move. Returns false if the caret no longer exists.
    fn move_caret(&mut self, id: CaretId, offset: usize) -> bool;
    /// Collapse carets sharing an offset. Returns the number removed.
    fn merge_duplicate_carets(&mut self) -> usize;
}

#[derive(Debug, Clone, Default)]
pub struct CaretSet {
    carets: Vec<Caret>,
    primary: Option<CaretId>,
    next_id: u32,
}

impl CaretSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set with one caret per offset, in the given order.
    pub fn from_offsets<I: IntoIterator<Item = usize>>(offsets: I) -> Self {
        let mut set = Self::new();
        for offset in offsets {
            set.add(offset);
        }
        set
    }

    pub fn add(&mut self, offset: usize) -> CaretId {
        let id = CaretId(self.next_id);
        self.next_id += 1;
        self.carets.push(Caret {
            id,
            offset,
            selection: None,
        });
        if self.primary.is_none() {
            self.primary = Some(id);
        }
        id
    }

    pub fn len(&self) -> usize {
        self.carets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Caret> {
        self.carets.iter()
    }

    pub fn get(&self, id: CaretId) -> Option<&Caret> {
        self.carets.iter().find(|c| c.id == id)
    }

    pub fn primary(&self) -> Option<&Caret> {
        self.primary.and_then(|id| self.get(id))
    }

    pub fn set_primary(&mut self, id: CaretId) -> bool {
        if self.get(id).is_some() {
            self.primary = Some(id);
            true
        } else {
            false
        }
    }

    pub fn offsets(&self) -> Vec<usize> {
        self.carets.iter().map(|c| c.offset).collect()
    }

    /// Set a selection and place the caret on its head.
    pub fn set_selection(&mut self, id: CaretId, anchor: usize, head: usize) -> bool {
        match self.carets.iter_mut().find(|c| c.id == id) {
            Some(caret) => {
                caret.selection = Some((anchor, head));
                caret.offset = head;
                true
            }
            None => false,
        }
    }

    pub fn clear_selections(&mut self) {
        for caret in &mut self.carets {
            caret.selection = None;
        }
    }

    pub fn move_to(&mut self, id: CaretId, offset: usize) -> bool {
        match self.carets.iter_mut().find(|c| c.id == id) {
            Some(caret) => {
                caret.offset = offset;
                true
            }
            None => false,
        }
    }

    pub fn merge_duplicates(&mut self) -> usize {
        let mut first_at: HashMap<usize, CaretId> = HashMap::new();
        let mut primary = self.primary;
        let before = self.carets.len();
        self.carets.retain(|caret| match first_at.get(&caret.offset) {
            Some(&survivor) => {
                if primary == Some(caret.id) {
                    primary = Some(survivor);
                }
                false
            }
            None => {
                first_at.insert(caret.offset, caret.id);
                true
            }
        });
        self.primary = primary;
        let removed = before - self.carets.len();
        if removed > 0 {
            debug!(
                target: "state.carets",
                removed,
                remaining = self.carets.len(),
                "carets_merged"
            );
        }
        removed
    }
}

impl CaretHost for CaretSet {
    fn caret_ids(&self) -> Vec<CaretId> {
        self.carets.iter().map(|c| c.id).collect()
    }

    fn primary_caret(&self) -> Option<CaretId> {
        self.primary
    }

    fn caret_offset(&self, id: CaretId) -> Option<usize> {
        self.get(id).map(|c| c.offset)
    }

    fn move_caret(&mut self, id: CaretId, offset: usize) -> bool {
        self.move_to(id, offset)
    }

    fn merge_duplicate_carets(&mut self) -> usize {
        self.merge_duplicates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_added_caret_is_primary() {
        let set = CaretSet::from_offsets([4, 0, 9]);
        assert_eq!(set.primary().unwrap().offset, 4);
        assert_eq!(set.offsets(), vec![4, 0, 9], "native order is insertion order");
    }

    #[test]
    fn merge_keeps_first_encountered_caret() {
        let mut set = CaretSet::from_offsets([1, 2, 3]);
        let ids = set.caret_ids();
        set.set_selection(ids[0], 0, 1);
        set.set_selection(ids[2], 7, 3);
        set.move_to(ids[1], 5);
        set.move_to(ids[2], 5);
        assert_eq!(set.merge_duplicates(), 1);
        assert_eq!(set.caret_ids(), vec![ids[0], ids[1]]);
        assert_eq!(set.get(ids[1]).unwrap().selection, None);
        assert_eq!(set.get(ids[0]).unwrap().selection, Some((0, 1)));
    }

    #[test]
    fn merge_repoints_removed_primary() {
        let mut set = CaretSet::from_offsets([8, 2]);
        let ids = set.caret_ids();
        set.move_to(ids[0], 2);
        // caret 1 now comes second at offset 2; it is not the first-encountered one
        assert_eq!(set.merge_duplicates(), 1);
        assert_eq!(set.primary_caret(), Some(ids[0]));

        let mut set = CaretSet::from_offsets([2, 8]);
        let ids = set.caret_ids();
        set.set_primary(ids[1]);
        set.move_to(ids[1], 2);
        set.merge_duplicates();
        assert_eq!(set.primary_caret(), Some(ids[0]));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn moving_unknown_caret_fails() {
        let mut set = CaretSet::from_offsets([0]);
        assert!(!set.move_caret(CaretId(42), 3));
    }
}

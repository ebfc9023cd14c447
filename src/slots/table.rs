//! Allocation of fresh local-variable slots for synthesized code.

use itertools::Itertools as _;

use super::slot::Slot;
use crate::types::field_type::FieldType;

fn width(ty: &FieldType) -> u16 {
    if ty.is_dual_slot() { 2 } else { 1 }
}

/// Hands out local-variable indices above a method's original frame.
///
/// The rewriter seeds one `VariableTable` per method with the method's
/// original `max_locals` (including the argument slots and, for instance
/// methods, the implicit `this`). Every index at or above that point is free
/// for the rewriter's own use: the continuation-index temporary, the
/// unboxed locals materialized by a restore block, and so on.
///
/// Allocation is first-fit over released slots of the exact width needed,
/// falling back to extending the frame. This keeps slot indices stable and
/// low across repeated acquire/release cycles within one method, at the
/// cost of never coalescing two freed single-width slots into a double-width
/// one (a double-width request always extends the frame if no double-width
/// slot is free, even when two adjacent single-width ones are).
#[derive(Debug, Clone)]
pub struct VariableTable {
    next: u16,
    high_water: u16,
    free: Vec<(u16, u16)>,
}

impl VariableTable {
    /// Creates a table whose first free index is `original_max_locals`.
    #[must_use]
    pub fn new(original_max_locals: u16) -> Self {
        Self {
            next: original_max_locals,
            high_water: original_max_locals,
            free: Vec::new(),
        }
    }

    /// Reserves a slot of the type's natural width, reusing a released slot
    /// of the same width if one is available.
    pub fn acquire(&mut self, ty: FieldType) -> Slot {
        let needed = width(&ty);
        if let Some(pos) = self.free.iter().find_position(|(_, w)| *w == needed).map(|(p, _)| p) {
            let (index, _) = self.free.remove(pos);
            return Slot::new(index, ty);
        }
        let index = self.next;
        self.next += needed;
        self.high_water = self.high_water.max(self.next);
        Slot::new(index, ty)
    }

    /// Releases a slot. The slot's index becomes available for a future
    /// [`Self::acquire`] of the same width. The released `Slot` handle
    /// itself remains a distinct value from whatever `Slot` a later
    /// acquisition at the same index mints; callers are responsible for not
    /// building further fragments against it.
    pub fn release(&mut self, slot: &Slot) {
        self.free.push((slot.index(), width(slot.ty())));
    }

    /// The largest local-variable frame size reached so far. This is the
    /// `max_locals` the rewritten method must declare.
    #[must_use]
    pub fn max_locals(&self) -> u16 {
        self.high_water
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;
    use crate::types::field_type::PrimitiveType;

    #[test]
    fn acquire_extends_past_original_frame() {
        let mut table = VariableTable::new(4);
        let slot = table.acquire(FieldType::Base(PrimitiveType::Int));
        assert_eq!(slot.index(), 4);
        assert_eq!(table.max_locals(), 5);
    }

    #[test]
    fn dual_slot_type_reserves_two_indices() {
        let mut table = VariableTable::new(0);
        let slot = table.acquire(FieldType::Base(PrimitiveType::Long));
        assert_eq!(slot.index(), 0);
        assert_eq!(table.max_locals(), 2);
    }

    #[test]
    fn released_slot_is_reused_by_same_width_acquire() {
        let mut table = VariableTable::new(0);
        let a = table.acquire(FieldType::Base(PrimitiveType::Int));
        table.release(&a);
        let b = table.acquire(FieldType::Base(PrimitiveType::Int));
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert_eq!(table.max_locals(), 1);
    }

    #[test]
    fn mismatched_width_does_not_reuse_freed_slot() {
        let mut table = VariableTable::new(0);
        let a = table.acquire(FieldType::Base(PrimitiveType::Int));
        table.release(&a);
        let b = table.acquire(FieldType::Base(PrimitiveType::Long));
        assert_eq!(b.index(), 1);
        assert_eq!(table.max_locals(), 3);
    }

    proptest! {
        /// For any sequence of acquisitions kept simultaneously live, no two
        /// slots' index ranges overlap, regardless of acquisition order or
        /// the mix of single- and dual-width requests.
        #[test]
        fn concurrently_live_slots_never_overlap(
            widths in prop::collection::vec(prop_oneof![Just(1u16), Just(2u16)], 0..12),
        ) {
            let mut table = VariableTable::new(0);
            let spans: Vec<(u16, u16)> = widths
                .into_iter()
                .map(|width| {
                    let ty = if width == 2 {
                        FieldType::Base(PrimitiveType::Long)
                    } else {
                        FieldType::Base(PrimitiveType::Int)
                    };
                    let slot = table.acquire(ty);
                    (slot.index(), slot.index() + width)
                })
                .collect();

            for (i, &(a_start, a_end)) in spans.iter().enumerate() {
                for &(b_start, b_end) in &spans[i + 1..] {
                    prop_assert!(a_end <= b_start || b_end <= a_start);
                }
            }
        }
    }
}

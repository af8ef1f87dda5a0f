use std::fmt;

use crate::constants::*;

/// Fixed-size array of physical frames, each holding at most one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTable {
    slots: Box<[Option<PageId>]>,
}

impl FrameTable {
    /// Create a frame table with every slot empty
    pub fn new(num_frames: usize) -> Self {
        FrameTable {
            slots: vec![None; num_frames].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.slots.len()
    }

    /// Lowest-indexed empty slot, if any
    pub fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Put a page into a frame, returning whatever page it displaced
    pub fn place(&mut self, frame: usize, page: PageId) -> Option<PageId> {
        self.slots[frame].replace(page)
    }

    pub fn resident_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Occupied frames as (frame index, page) pairs in frame order
    pub fn resident(&self) -> impl Iterator<Item = (usize, PageId)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(frame, slot)| slot.map(|page| (frame, page)))
    }

    /// Empty every slot without changing the frame count
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Read-only view of the slots
    pub fn as_slice(&self) -> &[Option<PageId>] {
        &self.slots
    }
}

impl fmt::Display for FrameTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match slot {
                Some(page) => write!(f, "{}", page)?,
                None => write!(f, "{}", EMPTY_SLOT)?,
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_table_initialization() {
        let frames = FrameTable::new(4);
        assert_eq!(frames.num_frames(), 4);
        assert_eq!(frames.resident_count(), 0);
        assert_eq!(frames.first_empty(), Some(0));
        assert_eq!(frames.as_slice(), &[None; 4]);
    }

    #[test]
    fn test_place_returns_displaced_page() {
        let mut frames = FrameTable::new(2);
        assert_eq!(frames.place(1, 7), None);
        assert_eq!(frames.as_slice(), &[None, Some(7)]);

        // Overwriting frame 1 hands back the old occupant
        assert_eq!(frames.place(1, -3), Some(7));
        assert_eq!(frames.as_slice(), &[None, Some(-3)]);
    }

    #[test]
    fn test_first_empty_skips_occupied() {
        let mut frames = FrameTable::new(3);
        frames.place(0, 1);
        frames.place(2, 3);
        assert_eq!(frames.first_empty(), Some(1));

        frames.place(1, 2);
        assert_eq!(frames.first_empty(), None);
        assert_eq!(frames.resident_count(), 3);
    }

    #[test]
    fn test_resident_skips_empty_slots() {
        let mut frames = FrameTable::new(3);
        frames.place(0, 10);
        frames.place(2, 30);

        assert_eq!(frames.resident().collect::<Vec<_>>(), vec![(0, 10), (2, 30)]);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut frames = FrameTable::new(3);
        frames.place(0, 1);
        frames.place(1, 2);
        frames.clear();

        assert_eq!(frames, FrameTable::new(3));
    }

    #[test]
    fn test_display() {
        let mut frames = FrameTable::new(3);
        frames.place(0, 1);
        frames.place(1, 2);
        assert_eq!(frames.to_string(), "[1, 2, -]");
        assert_eq!(FrameTable::new(0).to_string(), "[]");
    }
}

//! Virtual page to physical frame translation with FIFO eviction.

use std::fmt;

use hashbrown::HashMap;

use crate::constants::PageId;
use crate::error::{Result, SimError};
use crate::memory::FrameTable;
use crate::replacer::{FifoReplacer, PageEvent, PageReplacer};

/// Result of a single virtual page access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResult {
    /// Page was mapped to this frame already
    Hit(usize),
    /// Page was loaded into this frame, displacing `evicted` if memory was full
    Fault { frame: usize, evicted: Option<PageId> },
}

impl AccessResult {
    pub fn is_fault(&self) -> bool {
        matches!(self, AccessResult::Fault { .. })
    }
}

#[derive(Debug, Clone)]
pub struct VirtualMemoryEngine {
    // physical memory doubles as the frame -> page reverse index
    physical_memory: FrameTable,
    page_table: HashMap<PageId, usize>,
    fifo_order: FifoReplacer,
    fault_count: u64,
    access_count: u64,
}

impl VirtualMemoryEngine {
    /// Fails with [`SimError::InvalidConfig`] when `num_frames` is zero.
    pub fn new(num_frames: usize) -> Result<Self> {
        if num_frames == 0 {
            return Err(SimError::InvalidConfig(
                "number of physical frames must be positive".to_string(),
            ));
        }
        log::debug!("virtual memory engine: {} physical frames", num_frames);
        Ok(VirtualMemoryEngine {
            physical_memory: FrameTable::new(num_frames),
            page_table: HashMap::with_capacity(num_frames),
            fifo_order: FifoReplacer::new(),
            fault_count: 0,
            access_count: 0,
        })
    }

    /// Access a virtual page. Returns `true` when the access faulted.
    pub fn access(&mut self, vpage: PageId) -> bool {
        self.access_detailed(vpage).is_fault()
    }

    /// Like [`access`](Self::access) but reports the frame and any evicted page
    pub fn access_detailed(&mut self, vpage: PageId) -> AccessResult {
        self.access_count += 1;
        if let Some(frame) = self.translate(vpage) {
            log::trace!("vpage {} hit in frame {}", vpage, frame);
            return AccessResult::Hit(frame);
        }
        self.fault_count += 1;
        self.load(vpage)
    }

    fn load(&mut self, vpage: PageId) -> AccessResult {
        let Some(frame) = self
            .physical_memory
            .first_empty()
            .or_else(|| self.fifo_order.pick_victim())
        else {
            unreachable!("FIFO order lost track of occupied frames");
        };

        let evicted = self.physical_memory.place(frame, vpage);
        match evicted {
            Some(old) => {
                self.page_table.remove(&old);
                log::debug!("vpage {} fault: evicted vpage {} from frame {}", vpage, old, frame);
            }
            None => log::debug!("vpage {} fault: loaded into free frame {}", vpage, frame),
        }
        self.page_table.insert(vpage, frame);
        self.fifo_order.page_event(PageEvent::Loaded { page: vpage, frame });
        AccessResult::Fault { frame, evicted }
    }

    /// Frame a virtual page is mapped to, without touching any state
    pub fn translate(&self, vpage: PageId) -> Option<usize> {
        self.page_table.get(&vpage).copied()
    }

    pub fn reset(&mut self) {
        self.physical_memory.clear();
        self.page_table.clear();
        self.fifo_order.clear();
        self.fault_count = 0;
        self.access_count = 0;
        log::debug!("virtual memory engine reset");
    }

    pub fn physical_memory(&self) -> &[Option<PageId>] {
        self.physical_memory.as_slice()
    }

    pub fn frame_table(&self) -> &FrameTable {
        &self.physical_memory
    }

    /// Page table snapshot as (virtual page, frame) pairs sorted by page
    pub fn page_table(&self) -> Vec<(PageId, usize)> {
        // the frame table holds the same pairs as the map, already keyed by frame
        let mut entries: Vec<(PageId, usize)> =
            self.physical_memory.resident().map(|(frame, page)| (page, frame)).collect();
        entries.sort_unstable();
        entries
    }

    /// Frames in fill order, next victim first
    pub fn fifo_order(&self) -> Vec<usize> {
        self.fifo_order.tracked_frames()
    }

    pub fn num_frames(&self) -> usize {
        self.physical_memory.num_frames()
    }

    pub fn fault_count(&self) -> u64 {
        self.fault_count
    }

    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    pub fn hit_count(&self) -> u64 {
        self.access_count - self.fault_count
    }
}

impl fmt::Display for VirtualMemoryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "physical={} mapped={} faults={} hits={}",
            self.physical_memory,
            self.page_table.len(),
            self.fault_count,
            self.hit_count()
        )
    }
}

//! Fixed-size paging with a pluggable replacement policy.

use std::fmt;
use std::str::FromStr;

use hashbrown::HashMap;

use crate::constants::PageId;
use crate::error::{Result, SimError};
use crate::memory::FrameTable;
use crate::replacer::{FifoReplacer, LruReplacer, PageEvent, PageReplacer};

/// Page replacement policy, fixed when the engine is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplacementPolicy {
    Fifo,
    Lru,
}

impl ReplacementPolicy {
    fn replacer(self) -> Box<dyn PageReplacer> {
        match self {
            ReplacementPolicy::Fifo => Box::new(FifoReplacer::new()),
            ReplacementPolicy::Lru => Box::new(LruReplacer::new()),
        }
    }
}

impl FromStr for ReplacementPolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FIFO" => Ok(ReplacementPolicy::Fifo),
            "LRU" => Ok(ReplacementPolicy::Lru),
            _ => Err(SimError::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementPolicy::Fifo => write!(f, "FIFO"),
            ReplacementPolicy::Lru => write!(f, "LRU"),
        }
    }
}

/// Paging simulator: a frame table, a fault counter and a replacement policy
#[derive(Debug)]
pub struct PagingEngine {
    frames: FrameTable,
    // page -> frame for the resident pages
    resident: HashMap<PageId, usize>,
    policy: ReplacementPolicy,
    replacer: Box<dyn PageReplacer>,
    fault_count: u64,
    access_count: u64,
}

impl PagingEngine {
    /// Build an engine with `num_frames` empty frames.
    ///
    /// Fails with [`SimError::InvalidConfig`] when `num_frames` is zero.
    pub fn new(num_frames: usize, policy: ReplacementPolicy) -> Result<Self> {
        if num_frames == 0 {
            return Err(SimError::InvalidConfig(
                "number of frames must be positive".to_string(),
            ));
        }
        log::debug!("paging engine: {} frames, {} replacement", num_frames, policy);
        Ok(PagingEngine {
            frames: FrameTable::new(num_frames),
            resident: HashMap::with_capacity(num_frames),
            policy,
            replacer: policy.replacer(),
            fault_count: 0,
            access_count: 0,
        })
    }

    /// Access a page. Returns `true` when the access faulted.
    pub fn access(&mut self, page: PageId) -> bool {
        self.access_count += 1;
        if self.is_resident(page) {
            log::trace!("page {} hit", page);
            self.replacer.page_event(PageEvent::Touched(page));
            return false;
        }
        self.fault_count += 1;
        self.load(page);
        true
    }

    fn load(&mut self, page: PageId) {
        // the replacer tracks every occupied frame, so a full table always has a victim
        let Some(frame) = self.frames.first_empty().or_else(|| self.replacer.pick_victim())
        else {
            unreachable!("replacer lost track of resident frames");
        };

        if let Some(evicted) = self.frames.place(frame, page) {
            self.resident.remove(&evicted);
            log::debug!(
                "page {} fault: evicted page {} from frame {} ({})",
                page, evicted, frame, self.policy
            );
        } else {
            log::debug!("page {} fault: loaded into free frame {}", page, frame);
        }
        self.resident.insert(page, frame);
        self.replacer.page_event(PageEvent::Loaded { page, frame });
    }

    /// Empty every frame and zero the counters; frame count and policy are kept
    pub fn reset(&mut self) {
        self.frames.clear();
        self.resident.clear();
        self.replacer.clear();
        self.fault_count = 0;
        self.access_count = 0;
        log::debug!("paging engine reset");
    }

    pub fn frames(&self) -> &[Option<PageId>] {
        self.frames.as_slice()
    }

    pub fn frame_table(&self) -> &FrameTable {
        &self.frames
    }

    pub fn num_frames(&self) -> usize {
        self.frames.num_frames()
    }

    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
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

    pub fn resident_count(&self) -> usize {
        self.frames.resident_count()
    }

    pub fn is_resident(&self, page: PageId) -> bool {
        self.resident.contains_key(&page)
    }

    /// Frames in the order the policy would evict them (next victim first)
    pub fn eviction_order(&self) -> Vec<usize> {
        self.replacer.tracked_frames()
    }
}

impl fmt::Display for PagingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames={} faults={} hits={}",
            self.policy,
            self.frames,
            self.fault_count,
            self.hit_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(engine: &mut PagingEngine, pages: &[PageId]) -> Vec<bool> {
        pages.iter().map(|&p| engine.access(p)).collect()
    }

    fn resident_sorted(engine: &PagingEngine) -> Vec<PageId> {
        let mut pages: Vec<PageId> = engine.frames().iter().flatten().copied().collect();
        pages.sort();
        pages
    }

    /// Tracker frames and occupied frames must be the same set
    fn assert_consistent(engine: &PagingEngine) {
        let mut tracked = engine.eviction_order();
        tracked.sort();
        let occupied: Vec<usize> = engine.frame_table().resident().map(|(f, _)| f).collect();
        assert_eq!(tracked, occupied);
        assert_eq!(engine.resident_count(), occupied.len());
    }

    #[test]
    fn test_zero_frames_rejected() {
        let err = PagingEngine::new(0, ReplacementPolicy::Fifo).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("FIFO".parse::<ReplacementPolicy>().unwrap(), ReplacementPolicy::Fifo);
        assert_eq!("lru".parse::<ReplacementPolicy>().unwrap(), ReplacementPolicy::Lru);
        assert_eq!(" Lru ".parse::<ReplacementPolicy>().unwrap(), ReplacementPolicy::Lru);
        assert!(matches!(
            "CLOCK".parse::<ReplacementPolicy>(),
            Err(SimError::UnknownPolicy(_))
        ));
    }

    #[test]
    fn test_fifo_four_pages_three_frames() {
        // 1,2,3,4 with 3 frames: every access faults, page 1 goes first
        let mut engine = PagingEngine::new(3, ReplacementPolicy::Fifo).unwrap();
        assert_eq!(run(&mut engine, &[1, 2, 3, 4]), vec![true; 4]);
        assert_eq!(engine.fault_count(), 4);
        assert_eq!(resident_sorted(&engine), vec![2, 3, 4]);
        assert_eq!(engine.frames(), &[Some(4), Some(2), Some(3)]);
        assert_consistent(&engine);
    }

    #[test]
    fn test_fifo_ignores_hits() {
        // Re-using page 1 does not save it under FIFO
        let mut engine = PagingEngine::new(3, ReplacementPolicy::Fifo).unwrap();
        assert_eq!(run(&mut engine, &[1, 2, 3, 1, 4]), vec![true, true, true, false, true]);
        assert_eq!(resident_sorted(&engine), vec![2, 3, 4]);
        assert_eq!(engine.hit_count(), 1);
        assert_consistent(&engine);
    }

    #[test]
    fn test_lru_evicts_least_recent() {
        // 1,2,3,1,4 with 3 frames: 2 is least recently used when 4 arrives
        let mut engine = PagingEngine::new(3, ReplacementPolicy::Lru).unwrap();
        assert_eq!(run(&mut engine, &[1, 2, 3, 1, 4]), vec![true, true, true, false, true]);
        assert_eq!(engine.fault_count(), 4);
        assert_eq!(resident_sorted(&engine), vec![1, 3, 4]);
        assert_eq!(engine.frames(), &[Some(1), Some(4), Some(3)]);
        assert_consistent(&engine);
    }

    #[test]
    fn test_belady_reference_string() {
        // Classic string: FIFO 9 faults with 3 frames, 10 with 4
        let refs = [1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5];

        let mut three = PagingEngine::new(3, ReplacementPolicy::Fifo).unwrap();
        run(&mut three, &refs);
        assert_eq!(three.fault_count(), 9);

        let mut four = PagingEngine::new(4, ReplacementPolicy::Fifo).unwrap();
        run(&mut four, &refs);
        assert_eq!(four.fault_count(), 10);

        let mut lru = PagingEngine::new(3, ReplacementPolicy::Lru).unwrap();
        run(&mut lru, &refs);
        assert_eq!(lru.fault_count(), 10);
    }

    #[test]
    fn test_negative_and_zero_page_ids() {
        let mut engine = PagingEngine::new(2, ReplacementPolicy::Lru).unwrap();
        assert!(engine.access(0));
        assert!(engine.access(-1));
        assert!(!engine.access(0));
        assert_eq!(engine.frames(), &[Some(0), Some(-1)]);
    }

    #[test]
    fn test_single_frame() {
        let mut engine = PagingEngine::new(1, ReplacementPolicy::Lru).unwrap();
        assert_eq!(run(&mut engine, &[7, 7, 8, 7]), vec![true, false, true, true]);
        assert_eq!(engine.frames(), &[Some(7)]);
        assert_consistent(&engine);
    }

    #[test]
    fn test_reset_matches_fresh_engine() {
        for policy in [ReplacementPolicy::Fifo, ReplacementPolicy::Lru] {
            let mut engine = PagingEngine::new(3, policy).unwrap();
            run(&mut engine, &[5, 6, 7, 8, 5]);
            engine.reset();

            let fresh = PagingEngine::new(3, policy).unwrap();
            assert_eq!(engine.frames(), fresh.frames());
            assert_eq!(engine.fault_count(), 0);
            assert_eq!(engine.access_count(), 0);
            assert!(engine.eviction_order().is_empty());
            assert_eq!(engine.policy(), policy);

            // Behaves like a new engine afterwards
            assert!(engine.access(5));
            assert_eq!(engine.frames(), &[Some(5), None, None]);
        }
    }

    #[test]
    fn test_display() {
        let mut engine = PagingEngine::new(3, ReplacementPolicy::Fifo).unwrap();
        run(&mut engine, &[1, 2, 1]);
        assert_eq!(engine.to_string(), "FIFO frames=[1, 2, -] faults=2 hits=1");
    }
}

//! Page replacement bookkeeping.
//!
//! An engine reports page events to its replacer and asks it for a victim frame once
//! every frame is occupied. The replacer only tracks frame indices and recency; the
//! engine owns the frames themselves.

use std::collections::VecDeque;
use std::fmt;

use hashbrown::HashMap;

use crate::constants::PageId;

/// Something that happened to a page, as seen by the replacer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// A resident page was accessed (hit)
    Touched(PageId),
    /// A page was placed into a frame after a fault
    Loaded { page: PageId, frame: usize },
}

pub trait PageReplacer: fmt::Debug + Send {
    /// Inform the replacer of a page event. Replacers ignore events they don't use.
    fn page_event(&mut self, event: PageEvent);

    /// Choose the frame to evict and stop tracking it. `None` when nothing is tracked.
    fn pick_victim(&mut self) -> Option<usize>;

    /// Frame indices currently tracked, in eviction order (next victim first)
    fn tracked_frames(&self) -> Vec<usize>;

    /// Forget everything
    fn clear(&mut self);
}

/// Evicts frames in the order they were filled, regardless of hits
#[derive(Debug, Default, Clone)]
pub struct FifoReplacer {
    fifo: VecDeque<usize>,
}

impl FifoReplacer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageReplacer for FifoReplacer {
    fn page_event(&mut self, event: PageEvent) {
        if let PageEvent::Loaded { frame, .. } = event {
            self.fifo.push_back(frame);
        }
    }

    fn pick_victim(&mut self) -> Option<usize> {
        self.fifo.pop_front()
    }

    fn tracked_frames(&self) -> Vec<usize> {
        self.fifo.iter().copied().collect()
    }

    fn clear(&mut self) {
        self.fifo.clear();
    }
}

#[derive(Debug, Clone)]
struct Node {
    page: PageId,
    frame: usize,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Evicts the least recently used page.
///
/// Recency is an intrusive doubly-linked list stored in an arena (`nodes`), with a hash
/// index from page to node. Touching a page and picking a victim are both O(1).
/// `head` is the least recently used node, `tail` the most recent.
#[derive(Debug, Default, Clone)]
pub struct LruReplacer {
    nodes: Vec<Node>,
    vacant: Vec<usize>,
    index: HashMap<PageId, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl LruReplacer {
    pub fn new() -> Self {
        Self::default()
    }

    fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        std::iter::successors(self.head.map(|id| &self.nodes[id]), |node| {
            node.next.map(|id| &self.nodes[id])
        })
    }

    fn unlink(&mut self, id: usize) {
        let (prev, next) = (self.nodes[id].prev, self.nodes[id].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[id].prev = None;
        self.nodes[id].next = None;
    }

    fn push_back(&mut self, id: usize) {
        self.nodes[id].prev = self.tail;
        self.nodes[id].next = None;
        match self.tail {
            Some(t) => self.nodes[t].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
    }

    fn alloc(&mut self, page: PageId, frame: usize) -> usize {
        let node = Node { page, frame, prev: None, next: None };
        match self.vacant.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn touch(&mut self, page: PageId) {
        if let Some(&id) = self.index.get(&page) {
            if self.tail != Some(id) {
                self.unlink(id);
                self.push_back(id);
            }
        }
    }

    fn load(&mut self, page: PageId, frame: usize) {
        // a reload of a tracked page just refreshes it
        if let Some(&id) = self.index.get(&page) {
            self.nodes[id].frame = frame;
            self.unlink(id);
            self.push_back(id);
            return;
        }
        let id = self.alloc(page, frame);
        self.index.insert(page, id);
        self.push_back(id);
    }
}

impl PageReplacer for LruReplacer {
    fn page_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::Touched(page) => self.touch(page),
            PageEvent::Loaded { page, frame } => self.load(page, frame),
        }
    }

    fn pick_victim(&mut self) -> Option<usize> {
        let id = self.head?;
        self.unlink(id);
        let node = &self.nodes[id];
        let (page, frame) = (node.page, node.frame);
        self.index.remove(&page);
        self.vacant.push(id);
        log::trace!("LRU victim: page {} in frame {}", page, frame);
        Some(frame)
    }

    fn tracked_frames(&self) -> Vec<usize> {
        self.iter().map(|node| node.frame).collect()
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.vacant.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }
}

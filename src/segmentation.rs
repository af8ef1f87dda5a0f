//! Contiguous segment allocation over a bounded address space.
//!
//! Placement is first-fit by address. Freed space is never merged or compacted, so
//! fragmentation can make an allocation fail even when enough memory is free in total.

use std::fmt;

use crate::error::{Result, SimError};

/// A labeled, contiguous region `[start, start + size)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub start: usize,
    pub size: usize,
    pub label: String,
}

impl Segment {
    /// First address past the segment
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.size
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@[{}, {})", self.label, self.start, self.end())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationEngine {
    total_memory: usize,
    // address order except for the most recent allocation, which sits at the end;
    // free() scans in this order
    segments: Vec<Segment>,
    free_memory: usize,
}

impl SegmentationEngine {
    /// Fails with [`SimError::InvalidConfig`] when `total_memory` is zero.
    pub fn new(total_memory: usize) -> Result<Self> {
        if total_memory == 0 {
            return Err(SimError::InvalidConfig(
                "total memory must be positive".to_string(),
            ));
        }
        log::debug!("segmentation engine: {} units", total_memory);
        Ok(SegmentationEngine {
            total_memory,
            segments: Vec::new(),
            free_memory: total_memory,
        })
    }

    /// Place a segment of `size` units in the first gap that holds it.
    ///
    /// Returns `false` when `size` is zero, exceeds the free memory, or no contiguous
    /// gap is large enough. Labels are not required to be unique.
    pub fn allocate(&mut self, size: usize, label: &str) -> bool {
        if size == 0 {
            log::warn!("segment '{}' rejected: size must be positive", label);
            return false;
        }
        if size > self.free_memory {
            log::debug!(
                "segment '{}' ({} units) rejected: only {} free",
                label, size, self.free_memory
            );
            return false;
        }

        self.segments.sort_by_key(|seg| seg.start);
        let Some(start) = self.find_gap(size) else {
            log::debug!(
                "segment '{}' ({} units) rejected: no contiguous gap, largest is {}",
                label,
                size,
                self.largest_free_gap()
            );
            return false;
        };

        self.segments.push(Segment { start, size, label: label.to_string() });
        self.free_memory -= size;
        log::debug!("segment '{}' placed at [{}, {})", label, start, start + size);
        true
    }

    /// First-fit scan; `segments` must be sorted by start
    fn find_gap(&self, size: usize) -> Option<usize> {
        let mut cursor = 0;
        for seg in &self.segments {
            if seg.start.saturating_sub(cursor) >= size {
                return Some(cursor);
            }
            cursor = seg.end();
        }
        if self.total_memory - cursor >= size {
            Some(cursor)
        } else {
            None
        }
    }

    /// Remove the first segment labeled `label` in allocation-list order, so with
    /// duplicate labels the most recent allocation goes last. Returns `false` if none
    /// matches.
    pub fn free(&mut self, label: &str) -> bool {
        match self.segments.iter().position(|seg| seg.label == label) {
            Some(i) => {
                let seg = self.segments.remove(i);
                self.free_memory += seg.size;
                log::debug!("segment {} freed", seg);
                true
            }
            None => {
                log::debug!("segment '{}' not found", label);
                false
            }
        }
    }

    /// Drop every segment; total memory is kept
    pub fn reset(&mut self) {
        self.segments.clear();
        self.free_memory = self.total_memory;
        log::debug!("segmentation engine reset");
    }

    /// Segments in address order
    pub fn segments(&self) -> Vec<&Segment> {
        let mut sorted: Vec<&Segment> = self.segments.iter().collect();
        sorted.sort_by_key(|seg| seg.start);
        sorted
    }

    /// Segments in the order `free` scans them
    pub fn allocation_order(&self) -> &[Segment] {
        &self.segments
    }

    /// First segment `free(label)` would remove
    pub fn find(&self, label: &str) -> Option<&Segment> {
        self.segments.iter().find(|seg| seg.label == label)
    }

    pub fn total_memory(&self) -> usize {
        self.total_memory
    }

    pub fn free_memory(&self) -> usize {
        self.free_memory
    }

    pub fn used_memory(&self) -> usize {
        self.total_memory - self.free_memory
    }

    /// Holes between segments as `(start, size)`, in address order
    pub fn free_gaps(&self) -> Vec<(usize, usize)> {
        let mut gaps = Vec::new();
        let mut cursor = 0;
        for seg in self.segments() {
            if seg.start > cursor {
                gaps.push((cursor, seg.start - cursor));
            }
            cursor = seg.end();
        }
        if self.total_memory > cursor {
            gaps.push((cursor, self.total_memory - cursor));
        }
        gaps
    }

    pub fn largest_free_gap(&self) -> usize {
        self.free_gaps().iter().map(|&(_, size)| size).max().unwrap_or(0)
    }
}

impl fmt::Display for SegmentationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, seg) in self.segments().into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", seg)?;
        }
        write!(f, "] free={}/{}", self.free_memory, self.total_memory)
    }
}

//! Drive an engine through a parsed trace and collect one status per step.

use std::fmt;

use crate::constants::PageId;
use crate::io::{SegmentCommand, TraceOp};
use crate::paging::PagingEngine;
use crate::segmentation::SegmentationEngine;
use crate::virtual_memory::VirtualMemoryEngine;

/// Outcome of one trace step, rendered as the status line the user sees
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    PageAccess { page: PageId, fault: bool, total_faults: u64 },
    VirtualAccess { vpage: PageId, fault: bool, total_faults: u64 },
    Allocated(String),
    AllocationFailed,
    Freed(String),
    NotFound,
    Reset,
}

impl Step {
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            Step::PageAccess { fault: true, .. } | Step::VirtualAccess { fault: true, .. }
        )
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = |fault: bool| if fault { "Page fault occurred." } else { "Page hit." };
        match self {
            Step::PageAccess { page, fault, total_faults } => write!(
                f,
                "Accessed page {}. {} Total faults: {}.",
                page,
                outcome(*fault),
                total_faults
            ),
            Step::VirtualAccess { vpage, fault, total_faults } => write!(
                f,
                "Accessed virtual page {}. {} Total faults: {}.",
                vpage,
                outcome(*fault),
                total_faults
            ),
            Step::Allocated(label) => write!(f, "Segment '{}' allocated.", label),
            Step::AllocationFailed => write!(f, "Allocation failed. Not enough memory."),
            Step::Freed(label) => write!(f, "Segment '{}' freed.", label),
            Step::NotFound => write!(f, "Segment not found."),
            Step::Reset => write!(f, "Reset done."),
        }
    }
}

/// Status lines for a run, identical whether printed or written to a file
pub fn status_lines(steps: &[Step]) -> Vec<String> {
    steps.iter().map(|step| step.to_string()).collect()
}

pub fn run_paging(engine: &mut PagingEngine, ops: &[TraceOp]) -> Vec<Step> {
    ops.iter()
        .map(|&op| match op {
            TraceOp::Access(page) => {
                let fault = engine.access(page);
                Step::PageAccess { page, fault, total_faults: engine.fault_count() }
            }
            TraceOp::Reset => {
                engine.reset();
                Step::Reset
            }
        })
        .collect()
}

pub fn run_virtual_memory(engine: &mut VirtualMemoryEngine, ops: &[TraceOp]) -> Vec<Step> {
    ops.iter()
        .map(|&op| match op {
            TraceOp::Access(vpage) => {
                let fault = engine.access(vpage);
                Step::VirtualAccess { vpage, fault, total_faults: engine.fault_count() }
            }
            TraceOp::Reset => {
                engine.reset();
                Step::Reset
            }
        })
        .collect()
}

pub fn run_segmentation(engine: &mut SegmentationEngine, commands: &[SegmentCommand]) -> Vec<Step> {
    commands
        .iter()
        .map(|command| match command {
            SegmentCommand::Alloc { size, label } => {
                if engine.allocate(*size, label) {
                    Step::Allocated(label.clone())
                } else {
                    Step::AllocationFailed
                }
            }
            SegmentCommand::Free(label) => {
                if engine.free(label) {
                    Step::Freed(label.clone())
                } else {
                    Step::NotFound
                }
            }
            SegmentCommand::Reset => {
                engine.reset();
                Step::Reset
            }
        })
        .collect()
}

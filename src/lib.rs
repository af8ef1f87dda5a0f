pub mod constants;
pub mod error;
pub mod io;
pub mod logging;
pub mod memory;
pub mod paging;
pub mod replacer;
pub mod segmentation;
pub mod session;
pub mod virtual_memory;

// Re-export commonly used items for convenience
pub use constants::PageId;
pub use error::{Result, SimError};
pub use paging::{PagingEngine, ReplacementPolicy};
pub use segmentation::{Segment, SegmentationEngine};
pub use virtual_memory::{AccessResult, VirtualMemoryEngine};

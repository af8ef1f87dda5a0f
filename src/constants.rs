use crate::paging::ReplacementPolicy;

/// Page identifiers are arbitrary signed integers.
pub type PageId = i64;

// defaults from the interactive front-end
pub const DEFAULT_PAGING_FRAMES: usize = 4;
pub const DEFAULT_POLICY: ReplacementPolicy = ReplacementPolicy::Fifo;
pub const DEFAULT_TOTAL_MEMORY: usize = 100;
pub const DEFAULT_VM_FRAMES: usize = 4;

/// How an empty frame slot is rendered
pub const EMPTY_SLOT: &str = "-";

/// Trace token that resets an engine mid-run
pub const RESET_TOKEN: &str = "reset";
pub const COMMENT_CHAR: char = '#';

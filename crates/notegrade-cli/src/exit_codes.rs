//! Process exit codes. Part of the CLI contract; scripts branch on them.

pub const SUCCESS: i32 = 0;
/// Run finished but is partial (hard cap) or some tasks failed.
pub const INCOMPLETE: i32 = 1;
/// Config could not be loaded or the input folder could not be read.
pub const CONFIG_ERROR: i32 = 2;
/// Input was malformed (duplicate ids, empty names); nothing was judged.
pub const BATCH_ABORTED: i32 = 3;

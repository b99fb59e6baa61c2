mod mover;
mod sortindex;

pub use mover::{
    move_matching, FailedEntry, MoveError, MoveOptions, MoveReport, MovedEntry, SkipReason,
    SkippedEntry, SortRange,
};
pub use sortindex::{extract_sort_index, manifest_sort_index, SortSource};

//! Send-window preparation: grouping, cost estimation, and selection.
//!
//! The full transcript is resent every turn, so each turn has to decide which
//! suffix of it fits the input budget. The pipeline is:
//!
//! 1. **[`group`]**: [`group_blocks`] partitions the transcript into atomic
//!    [`Group`]s. A tool-use message and the message carrying its results
//!    form one [`GroupKind::Pair`]; everything else is a singleton.
//!
//! 2. **[`cost`]**: a [`TokenCounter`] prices each group. The default
//!    [`HeuristicCounter`] counts characters plus a fixed per-block overhead.
//!
//! 3. **[`select`]**: [`prepare_send_window`] walks groups newest to oldest
//!    and keeps the longest trailing run that fits, reporting the outcome in
//!    [`WindowStats`].
//!
//! Everything here is pure computation over a borrowed slice: no I/O, no
//! shared state, nothing cached between calls.

pub mod cost;
pub mod group;
pub mod select;

pub use cost::{BLOCK_OVERHEAD, HeuristicCounter, TokenCounter};
pub use group::{Group, GroupKind, group_blocks};
pub use select::{WindowStats, prepare_send_window};

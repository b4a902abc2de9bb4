//! Convenience re-exports for common `send-window` types.
//!
//! ```ignore
//! use send_window::prelude::*;
//! ```
//!
//! Pulls in the transcript types, the window pipeline, and the per-turn
//! entry point. Telemetry and transcript I/O are left to their modules.

// ── Transcript types ────────────────────────────────────────────────
pub use crate::{Block, Message, Role, ToolResultContent};

// ── Window preparation ──────────────────────────────────────────────
pub use crate::window::{
    BLOCK_OVERHEAD, Group, GroupKind, HeuristicCounter, TokenCounter, WindowStats, group_blocks,
    prepare_send_window,
};

// ── Turn orchestration ──────────────────────────────────────────────
pub use crate::config::{TelemetryConfig, WindowConfig};
pub use crate::turn::{TurnPlan, plan_turn};

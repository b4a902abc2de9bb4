//! Pair-safe, budget-fitting send windows for LLM agent transcripts.
//!
//! An agent loop that keeps no server-side session state has to resend the
//! whole transcript every turn. Once the transcript outgrows the input budget,
//! something has to decide *which suffix* to send. `send-window` makes that
//! decision:
//!
//! - it never separates an assistant `tool_use` message from the user
//!   `tool_result` message that answers it,
//! - the selected suffix fits a caller-supplied token budget, and
//! - the decision is a pure function of the transcript, so it can be
//!   re-derived every turn without caching anything.
//!
//! # Getting started
//!
//! ```
//! use send_window::prelude::*;
//!
//! let conversation = vec![
//!     Message::user_text("old"),
//!     Message::assistant(vec![Block::tool_use("a", "read_file", serde_json::json!({}))]),
//!     Message::user(vec![Block::tool_result_text("a", "r")]),
//! ];
//!
//! let (window, stats) = prepare_send_window(&conversation, 10, &HeuristicCounter::new());
//! assert_eq!(window.len(), 2);
//! assert_eq!(stats.included_groups, 1);
//! assert!(!stats.over_budget_newest);
//! ```
//!
//! # Where to find things
//!
//! - **Transcript types:** [`Message`], [`Block`], [`ToolResultContent`] in this
//!   module. They serialize in the Anthropic Messages shape.
//! - **Window preparation:** [`window::group_blocks`] partitions a transcript
//!   into atomic groups, [`window::TokenCounter`] estimates their cost, and
//!   [`window::prepare_send_window`] picks the trailing run that fits.
//! - **Running a turn:** [`turn::plan_turn`] wires the window core to
//!   configuration, logging and the JSONL event sink, and turns the
//!   over-budget signal into an error.
//! - **Ambient pieces:** [`config`] (environment settings),
//!   [`telemetry`] (JSONL events), [`transcript`] (on-disk conversations).
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`window`] | Grouper, cost estimator, window selector |
//! | [`turn`] | Per-turn orchestration around the window core |
//! | [`config`] | `AGT_*` environment settings parsed into explicit structs |
//! | [`telemetry`] | JSONL event sink, turn IDs, local text features |
//! | [`transcript`] | Load and save conversations as JSON |

pub mod config;
pub mod prelude;
pub mod telemetry;
pub mod transcript;
pub mod turn;
pub mod window;

#[cfg(test)]
mod testing;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Message types ──────────────────────────────────────────────────

/// Author of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message in the conversation: a role plus an ordered list of blocks.
///
/// The window core only ever reads and slices messages; it never mutates them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    #[serde(rename = "content", default)]
    pub blocks: Vec<Block>,
}

impl Message {
    pub fn user(blocks: Vec<Block>) -> Self {
        Self {
            role: Role::User,
            blocks,
        }
    }

    pub fn assistant(blocks: Vec<Block>) -> Self {
        Self {
            role: Role::Assistant,
            blocks,
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![Block::text(text)])
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::assistant(vec![Block::text(text)])
    }

    /// IDs of every `tool_use` block in this message, in block order.
    pub fn tool_use_ids(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::ToolUse { id, .. } => Some(id.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of the top-level text blocks, newline separated.
    pub fn text(&self) -> String {
        let parts: Vec<&str> = self
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        parts.join("\n")
    }
}

// ── Content blocks ─────────────────────────────────────────────────

/// A typed content block.
///
/// Serialized with an internal `"type"` tag (`text`, `tool_use`,
/// `tool_result`). Any other block type (reasoning, images, ...) is kept as
/// [`Block::Opaque`] with its raw JSON so it survives a round trip untouched.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "Value", into = "Value")]
pub enum Block {
    Text {
        text: String,
    },
    /// A tool invocation authored by the assistant. `input` is opaque.
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    /// A tool result authored by the user, answering the `tool_use` with the
    /// same ID. `is_error` never affects pairing.
    ToolResult {
        tool_use_id: String,
        content: ToolResultContent,
        is_error: bool,
    },
    Opaque(Value),
}

impl Block {
    pub fn text(text: impl Into<String>) -> Self {
        Block::Text { text: text.into() }
    }

    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Block::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    pub fn tool_result(
        tool_use_id: impl Into<String>,
        content: ToolResultContent,
        is_error: bool,
    ) -> Self {
        Block::ToolResult {
            tool_use_id: tool_use_id.into(),
            content,
            is_error,
        }
    }

    /// A successful tool result with a plain string payload.
    pub fn tool_result_text(tool_use_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::tool_result(tool_use_id, ToolResultContent::Text(text.into()), false)
    }

    /// Wire name of the block type.
    pub fn kind(&self) -> &str {
        match self {
            Block::Text { .. } => "text",
            Block::ToolUse { .. } => "tool_use",
            Block::ToolResult { .. } => "tool_result",
            Block::Opaque(v) => v.get("type").and_then(Value::as_str).unwrap_or("unknown"),
        }
    }
}

/// Payload of a tool result.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum ToolResultContent {
    Text(String),
    Blocks(Vec<Block>),
    /// Any other JSON shape. Accepted, but only costed at block overhead.
    Other(Value),
}

impl Default for ToolResultContent {
    fn default() -> Self {
        ToolResultContent::Blocks(Vec::new())
    }
}

// Wire representation of the recognized block types.
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        #[serde(default)]
        content: ToolResultContent,
        #[serde(default, skip_serializing_if = "is_false")]
        is_error: bool,
    },
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl TryFrom<Value> for Block {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| "content block must be a JSON object with a string \"type\"".to_string())?;

        match kind.as_str() {
            "text" | "tool_use" | "tool_result" => {
                let wire: WireBlock = serde_json::from_value(value)
                    .map_err(|e| format!("invalid {kind} block: {e}"))?;
                Ok(match wire {
                    WireBlock::Text { text } => Block::Text { text },
                    WireBlock::ToolUse { id, name, input } => Block::ToolUse { id, name, input },
                    WireBlock::ToolResult {
                        tool_use_id,
                        content,
                        is_error,
                    } => Block::ToolResult {
                        tool_use_id,
                        content,
                        is_error,
                    },
                })
            }
            _ => Ok(Block::Opaque(value)),
        }
    }
}

impl From<Block> for Value {
    fn from(block: Block) -> Self {
        let wire = match block {
            Block::Opaque(v) => return v,
            Block::Text { text } => WireBlock::Text { text },
            Block::ToolUse { id, name, input } => WireBlock::ToolUse { id, name, input },
            Block::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => WireBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            },
        };
        // Serializing plain strings, bools and `Value`s cannot fail.
        serde_json::to_value(wire).unwrap_or(Value::Null)
    }
}

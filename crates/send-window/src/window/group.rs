//! Grouping: partition a transcript into atomic, budget-indivisible units.
//!
//! A group is either a single message or a validated pair: an assistant
//! message carrying `tool_use` blocks immediately followed by the user
//! message whose leading `tool_result` blocks answer exactly those IDs. The
//! endpoint rejects a `tool_use` without its result (and vice versa), so a
//! pair is never split by the window boundary.

use crate::{Block, Message, Role};
use std::collections::HashSet;
use std::ops::Range;

/// Whether a group is a lone message or a tool-use/tool-result pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Singleton,
    Pair,
}

/// A half-open span `[start, end)` of message indices.
///
/// Groups are views into the caller's transcript, never copies. They are
/// recomputed from scratch on every call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Group {
    pub kind: GroupKind,
    pub start: usize,
    pub end: usize,
}

impl Group {
    fn singleton(i: usize) -> Self {
        Self {
            kind: GroupKind::Singleton,
            start: i,
            end: i + 1,
        }
    }

    fn pair(i: usize) -> Self {
        Self {
            kind: GroupKind::Pair,
            start: i,
            end: i + 2,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Partition `messages` into contiguous, non-overlapping groups in order.
///
/// Single left-to-right scan. At each assistant message with tool uses, the
/// next message is tested as its answer; a valid answer yields a
/// [`GroupKind::Pair`], anything else falls back to singletons so no message
/// is ever dropped here.
pub fn group_blocks(messages: &[Message]) -> Vec<Group> {
    let mut groups = Vec::with_capacity(messages.len());
    let mut i = 0;

    while i < messages.len() {
        let paired = messages
            .get(i + 1)
            .is_some_and(|next| answers_tool_uses(&messages[i], next));

        if paired {
            groups.push(Group::pair(i));
            i += 2;
        } else {
            groups.push(Group::singleton(i));
            i += 1;
        }
    }

    groups
}

/// Collect the non-empty `tool_use` IDs of an assistant message.
fn tool_use_ids(msg: &Message) -> HashSet<&str> {
    if msg.role != Role::Assistant {
        return HashSet::new();
    }
    msg.tool_use_ids().filter(|id| !id.is_empty()).collect()
}

/// IDs answered by the leading run of `tool_result` blocks.
///
/// Returns `None` when a `tool_result` appears after any other block kind:
/// results must all come first. Blocks after the leading run are otherwise
/// ignored (e.g. accompanying text).
fn leading_result_ids(msg: &Message) -> Option<HashSet<&str>> {
    let mut ids = HashSet::new();
    let mut past_results = false;

    for block in &msg.blocks {
        match block {
            Block::ToolResult { tool_use_id, .. } => {
                if past_results {
                    return None;
                }
                if !tool_use_id.is_empty() {
                    ids.insert(tool_use_id.as_str());
                }
            }
            _ => past_results = true,
        }
    }

    Some(ids)
}

/// True when `next` is a user message whose leading results answer exactly
/// the tool uses in `msg`: no missing results and no unexplained extras.
fn answers_tool_uses(msg: &Message, next: &Message) -> bool {
    let uses = tool_use_ids(msg);
    if uses.is_empty() || next.role != Role::User {
        return false;
    }
    leading_result_ids(next).is_some_and(|results| results == uses)
}

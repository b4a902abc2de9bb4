//! Cost estimation for messages and groups.
//!
//! [`TokenCounter`] is the seam: the window selector only needs an integer
//! cost per group, so a real tokenizer can be swapped in without touching
//! grouping or selection. [`HeuristicCounter`] is the default. It needs no
//! tokenizer and no network, and counts raw characters rather than sub-word
//! tokens, so real usage should come in at or below the estimate.

use super::group::Group;
use crate::{Block, Message, ToolResultContent};
use tracing::warn;

/// Fixed per-block overhead, applied once to every block of every kind.
pub const BLOCK_OVERHEAD: usize = 4;

/// Estimates input-token cost for messages and groups.
///
/// Implementations must be pure: the same message always costs the same.
pub trait TokenCounter {
    fn count_message(&self, message: &Message) -> usize;

    /// Sum of [`count_message`](Self::count_message) over the group's range,
    /// saturating at `usize::MAX`. Indices past the end of `messages` are
    /// ignored.
    fn count_group(&self, group: &Group, messages: &[Message]) -> usize {
        let end = group.end.min(messages.len());
        messages.get(group.start..end).map_or(0, |span| {
            span.iter()
                .fold(0usize, |acc, m| acc.saturating_add(self.count_message(m)))
        })
    }
}

impl<T: TokenCounter + ?Sized> TokenCounter for &T {
    fn count_message(&self, message: &Message) -> usize {
        (**self).count_message(message)
    }
}

/// Deterministic character-count heuristic.
///
/// | Block | Cost |
/// |-------|------|
/// | text | chars + overhead |
/// | tool_result, string payload | chars + overhead |
/// | tool_result, nested blocks | chars of nested text blocks + overhead |
/// | tool_result, other payload | overhead (degraded estimate) |
/// | tool_use, opaque | overhead |
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicCounter {
    diagnostics: bool,
}

impl HeuristicCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a warning whenever an estimate is degraded by an unrecognized
    /// tool result payload.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    fn count_block(&self, block: &Block) -> usize {
        let body = match block {
            Block::Text { text } => char_len(text),
            Block::ToolResult {
                tool_use_id,
                content,
                ..
            } => match content {
                ToolResultContent::Text(s) => char_len(s),
                ToolResultContent::Blocks(nested) => nested
                    .iter()
                    .map(|b| match b {
                        Block::Text { text } => char_len(text),
                        _ => 0,
                    })
                    .sum(),
                ToolResultContent::Other(_) => {
                    if self.diagnostics {
                        warn!(
                            "cost estimate degraded: tool_result {tool_use_id} has an unrecognized payload shape"
                        );
                    }
                    0
                }
            },
            Block::ToolUse { .. } | Block::Opaque(_) => 0,
        };
        body + BLOCK_OVERHEAD
    }
}

impl TokenCounter for HeuristicCounter {
    fn count_message(&self, message: &Message) -> usize {
        message.blocks.iter().map(|b| self.count_block(b)).sum()
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::logged_during;
    use crate::window::group::GroupKind;
    use serde_json::json;
    use tracing::Level;

    fn overhead(h: &HeuristicCounter) -> usize {
        // An empty text block costs exactly the overhead.
        h.count_message(&Message::user_text(""))
    }

    fn odd_payload() -> Message {
        Message::user(vec![Block::tool_result(
            "t1",
            ToolResultContent::Other(json!({"rows": 1000})),
            false,
        )])
    }

    #[test]
    fn text_blocks_count_chars() {
        let h = HeuristicCounter::new();
        let msg = Message::user(vec![Block::text("hello"), Block::text("👍")]);
        assert_eq!(h.count_message(&msg), (5 + 1) + 2 * overhead(&h));
    }

    #[test]
    fn string_tool_result() {
        let h = HeuristicCounter::new();
        let msg = Message::user(vec![Block::tool_result_text("t1", "abcdef")]);
        assert_eq!(h.count_message(&msg), 6 + overhead(&h));
    }

    #[test]
    fn nested_tool_result_counts_text_only() {
        let h = HeuristicCounter::new();
        let nested = ToolResultContent::Blocks(vec![
            Block::text("hi"),
            Block::text("世界"),
            Block::Opaque(json!({"type": "image", "source": {"data": "aGVsbG8="}})),
        ]);
        let msg = Message::user(vec![Block::tool_result("t1", nested, false)]);
        assert_eq!(h.count_message(&msg), (2 + 2) + overhead(&h));
    }

    #[test]
    fn other_payload_costs_overhead_only() {
        let h = HeuristicCounter::new();
        assert_eq!(h.count_message(&odd_payload()), BLOCK_OVERHEAD);
    }

    #[test]
    fn diagnostics_warn_on_degraded_estimate() {
        let h = HeuristicCounter::new().with_diagnostics(true);
        let mut cost = 0;
        let warnings = logged_during(Level::WARN, || cost = h.count_message(&odd_payload()));

        assert_eq!(cost, BLOCK_OVERHEAD);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("tool_result t1"));
        assert!(warnings[0].contains("unrecognized payload shape"));
    }

    #[test]
    fn no_warning_without_diagnostics() {
        let h = HeuristicCounter::new();
        let warnings = logged_during(Level::WARN, || {
            h.count_message(&odd_payload());
            h.count_message(&Message::user_text("plain"));
        });
        assert!(warnings.is_empty());

        let h = h.with_diagnostics(true);
        let warnings = logged_during(Level::WARN, || {
            h.count_message(&Message::user(vec![Block::tool_result_text("t1", "ok")]));
        });
        assert!(warnings.is_empty());
    }

    #[test]
    fn count_group_saturates() {
        struct Max;
        impl TokenCounter for Max {
            fn count_message(&self, _: &Message) -> usize {
                usize::MAX
            }
        }

        let msgs = vec![Message::user_text("a"), Message::user_text("b")];
        let g = Group {
            kind: GroupKind::Pair,
            start: 0,
            end: 2,
        };
        assert_eq!(Max.count_group(&g, &msgs), usize::MAX);
    }

    #[test]
    fn tool_use_and_opaque_cost_overhead() {
        let h = HeuristicCounter::new();
        let msg = Message::assistant(vec![
            Block::tool_use("t1", "read_file", json!({"path": "a very long path indeed"})),
            Block::Opaque(json!({"type": "thinking", "thinking": "lots of words"})),
        ]);
        assert_eq!(h.count_message(&msg), 2 * BLOCK_OVERHEAD);
    }

    #[test]
    fn empty_message_is_free() {
        let h = HeuristicCounter::new();
        assert_eq!(h.count_message(&Message::user(vec![])), 0);
    }

    #[test]
    fn count_group_sums_messages() {
        let h = HeuristicCounter::new();
        let msgs = vec![
            Message::user_text("a"),
            Message::assistant(vec![Block::text("b"), Block::text("c")]),
            Message::user(vec![Block::tool_result_text("t1", "xyz")]),
        ];
        let total: usize = (0..3)
            .map(|i| {
                let g = Group {
                    kind: GroupKind::Singleton,
                    start: i,
                    end: i + 1,
                };
                h.count_group(&g, &msgs)
            })
            .sum();

        let k = overhead(&h);
        assert_eq!(total, (1 + k) + (1 + 1 + 2 * k) + (3 + k));

        let all = Group {
            kind: GroupKind::Pair,
            start: 1,
            end: 3,
        };
        assert_eq!(
            h.count_group(&all, &msgs),
            h.count_message(&msgs[1]) + h.count_message(&msgs[2])
        );
    }

    #[test]
    fn count_group_clamps_out_of_range() {
        let h = HeuristicCounter::new();
        let msgs = vec![Message::user_text("abc")];
        let g = Group {
            kind: GroupKind::Pair,
            start: 0,
            end: 2,
        };
        assert_eq!(h.count_group(&g, &msgs), 3 + BLOCK_OVERHEAD);

        let past = Group {
            kind: GroupKind::Singleton,
            start: 5,
            end: 6,
        };
        assert_eq!(h.count_group(&past, &msgs), 0);
    }

    #[test]
    fn estimates_are_deterministic() {
        let h = HeuristicCounter::new();
        let msg = Message::user(vec![Block::text("same"), Block::tool_result_text("t", "input")]);
        assert_eq!(h.count_message(&msg), h.count_message(&msg.clone()));
    }
}

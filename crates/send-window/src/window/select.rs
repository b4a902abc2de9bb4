//! Window selection: the longest budget-fitting trailing run of whole groups.

use super::cost::TokenCounter;
use super::group::group_blocks;
use crate::Message;
use serde::Serialize;

/// Outcome of one [`prepare_send_window`] call, for logging and decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WindowStats {
    /// Estimated cost of the returned window.
    pub total: usize,
    /// Budget the call was made with.
    pub budget: usize,
    pub included_groups: usize,
    pub skipped_groups: usize,
    /// The newest group alone exceeds the budget (or the budget is zero), so
    /// the window is empty. Callers should abort the turn.
    pub over_budget_newest: bool,
}

impl WindowStats {
    /// Format as a short log-friendly string.
    pub fn to_log_string(&self) -> String {
        format!(
            "window: budget={} est_total={} groups_in={} groups_skip={} newest_over={}",
            self.budget,
            self.total,
            self.included_groups,
            self.skipped_groups,
            self.over_budget_newest,
        )
    }
}

/// Select the suffix of `messages` to send under `budget`.
///
/// Groups are scanned newest to oldest and included while the running total
/// stays `<= budget`; the first group that does not fit stops the scan. The
/// returned window borrows `messages`, keeps original order, and always starts
/// on a group boundary.
///
/// A zero budget, or a newest group that alone exceeds the budget, yields an
/// empty window with [`WindowStats::over_budget_newest`] set. The newest turn
/// is never truncated at block level since that would break tool pairing.
pub fn prepare_send_window<'a, C>(
    messages: &'a [Message],
    budget: usize,
    counter: &C,
) -> (&'a [Message], WindowStats)
where
    C: TokenCounter + ?Sized,
{
    let empty = &messages[messages.len()..];

    if messages.is_empty() {
        return (
            empty,
            WindowStats {
                budget,
                ..Default::default()
            },
        );
    }

    let groups = group_blocks(messages);

    if budget == 0 {
        return (empty, over_budget(budget, groups.len()));
    }

    let costs: Vec<usize> = groups
        .iter()
        .map(|g| counter.count_group(g, messages))
        .collect();

    let mut total: usize = 0;
    let mut included = 0;
    let mut start = messages.len();

    for (group, &cost) in groups.iter().zip(&costs).rev() {
        if included == 0 && cost > budget {
            return (empty, over_budget(budget, groups.len()));
        }
        let Some(next) = total.checked_add(cost).filter(|&t| t <= budget) else {
            break;
        };
        total = next;
        included += 1;
        start = group.start;
    }

    (
        &messages[start..],
        WindowStats {
            total,
            budget,
            included_groups: included,
            skipped_groups: groups.len() - included,
            over_budget_newest: false,
        },
    )
}

fn over_budget(budget: usize, groups: usize) -> WindowStats {
    WindowStats {
        total: 0,
        budget,
        included_groups: 0,
        skipped_groups: groups,
        over_budget_newest: groups > 0,
    }
}

//! Per-turn orchestration around the window core.
//!
//! [`plan_turn`] is what an agent loop calls before each request: it prepares
//! the send window, records the outcome (tracing + `window_prepared` event),
//! and refuses to proceed when even the newest group does not fit.

use crate::Message;
use crate::config::{TelemetryConfig, WindowConfig};
use crate::telemetry::{EventSink, generate_turn_id};
use crate::window::{TokenCounter, WindowStats, prepare_send_window};
use serde_json::json;
use tracing::{debug, info};

/// Error returned when the newest group alone exceeds the budget.
pub const OVER_BUDGET_ERROR: &str = "windowing: newest group exceeds AGT_TOKEN_BUDGET; \
     increase budget with headroom or tighten tool caps";

/// What to send this turn.
#[derive(Debug)]
pub struct TurnPlan<'a> {
    pub turn_id: String,
    /// Trailing slice of the conversation to transmit.
    pub window: &'a [Message],
    pub stats: WindowStats,
    /// Whether tool definitions go out with the request. Calibration runs
    /// send none.
    pub include_tools: bool,
}

/// Prepare the window for one turn over `conversation`.
///
/// Returns `Err` when the window would be empty because the newest group is
/// over budget. That means the budget is too low or tool output caps are not
/// applied, and sending a truncated request would be worse than failing.
pub fn plan_turn<'a, C>(
    conversation: &'a [Message],
    model: &str,
    config: &WindowConfig,
    telemetry: &TelemetryConfig,
    sink: &EventSink,
    counter: &C,
) -> Result<TurnPlan<'a>, String>
where
    C: TokenCounter + ?Sized,
{
    let turn_id = generate_turn_id();
    let (window, stats) = prepare_send_window(conversation, config.budget, counter);

    sink.emit(
        "window_prepared",
        json!({
            "turn_id": turn_id,
            "model": model,
            "budget": stats.budget,
            "total_estimated": stats.total,
            "included_groups": stats.included_groups,
            "skipped_groups": stats.skipped_groups,
            "over_budget_newest": stats.over_budget_newest,
        }),
    );

    if config.verbose {
        info!("[{turn_id}] model={model} {}", stats.to_log_string());
    } else {
        debug!("[{turn_id}] model={model} {}", stats.to_log_string());
    }

    if stats.over_budget_newest {
        return Err(OVER_BUDGET_ERROR.to_string());
    }

    Ok(TurnPlan {
        turn_id,
        window,
        stats,
        include_tools: !telemetry.calibration,
    })
}

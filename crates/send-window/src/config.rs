//! Environment configuration, read once and passed around explicitly.
//!
//! Settings come from `AGT_*` environment variables. Nothing here is global:
//! the binary calls [`WindowConfig::from_env`] / [`TelemetryConfig::from_env`]
//! at startup and hands the structs to [`plan_turn`](crate::turn::plan_turn).
//! Tests use the `from_lookup` constructors with a closure instead of
//! touching the process environment.

use std::path::PathBuf;

pub const TOKEN_BUDGET_VAR: &str = "AGT_TOKEN_BUDGET";
pub const VERBOSE_WINDOW_LOGS_VAR: &str = "AGT_VERBOSE_WINDOW_LOGS";
pub const CALIBRATION_MODE_VAR: &str = "AGT_CALIBRATION_MODE";
pub const OBSERVE_JSON_VAR: &str = "AGT_OBSERVE_JSON";
pub const PERSIST_PAYLOADS_VAR: &str = "AGT_PERSIST_API_PAYLOADS";
pub const ARTIFACTS_DIR_VAR: &str = "AGT_ARTIFACTS_DIR";

/// Artifacts directory used when `AGT_ARTIFACTS_DIR` is unset or blank.
pub const DEFAULT_ARTIFACTS_DIR: &str = ".agent";

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

// ── Window ─────────────────────────────────────────────────────────

/// Budget and diagnostics for send-window preparation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    /// Token ceiling for the transmitted window (`AGT_TOKEN_BUDGET`, required).
    pub budget: usize,
    /// Log the window stats line at info level and warn on degraded cost
    /// estimates (`AGT_VERBOSE_WINDOW_LOGS=1`). Default: `false`.
    pub verbose: bool,
}

impl WindowConfig {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(env_lookup)
    }

    /// Like [`from_env`](Self::from_env), but a `budget` given on the command
    /// line takes the place of `AGT_TOKEN_BUDGET`.
    pub fn from_env_with_budget(budget: Option<usize>) -> Result<Self, String> {
        Self::from_lookup_with_budget(budget, env_lookup)
    }

    pub fn from_lookup_with_budget(
        budget: Option<usize>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        Self::from_lookup(|key| match budget {
            Some(b) if key == TOKEN_BUDGET_VAR => Some(b.to_string()),
            _ => lookup(key),
        })
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value (`None` when unset).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let raw = lookup(TOKEN_BUDGET_VAR)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| format!("{TOKEN_BUDGET_VAR} not set; export it then try again"))?;
        let budget = parse_budget(&raw)?;

        Ok(Self {
            budget,
            verbose: lookup(VERBOSE_WINDOW_LOGS_VAR).as_deref() == Some("1"),
        })
    }
}

/// Parse a token budget. Negative values are rejected rather than clamped.
pub fn parse_budget(raw: &str) -> Result<usize, String> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid {TOKEN_BUDGET_VAR} {raw:?}: {e}"))
}

// ── Telemetry ──────────────────────────────────────────────────────

/// Switches for the JSONL event sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Calibration mode: requests are sent without tool definitions and the
    /// defaults of the two switches below flip on (`AGT_CALIBRATION_MODE=1`).
    pub calibration: bool,
    /// Append events to `events.jsonl` (`AGT_OBSERVE_JSON`).
    /// Default: same as `calibration`.
    pub observe: bool,
    /// Persist request/response payloads (`AGT_PERSIST_API_PAYLOADS`).
    /// Default: same as `calibration`.
    pub persist_payloads: bool,
    /// Where artifacts are written (`AGT_ARTIFACTS_DIR`). Default: `.agent`.
    pub artifacts_dir: PathBuf,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            calibration: false,
            observe: false,
            persist_payloads: false,
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
        }
    }
}

impl TelemetryConfig {
    /// Telemetry fully disabled.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Observation enabled, writing under `dir`.
    pub fn observing(dir: impl Into<PathBuf>) -> Self {
        Self {
            observe: true,
            artifacts_dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    /// Explicit `1`/`0` values win; anything else falls back to the
    /// calibration default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let calibration = lookup(CALIBRATION_MODE_VAR).as_deref() == Some("1");
        let switch = |key: &str| match lookup(key).as_deref() {
            Some("1") => true,
            Some("0") => false,
            _ => calibration,
        };

        let artifacts_dir = lookup(ARTIFACTS_DIR_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ARTIFACTS_DIR.to_string());

        Self {
            calibration,
            observe: switch(OBSERVE_JSON_VAR),
            persist_payloads: switch(PERSIST_PAYLOADS_VAR),
            artifacts_dir: PathBuf::from(artifacts_dir),
        }
    }
}

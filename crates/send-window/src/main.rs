//! Prepare the send window for a stored conversation and report what fits.
//!
//! Reads the token budget from `AGT_TOKEN_BUDGET` unless `--budget` is given.
//! Telemetry follows the `AGT_*` switches described in
//! [`send_window::config`].
//!
//! # Examples
//!
//! ```sh
//! # Window stats for ./conversation.json
//! AGT_TOKEN_BUDGET=8000 send-window
//!
//! # Append this turn's input, show each group, and save the window
//! send-window --budget 8000 --user "Now fix the test" --groups \
//!   --output window.json
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use send_window::Message;
use send_window::config::{TelemetryConfig, WindowConfig};
use send_window::telemetry::EventSink;
use send_window::transcript::{load_transcript, save_transcript};
use send_window::turn::plan_turn;
use send_window::window::{GroupKind, HeuristicCounter, TokenCounter, group_blocks};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Subdirectory of the artifacts dir holding per-turn request windows.
const PAYLOADS_DIR: &str = "payloads";

/// Prepare the send window for a stored conversation and report what fits.
#[derive(Parser)]
#[command(name = "send-window")]
struct Cli {
    /// Conversation file (JSON array of messages)
    #[arg(long, default_value = "conversation.json")]
    transcript: PathBuf,

    /// Token budget for the window (overrides AGT_TOKEN_BUDGET)
    #[arg(long)]
    budget: Option<usize>,

    /// Model label recorded with telemetry
    #[arg(long, default_value = "claude-sonnet-4")]
    model: String,

    /// User input for this turn, appended before windowing
    #[arg(long)]
    user: Option<String>,

    /// Print every group with its kind, message range and estimated cost
    #[arg(long)]
    groups: bool,

    /// Save the selected window as a conversation file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Debug logging and degraded-estimate warnings
    #[arg(long)]
    verbose: bool,
}

fn window_config(cli: &Cli) -> Result<WindowConfig, String> {
    let config = WindowConfig::from_env_with_budget(cli.budget)?;
    Ok(if cli.verbose {
        config.with_verbose(true)
    } else {
        config
    })
}

fn describe_groups(conversation: &[Message], counter: &HeuristicCounter) -> String {
    let mut out = String::new();
    for (i, group) in group_blocks(conversation).iter().enumerate() {
        let kind = match group.kind {
            GroupKind::Singleton => "single",
            GroupKind::Pair => "pair",
        };
        let roles: Vec<String> = conversation[group.range()]
            .iter()
            .map(|m| m.role.to_string())
            .collect();
        out.push_str(&format!(
            "  G{i:<3} {kind:<6} [{}, {})  cost={:<6} {}\n",
            group.start,
            group.end,
            counter.count_group(group, conversation),
            roles.join("+"),
        ));
    }
    out
}

fn run(cli: &Cli) -> Result<String, String> {
    let config = window_config(cli)?;
    let telemetry = TelemetryConfig::from_env();
    let sink = EventSink::new(&telemetry);
    let counter = HeuristicCounter::new().with_diagnostics(config.verbose);

    let mut conversation = load_transcript(&cli.transcript)?;
    if let Some(user) = &cli.user {
        conversation.push(Message::user_text(user));
    }

    let mut report = String::new();
    if cli.groups {
        report.push_str(&format!("groups ({} messages):\n", conversation.len()));
        report.push_str(&describe_groups(&conversation, &counter));
    }

    let plan = plan_turn(
        &conversation,
        &cli.model,
        &config,
        &telemetry,
        &sink,
        &counter,
    )?;

    if let Some(user) = &cli.user {
        sink.emit_local_features(&plan.turn_id, user);
    }

    if let Some(path) = &cli.output {
        save_transcript(path, plan.window)?;
    }
    if telemetry.persist_payloads {
        let path = telemetry
            .artifacts_dir
            .join(PAYLOADS_DIR)
            .join(format!("{}.json", plan.turn_id));
        save_transcript(&path, plan.window)?;
    }

    let first = conversation.len() - plan.window.len();
    report.push_str(&format!(
        "{}\nturn={} messages=[{first}, {}) tools={}\n",
        plan.stats.to_log_string(),
        plan.turn_id,
        conversation.len(),
        if plan.include_tools { "on" } else { "off" },
    ));
    Ok(report)
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(level)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&cli) {
        Ok(report) => print!("{report}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

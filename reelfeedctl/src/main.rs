//! `reelfeedctl`: inspect candidate selection for a feed file and replay
//! recorded scroll traces against simulated players.

mod sim;
mod trace;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use reelfeed_core::{
    CoordinatorConfig, CoordinatorSnapshot, FeedCoordinator, FixedHeightLayout,
    locate_candidate,
};
use reelfeed_model::{FeedItem, ViewportWindow};
use serde::Serialize;
use tokio::time::{Instant, sleep, sleep_until};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::sim::{CallRecorder, LoggedCall};
use crate::trace::{TraceEvent, load_feed, load_trace};

/// Grace period after the last trace event before the final snapshot.
const SETTLE_MARGIN: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "reelfeedctl", version)]
#[command(about = "Inspect and replay scroll-driven feed playback")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lay out a feed and print the playback candidate at a scroll offset
    Locate(LocateArgs),
    /// Replay a timestamped scroll trace against simulated players
    Replay(ReplayArgs),
}

#[derive(ClapArgs, Debug)]
struct LocateArgs {
    /// Feed file: JSON array of entries in display order
    #[arg(long)]
    feed: PathBuf,

    /// Scroll offset of the viewport top, in content pixels
    #[arg(long, allow_negative_numbers = true)]
    offset: f32,

    /// Viewport height (overrides config)
    #[arg(long)]
    viewport_height: Option<f32>,

    /// Coordinator config file (TOML or JSON); defaults to $REELFEED_CONFIG_PATH, then ./reelfeed.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct ReplayArgs {
    /// Feed file: JSON array of entries in display order
    #[arg(long)]
    feed: PathBuf,

    /// Trace file: JSON array of timed scroll/resize/mount/unmount events
    #[arg(long)]
    trace: PathBuf,

    /// Coordinator config file (TOML or JSON); defaults to $REELFEED_CONFIG_PATH, then ./reelfeed.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Debounce quiet window, e.g. "150ms" (overrides config)
    #[arg(long, value_parser = humantime::parse_duration)]
    debounce: Option<Duration>,
}

#[derive(Debug, Serialize)]
struct LocateReport {
    viewport: ViewportWindow,
    candidate: Option<reelfeed_core::Candidate>,
    items: Vec<FeedItem>,
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    snapshot: CoordinatorSnapshot,
    calls: Vec<LoggedCall>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the JSON report; logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,reelfeed=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Locate(args) => run_locate(args),
        Command::Replay(args) => run_replay(args).await,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CoordinatorConfig> {
    match path {
        Some(path) => CoordinatorConfig::load_from_file(path),
        None => {
            let (config, source) = CoordinatorConfig::load_from_env()?;
            info!(?source, "coordinator config loaded");
            Ok(config)
        }
    }
}

fn run_locate(args: LocateArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let entries = load_feed(&args.feed)?;
    let items = FixedHeightLayout::new(config.layout.clone())
        .place(entries)
        .context("feed layout failed")?;

    let height = args.viewport_height.unwrap_or(config.viewport_height);
    let viewport = ViewportWindow::new(args.offset.max(0.0), height);
    let candidate = locate_candidate(&items, &viewport);

    print_json(&LocateReport {
        viewport,
        candidate,
        items,
    })
}

async fn run_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(debounce) = args.debounce {
        config.debounce_window_ms = debounce.as_millis().max(1) as u64;
    }
    let quiet_window = config.debounce_window();
    let entries = load_feed(&args.feed)?;
    let events = load_trace(&args.trace)?;

    let coordinator = FeedCoordinator::new(config)
        .spawn()
        .context("failed to start coordinator")?;
    let started = Instant::now();
    let recorder = CallRecorder::new(started);

    let items = coordinator
        .layout()
        .place(entries)
        .context("feed layout failed")?;
    for item in &items {
        if let Some(handle) = recorder.handle_for(&item.id, item.kind) {
            coordinator.register_handle(item.id.clone(), handle).await?;
        }
    }
    coordinator.set_feed(items.clone()).await?;

    for timed in &events {
        sleep_until(started + Duration::from_millis(timed.at_ms)).await;
        match &timed.event {
            TraceEvent::Scroll { offset } => coordinator.on_scroll(*offset).await?,
            TraceEvent::Resize { height } => {
                coordinator.resize_viewport(*height).await?
            }
            TraceEvent::Mount { id } => {
                let kind = items
                    .iter()
                    .find(|item| &item.id == id)
                    .map(|item| item.kind)
                    .with_context(|| format!("trace mounts unknown item {id}"))?;
                if let Some(handle) = recorder.handle_for(id, kind) {
                    coordinator.register_handle(id.clone(), handle).await?;
                }
            }
            TraceEvent::Unmount { id } => {
                coordinator.unregister_handle(id).await;
            }
        }
    }

    sleep(quiet_window + SETTLE_MARGIN).await;
    let snapshot = coordinator.snapshot().await?;
    coordinator.shutdown().await?;

    print_json(&ReplayReport {
        snapshot,
        calls: recorder.calls(),
    })
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value)
        .context("failed to encode report")?;
    println!("{out}");
    Ok(())
}

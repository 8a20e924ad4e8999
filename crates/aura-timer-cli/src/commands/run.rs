use std::rc::Rc;
use std::time::Duration;

use aura_timer_core::{
    Capabilities, ClockEngine, Config, HeadlessPlatform, HttpDurationParser, PipCoordinator,
    QueryOutcome, WidgetController,
};
use clap::Args;
use tokio::sync::mpsc;

#[derive(Args)]
pub struct RunArgs {
    /// Duration in minutes (defaults to timer.default_minutes)
    #[arg(long, conflicts_with = "seconds")]
    minutes: Option<u32>,
    /// Duration in seconds
    #[arg(long)]
    seconds: Option<u32>,
    /// Resolve the duration from free text first
    #[arg(long, conflicts_with_all = ["minutes", "seconds"])]
    query: Option<String>,
    /// Mirror the timer into an out-of-window surface
    #[arg(long)]
    pip: bool,
    /// Force the canvas-stream fallback for --pip
    #[arg(long, requires = "pip")]
    fallback: bool,
    /// Stop after this many seconds
    #[arg(long = "for", value_name = "SECS")]
    run_for: Option<u64>,
    /// Also print every timer event as a JSON line, opening with a state snapshot
    #[arg(long)]
    events: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    super::runtime()?.block_on(run_loop(args, config))
}

async fn run_loop(args: RunArgs, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let total = args
        .seconds
        .or(args.minutes.map(|m| m.saturating_mul(60)))
        .unwrap_or_else(|| config.timer.default_seconds());

    tracing::debug!(total, pip = args.pip, fallback = args.fallback, "starting countdown");

    let capabilities = if args.fallback {
        Capabilities::VIDEO_ONLY
    } else {
        Capabilities::ALL
    };
    let platform = HeadlessPlatform::new(capabilities);
    let pip = PipCoordinator::new(Rc::new(platform.clone()))
        .with_surface_sizes(config.pip.surface_sizes());
    let parser = HttpDurationParser::from_config(&config.duration_service)?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut controller = WidgetController::new(ClockEngine::with_system_clock(total), pip, parser)
        .with_tick_interval(Duration::from_millis(config.timer.tick_interval_ms));
    if args.events {
        controller = controller.with_event_sink(event_tx);
    }

    if let Some(text) = &args.query {
        match controller.set_from_external_query(text).await {
            QueryOutcome::Applied(seconds) => eprintln!("duration set to {seconds}s"),
            QueryOutcome::CouldNotInterpret => {
                return Err(format!("could not interpret: {text}").into())
            }
        }
    }

    if args.pip {
        controller.toggle_pip().await?;
    }
    controller.toggle();

    let mut snapshots = controller.subscribe();
    let printer = async move {
        let first = snapshots.borrow_and_update().clone();
        println!("{}  {}", first.clock_text(), first.status);
        loop {
            tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snap = snapshots.borrow_and_update().clone();
                    println!("{}  {}", snap.clock_text(), snap.status);
                }
                Some(event) = event_rx.recv() => {
                    if let Ok(line) = serde_json::to_string(&event) {
                        println!("{line}");
                    }
                }
            }
        }
    };

    let run_for = args.run_for;
    let shutdown = async move {
        match run_for {
            Some(secs) => {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            None => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    };

    tokio::select! {
        _ = controller.run(shutdown) => {}
        _ = printer => {}
    }

    if args.pip {
        eprintln!(
            "surface: {} scene patches, {} frames presented",
            platform.patch_batches(),
            platform.frames_presented()
        );
    }
    Ok(())
}

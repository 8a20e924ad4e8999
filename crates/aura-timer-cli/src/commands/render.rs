use aura_timer_core::render::{render_frame, RecordingSurface, Size};
use aura_timer_core::{TimerState, TimerStatus};
use clap::{Args, ValueEnum};
use serde_json::json;

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Idle,
    Running,
    Paused,
}

impl From<StatusArg> for TimerStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Idle => TimerStatus::Idle,
            StatusArg::Running => TimerStatus::Running,
            StatusArg::Paused => TimerStatus::Paused,
        }
    }
}

#[derive(Args)]
pub struct RenderArgs {
    /// Remaining seconds; negative for overtime
    #[arg(long, allow_negative_numbers = true)]
    seconds: i64,
    /// Configured total in seconds (defaults to |seconds|)
    #[arg(long)]
    total: Option<u32>,
    #[arg(long, value_enum, default_value = "running")]
    status: StatusArg,
    #[arg(long, default_value = "600")]
    width: u32,
    #[arg(long, default_value = "340")]
    height: u32,
}

pub fn run(args: RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let total = match args.total {
        Some(total) => total,
        None => u32::try_from(args.seconds.unsigned_abs())?,
    };
    let state = TimerState {
        total_seconds: total,
        remaining_seconds: args.seconds,
        status: args.status.into(),
        expiry_ms: None,
    };
    let snapshot = state.snapshot();

    let size = Size::new(args.width, args.height);
    let mut surface = RecordingSurface::new(size);
    render_frame(&mut surface, size, &snapshot);

    let out = json!({
        "size": { "width": size.width, "height": size.height },
        "text": snapshot.clock_text(),
        "snapshot": snapshot,
        "ops": surface.ops(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

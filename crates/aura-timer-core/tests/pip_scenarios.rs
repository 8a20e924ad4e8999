//! End-to-end scenarios for the out-of-window subsystem and the widget
//! controller, driven through the headless platform.

use std::rc::Rc;
use std::time::Duration;

use aura_timer_core::duration::{DurationAnswer, DurationParser};
use aura_timer_core::error::DurationServiceError;
use aura_timer_core::pip::{Control, HostStyleSheet, StyleInjection};
use aura_timer_core::{
    Capabilities, ClockEngine, HeadlessPlatform, HttpDurationParser, ManualClock, PipCoordinator,
    PipError, PipToggle, QueryOutcome, StrategyKind, TimerStatus, WidgetController,
};

/// Stands in for the duration service.
struct Answer(i64);

impl DurationParser for Answer {
    async fn parse_duration(&self, _text: &str) -> Result<DurationAnswer, DurationServiceError> {
        Ok(DurationAnswer::from_raw(Some(self.0)))
    }
}

fn widget<D: DurationParser>(
    platform: &HeadlessPlatform,
    parser: D,
) -> (WidgetController<HeadlessPlatform, D, ManualClock>, ManualClock) {
    let clock = ManualClock::new(1_700_000_000_000);
    let engine = ClockEngine::new(clock.clone(), 900);
    let pip = PipCoordinator::new(Rc::new(platform.clone()));
    (WidgetController::new(engine, pip, parser), clock)
}

#[tokio::test]
async fn test_canvas_only_platform_toggles_session() {
    let platform = HeadlessPlatform::new(Capabilities::VIDEO_ONLY);
    let (mut w, _) = widget(&platform, Answer(60));

    let opened = w.toggle_pip().await.unwrap();
    assert!(matches!(opened, PipToggle::Opened(ref s) if s.strategy == StrategyKind::CanvasStream));
    assert!(w.pip_active());
    assert!(platform.audio_playing());

    let closed = w.toggle_pip().await.unwrap();
    assert!(matches!(closed, PipToggle::Closed(_)));
    assert!(!w.pip_active());
    assert!(!platform.audio_playing());
    assert!(platform.tracks_stopped());
}

#[tokio::test]
async fn test_no_capability_rejects_without_audio() {
    let platform = HeadlessPlatform::new(Capabilities::NONE);
    let (mut w, _) = widget(&platform, Answer(60));

    let err = w.toggle_pip().await.unwrap_err();
    assert!(matches!(err, PipError::CapabilityUnavailable));
    assert!(!w.pip_active());
    assert_eq!(platform.audio_play_count(), 0);
}

#[tokio::test]
async fn test_zero_answer_could_not_interpret() {
    let platform = HeadlessPlatform::new(Capabilities::NONE);
    let (mut w, _) = widget(&platform, Answer(0));
    let before = w.engine().state().clone();

    assert_eq!(
        w.set_from_external_query("make it snappy").await,
        QueryOutcome::CouldNotInterpret
    );
    assert_eq!(w.engine().state(), &before);
}

#[tokio::test]
async fn test_unreachable_service_could_not_interpret() {
    let platform = HeadlessPlatform::new(Capabilities::NONE);
    // Nothing listens on port 9 of loopback.
    let parser = HttpDurationParser::new("http://127.0.0.1:9/api/gemini", Duration::from_secs(2))
        .unwrap();
    let (mut w, _) = widget(&platform, parser);
    let before = w.engine().state().clone();

    assert_eq!(
        w.set_from_external_query("ten minutes").await,
        QueryOutcome::CouldNotInterpret
    );
    assert_eq!(w.engine().state(), &before);
}

#[tokio::test]
async fn test_detached_window_follows_the_clock_into_overtime() {
    let sheets = vec![
        HostStyleSheet {
            href: None,
            media: String::new(),
            rules: Some(vec![".digits{font-variant-numeric:tabular-nums}".into()]),
        },
        HostStyleSheet {
            href: Some("https://fonts.example/inter.css".into()),
            media: "all".into(),
            rules: None,
        },
    ];
    let platform = HeadlessPlatform::new(Capabilities::ALL).with_style_sheets(sheets);
    let (mut w, clock) = widget(&platform, Answer(60));
    w.set_duration(5);
    w.toggle_pip().await.unwrap();
    assert_eq!(platform.injected_styles().len(), 2);
    assert!(matches!(platform.injected_styles()[1], StyleInjection::Linked { .. }));

    platform.press(Control::Toggle);
    w.tick();
    assert_eq!(w.snapshot().status, TimerStatus::Running);

    clock.advance_secs(7);
    w.tick();
    let scene = platform.scene().unwrap();
    assert!(scene.negative);
    assert_eq!(scene.parts, vec!["00", "02"]);

    // An hour into overtime the layout gains an hours group.
    let mounts = platform.mount_count();
    clock.advance_secs(3600);
    w.tick();
    assert_eq!(platform.mount_count(), mounts + 1);
    assert_eq!(platform.scene().unwrap().parts.len(), 3);
}

#[tokio::test]
async fn test_user_dismissal_then_reopen() {
    let platform = HeadlessPlatform::new(Capabilities::ALL);
    let (mut w, _) = widget(&platform, Answer(60));

    let first = w.toggle_pip().await.unwrap();
    platform.dismiss();
    w.tick();
    assert!(!w.pip_active());
    assert!(!platform.audio_playing());

    let second = w.toggle_pip().await.unwrap();
    let (PipToggle::Opened(a), PipToggle::Opened(b)) = (first, second) else {
        panic!("expected two openings");
    };
    assert_ne!(a.id, b.id);
    assert!(w.pip_active());
    assert_eq!(platform.audio_play_count(), 2);
}

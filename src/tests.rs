//! Unit tests for the `richsync-replay` entrypoint module.

use super::{mount_controller, run_step, Cli, Script, Step};
use clap::Parser;
use richsync::recording::{RecordingHost, RecordingSurface};
use richsync::{EngineConfig, EventOutcome, HostProps, NativeEvent, Platform};

#[test]
fn cli_parses_platform_and_pretty() {
    let cli = Cli::parse_from(["richsync-replay", "script.json", "--platform", "ios", "--pretty"]);
    assert_eq!(cli.platform, Some(Platform::Ios));
    assert!(cli.pretty);
    assert_eq!(cli.script.to_str(), Some("script.json"));
}

#[test]
fn cli_rejects_unknown_platform() {
    assert!(Cli::try_parse_from(["richsync-replay", "s.json", "--platform", "web"]).is_err());
}

#[test]
fn script_steps_deserialize() {
    let script: Script = serde_json::from_str(
        r#"{
            "props": { "value": "<strong>a</strong>", "is_selected": true },
            "steps": [
                { "native": { "type": "focus" } },
                { "insert_text": "b" },
                { "paste": { "plain_text": "https://example.com" } },
                { "key": { "key_code": 8, "event_counter": 3 } },
                { "apply_format": { "type": "core/italic" } },
                { "remove_format": "core/bold" },
                { "tick_ms": 600 }
            ]
        }"#,
    )
    .expect("script");

    assert!(script.config.is_none());
    assert_eq!(script.props.value, "<strong>a</strong>");
    assert_eq!(script.steps.len(), 7);
    assert!(matches!(script.steps[0], Step::Native(NativeEvent::Focus)));
    assert!(matches!(
        script.steps[3],
        Step::Key {
            key_code: 8,
            shift: false,
            event_counter: Some(3)
        }
    ));
    assert!(matches!(script.steps[6], Step::TickMs(600)));
}

fn mounted(value: &str) -> (super::Controller, super::SimClock, RecordingHost) {
    let host = RecordingHost::new();
    let len = value.chars().count();
    let props = HostProps {
        value: value.to_string(),
        selection_start: Some(len),
        selection_end: Some(len),
        is_selected: true,
        ..HostProps::default()
    };
    let (controller, clock) =
        mount_controller(RecordingSurface::new(), host.clone(), EngineConfig::default(), props);
    (controller, clock, host)
}

fn typed(markup: &str, counter: u64) -> Step {
    Step::Native(NativeEvent::ContentChanged {
        markup: markup.to_string(),
        event_counter: Some(counter),
    })
}

#[test]
fn tick_step_flushes_debounced_undo_level() {
    let (mut controller, clock, host) = mounted("a");

    let outcome = run_step(&mut controller, typed("ab", 1), &clock);
    assert_eq!(outcome, Some(EventOutcome::Applied));
    assert_eq!(host.undo_levels(), 0);

    assert_eq!(run_step(&mut controller, Step::TickMs(10_000), &clock), None);
    assert_eq!(host.undo_levels(), 1);
}

#[test]
fn commit_after_idle_ticks_is_timed_on_the_simulated_clock() {
    let (mut controller, clock, host) = mounted("");

    run_step(&mut controller, Step::TickMs(600), &clock);
    run_step(&mut controller, typed("a", 1), &clock);
    run_step(&mut controller, Step::TickMs(10), &clock);
    assert_eq!(host.undo_levels(), 0);

    run_step(&mut controller, Step::TickMs(500), &clock);
    assert_eq!(host.undo_levels(), 1);
}

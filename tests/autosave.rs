//! Debounced autosave through the session event loop

mod common;

use std::time::Instant;

use common::{active_engine, at, mounted, test_config, ms};
use editor_bridge::engine::{ChangeOrigin, EngineEvent, EngineVariant, HeadlessFactory};
use editor_bridge::host::RecordingHost;
use editor_bridge::{BridgeConfig, HostEvent, MemoryDocument, Session};

#[test]
fn test_burst_fires_exactly_once_after_last_keystroke() {
    for variant in [EngineVariant::Generic, EngineVariant::Structured] {
        let mut session = mounted(variant, "");
        let start = Instant::now();

        let mut fired = 0;
        for i in 0..8u64 {
            active_engine(&session).type_text("x");
            if session.tick(at(start, i * 400)) {
                fired += 1;
            }
        }
        let last = 7 * 400;

        for step in (last..last + 1000).step_by(100) {
            if session.tick(at(start, step)) {
                fired += 1;
            }
        }
        assert_eq!(fired, 0, "nothing fires inside the quiet window");

        assert!(session.tick(at(start, last + 1000)));
        assert!(!session.tick(at(start, last + 5000)));
        assert_eq!(session.host().count(&HostEvent::Autosave), 1);
    }
}

#[test]
fn test_separate_bursts_fire_separately() {
    let mut session = mounted(EngineVariant::Generic, "");
    let start = Instant::now();

    active_engine(&session).type_text("a");
    session.tick(start);
    assert!(session.tick(at(start, 1000)));

    active_engine(&session).type_text("b");
    session.tick(at(start, 1500));
    assert!(session.tick(at(start, 2600)));

    assert_eq!(session.host().count(&HostEvent::Autosave), 2);
}

#[test]
fn test_programmatic_changes_do_not_arm_or_restart_timer() {
    let mut session = mounted(EngineVariant::Structured, "");
    let start = Instant::now();

    active_engine(&session).replace_all("(formatted)");
    session.tick(start);
    assert!(!session.autosave_pending());

    active_engine(&session).type_text(" ");
    session.tick(at(start, 100));
    // A programmatic change mid-window must not push the deadline out
    active_engine(&session).replace_all("(formatted) ");
    session.tick(at(start, 900));
    assert!(session.tick(at(start, 1100)));
}

#[test]
fn test_remount_cancels_pending_autosave() {
    let mut session = mounted(EngineVariant::Structured, "");
    let start = Instant::now();

    active_engine(&session).type_text("x");
    session.tick(start);
    assert!(session.autosave_pending());

    session.init();
    assert!(!session.autosave_pending());
    assert!(!session.tick(at(start, 2000)));
    assert_eq!(session.host().count(&HostEvent::Autosave), 0);
}

#[test]
fn test_insta_repl_toggle_cancels_pending_autosave() {
    let mut session = mounted(EngineVariant::Structured, "");
    let start = Instant::now();

    active_engine(&session).type_text("x");
    session.tick(start);
    session.show_insta_repl();
    assert!(!session.tick(at(start, 1500)));
}

#[test]
fn test_events_from_abandoned_engine_are_ignored() {
    let mut session = mounted(EngineVariant::Generic, "");
    let old = active_engine(&session);
    session.init();

    let start = Instant::now();
    session.handle_engine_event(
        EngineEvent::Change {
            generation: old.generation(),
            origin: ChangeOrigin::Keystroke,
        },
        start,
    );
    assert!(!session.tick(at(start, 1000)));
}

#[test]
fn test_console_keystrokes_never_autosave() {
    let mut session = mounted(EngineVariant::Structured, "");
    session.init_console(true);
    let start = Instant::now();

    active_engine(&session).type_text("(+ 1 2)");
    session.tick(start);
    assert!(!session.autosave_pending());
    assert!(!session.tick(at(start, 1000)));
}

#[test]
fn test_configured_delay() {
    let config = BridgeConfig {
        autosave_delay_ms: 250,
        ..test_config()
    };
    let mut session = Session::new(
        MemoryDocument::generic_page(""),
        HeadlessFactory::new(EngineVariant::Generic),
        RecordingHost::new(),
        config,
    );
    session.init();
    let start = Instant::now();

    active_engine(&session).type_text("x");
    session.tick(start);
    assert!(!session.tick(start + ms(249)));
    assert!(session.tick(start + ms(250)));
}

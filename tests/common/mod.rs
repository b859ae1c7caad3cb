//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::time::{Duration, Instant};

use editor_bridge::engine::{EngineVariant, HeadlessFactory, HeadlessHandle};
use editor_bridge::host::RecordingHost;
use editor_bridge::{BridgeConfig, MemoryDocument, Session};

pub type TestSession = Session<MemoryDocument, HeadlessFactory, RecordingHost>;

/// Config with host notifications switched on
pub fn test_config() -> BridgeConfig {
    BridgeConfig {
        notify_host: true,
        ..BridgeConfig::default()
    }
}

/// Unmounted session over the standard page layout of `variant`
pub fn test_session(variant: EngineVariant, text: &str) -> TestSession {
    let document = match variant {
        EngineVariant::Generic => MemoryDocument::generic_page(text),
        EngineVariant::Structured => MemoryDocument::structured_page(text),
    };
    Session::new(
        document,
        HeadlessFactory::new(variant),
        RecordingHost::new(),
        test_config(),
    )
}

/// Mounted session with the host log cleared
pub fn mounted(variant: EngineVariant, text: &str) -> TestSession {
    let mut session = test_session(variant, text);
    session.init();
    session.host_mut().take();
    session
}

/// The engine currently mounted in `session`
pub fn active_engine(session: &TestSession) -> HeadlessHandle {
    session
        .factory()
        .active()
        .cloned()
        .expect("session has no mounted engine")
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

pub fn at(start: Instant, millis: u64) -> Instant {
    start + ms(millis)
}

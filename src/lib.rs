//! Editor bridge - session façade between a webview host and its editor widget
//!
//! This crate provides the session object a page exposes to its host
//! application, plus the seams it drives: the backing editor engine, the
//! page document and the host notification channel.

pub mod config;
pub mod config_paths;
pub mod debounce;
pub mod document;
pub mod engine;
pub mod host;
pub mod reformat;
pub mod session;
pub mod theme;
pub mod tracing;

// Re-export commonly used types
pub use config::BridgeConfig;
pub use document::{Document, MemoryDocument};
pub use engine::{EditorEngine, EngineFactory, EngineVariant, MountMode};
pub use host::{HostChannel, HostEvent};
pub use session::{Session, SessionState};

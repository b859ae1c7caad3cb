//! Backing editor engine seam
//!
//! The bridge never edits text itself. It mounts an engine through an
//! `EngineFactory` and drives it through `EditorEngine`. Structure-aware
//! engines additionally expose `StructuredEditing`.

mod headless;
mod history;

pub use headless::{HeadlessEngine, HeadlessFactory, HeadlessHandle};
pub use history::{EditHistory, EditOperation};

use crate::document::{Document, MOUNT_ID};

/// Element id the generic engine renders its surface into
pub const GENERIC_SURFACE_ID: &str = "CodeMirror";

/// Which editor widget backs the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineVariant {
    /// Line-oriented code editor
    Generic,
    /// Lisp structure-aware editor, also used for console surfaces
    Structured,
}

impl EngineVariant {
    /// Element whose font size controls the rendered text
    pub fn surface_id(self) -> &'static str {
        match self {
            EngineVariant::Generic => GENERIC_SURFACE_ID,
            EngineVariant::Structured => MOUNT_ID,
        }
    }
}

/// What a mount is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountMode {
    Edit,
    /// Console surface; `repl` enables structure-aware language features
    Console { repl: bool },
}

impl MountMode {
    pub fn is_console(self) -> bool {
        matches!(self, MountMode::Console { .. })
    }

    /// CSS `white-space` for the content holder
    pub fn white_space(self) -> &'static str {
        match self {
            MountMode::Edit => "pre",
            MountMode::Console { .. } => "pre-wrap",
        }
    }
}

/// Where a change event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Typed by the user (a keyup in the page)
    Keystroke,
    /// Any other edit: API calls, paste handling, appends
    Programmatic,
}

/// Notification raised by an engine, tagged with the mount it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Change { generation: u64, origin: ChangeOrigin },
    /// Console input submitted with Enter
    Submit { generation: u64, text: String },
}

impl EngineEvent {
    pub fn generation(&self) -> u64 {
        match self {
            EngineEvent::Change { generation, .. } | EngineEvent::Submit { generation, .. } => {
                *generation
            }
        }
    }
}

/// Undo/redo stack depths
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistorySize {
    pub undo: usize,
    pub redo: usize,
}

/// Construction options passed to a factory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountOptions {
    pub generation: u64,
    pub mode: MountMode,
    pub initial_text: String,
    pub line_numbers: bool,
    /// False disables Lisp-specific behavior (plain console)
    pub structure_features: bool,
    /// Console only: characters kept when text is appended
    pub append_limit: Option<usize>,
}

/// A live editor instance
pub trait EditorEngine {
    fn value(&self) -> String;

    fn set_value(&mut self, text: &str);

    fn undo(&mut self);

    fn redo(&mut self);

    fn history(&self) -> HistorySize;

    /// Engine-level theme option; engines themed by stylesheet ignore it
    fn set_theme(&mut self, _theme: &str) {}

    /// Events raised since the last call
    fn drain_events(&mut self) -> Vec<EngineEvent> {
        Vec::new()
    }

    fn as_structured(&self) -> Option<&dyn StructuredEditing> {
        None
    }

    fn as_structured_mut(&mut self) -> Option<&mut dyn StructuredEditing> {
        None
    }

    /// Release listeners and any page elements the engine created
    fn dispose(&mut self, _document: &mut dyn Document) {}
}

/// Extra capabilities of the structure-aware engine
pub trait StructuredEditing {
    /// Append to the buffer, honoring the mount's append limit
    fn append_text(&mut self, text: &str);

    fn selected_text(&self) -> Option<String>;

    /// Innermost top-level form around the caret
    fn focused_text(&self) -> Option<String>;
}

/// Builds engines of one variant
pub trait EngineFactory {
    fn variant(&self) -> EngineVariant;

    fn mount(
        &mut self,
        document: &mut dyn Document,
        options: &MountOptions,
    ) -> Box<dyn EditorEngine>;
}

//! Editor session: the host-facing façade over one mounted editor engine
//!
//! The session owns the active engine, the clean snapshot and the autosave
//! timer. Every entry point is safe to call before the first mount: queries
//! answer `false`/`None` and commands do nothing.
//!
//! The page's content holder is the single source of truth for text. Engine
//! edits are mirrored into it as they are reported.

use std::time::Instant;

use crate::config::BridgeConfig;
use crate::debounce::Debouncer;
use crate::document::{
    Document, ElementSpec, CONTENT_ID, GUTTER_ID, INSTAREPL_ID, MOUNT_ID, OUTPUT_ID,
};
use crate::engine::{
    ChangeOrigin, EditorEngine, EngineEvent, EngineFactory, EngineVariant, MountMode,
    MountOptions,
};
use crate::host::{HostChannel, HostEvent};
use crate::reformat::{Passthrough, Reformatter};
use crate::theme::ThemeStrategy;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Active(MountMode),
}

struct ActiveEditor {
    engine: Box<dyn EditorEngine>,
    generation: u64,
    mode: MountMode,
}

pub struct Session<D, F, H> {
    document: D,
    factory: F,
    host: H,
    reformatter: Box<dyn Reformatter>,
    config: BridgeConfig,
    active: Option<ActiveEditor>,
    last_clean: String,
    autosave: Debouncer,
    generation: u64,
    dark_theme: Option<bool>,
    text_size: Option<u32>,
}

impl<D: Document, F: EngineFactory, H: HostChannel> Session<D, F, H> {
    pub fn new(document: D, factory: F, host: H, config: BridgeConfig) -> Self {
        Self {
            document,
            factory,
            host,
            reformatter: Box::new(Passthrough),
            autosave: Debouncer::new(config.autosave_delay()),
            text_size: config.text_size,
            config,
            active: None,
            last_clean: String::new(),
            generation: 0,
            dark_theme: None,
        }
    }

    pub fn with_reformatter(mut self, reformatter: impl Reformatter + 'static) -> Self {
        self.reformatter = Box::new(reformatter);
        self
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn variant(&self) -> EngineVariant {
        self.factory.variant()
    }

    pub fn state(&self) -> SessionState {
        match &self.active {
            Some(active) => SessionState::Active(active.mode),
            None => SessionState::Uninitialized,
        }
    }

    /// Mount counter; events tagged with an older generation are ignored
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn engine(&self) -> Option<&dyn EditorEngine> {
        self.active.as_ref().map(|active| &*active.engine)
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Page load: announce to the host, then mount the editor
    pub fn on_load(&mut self) {
        self.notify(HostEvent::Load);
        self.notify(HostEvent::Change);
        self.init();
    }

    /// Mount a fresh editor over the content holder and mark it clean
    pub fn init(&mut self) {
        self.mount(MountMode::Edit);
        self.mark_clean();
    }

    /// Mount a console surface. `is_repl` keeps structure-aware features on.
    pub fn init_console(&mut self, is_repl: bool) {
        if self.variant() != EngineVariant::Structured {
            tracing::debug!("Console mount requested on the generic editor, ignoring");
            return;
        }
        self.mount(MountMode::Console { repl: is_repl });
        self.mark_clean();
    }

    fn mount(&mut self, mode: MountMode) {
        self.teardown();
        self.generation += 1;

        let variant = self.variant();
        let options = MountOptions {
            generation: self.generation,
            mode,
            initial_text: self.get_text_content(),
            line_numbers: variant == EngineVariant::Generic,
            structure_features: match mode {
                MountMode::Edit => true,
                MountMode::Console { repl } => repl,
            },
            append_limit: mode.is_console().then_some(self.config.append_limit),
        };
        let engine = self.factory.mount(&mut self.document, &options);
        self.active = Some(ActiveEditor {
            engine,
            generation: self.generation,
            mode,
        });

        match variant {
            EngineVariant::Generic => {
                // The engine renders its own surface; the holder stays as the text mirror
                self.document.set_hidden(CONTENT_ID, true);
            }
            EngineVariant::Structured => {
                self.document
                    .set_style(CONTENT_ID, "white-space", mode.white_space());
                self.document.set_hidden(OUTPUT_ID, !mode.is_console());
                if mode == MountMode::Edit {
                    self.document.focus(CONTENT_ID);
                }
            }
        }

        // A fresh surface starts unstyled
        if let Some(is_dark) = self.dark_theme {
            if self.theme_strategy() == ThemeStrategy::EngineOption {
                self.change_theme(is_dark);
            }
        }
        if let Some(size) = self.text_size {
            self.set_text_size(size);
        }

        tracing::debug!(generation = self.generation, ?variant, ?mode, "Editor mounted");
    }

    /// Dispose the active editor and drop any pending autosave
    fn teardown(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.engine.dispose(&mut self.document);
            tracing::debug!(generation = active.generation, "Editor disposed");
        }
        self.autosave.cancel();
    }

    // ========================================================================
    // Event loop
    // ========================================================================

    /// Deliver one engine event. Events from a disposed mount are dropped.
    pub fn handle_engine_event(&mut self, event: EngineEvent, now: Instant) {
        let Some(active) = &self.active else {
            tracing::debug!(?event, "Engine event with no active editor");
            return;
        };
        if event.generation() != active.generation {
            tracing::debug!(
                stale = event.generation(),
                current = active.generation,
                "Dropping event from a disposed editor"
            );
            return;
        }
        let mode = active.mode;

        match event {
            EngineEvent::Change { origin, .. } => {
                self.sync_content();
                self.notify(HostEvent::Change);
                if origin == ChangeOrigin::Keystroke {
                    match mode {
                        MountMode::Edit => self.autosave.reset(now),
                        MountMode::Console { .. } => {
                            self.document.scroll_to_bottom(MOUNT_ID);
                        }
                    }
                }
            }
            EngineEvent::Submit { text, .. } => {
                if mode.is_console() {
                    self.notify(HostEvent::Enter {
                        text: format!("{}\n", text),
                    });
                } else {
                    tracing::debug!("Submit outside console mode ignored");
                }
            }
        }
    }

    /// Drain engine events and fire the autosave timer if due.
    ///
    /// Returns true when an autosave notification was sent.
    pub fn tick(&mut self, now: Instant) -> bool {
        let events = match self.active.as_mut() {
            Some(active) => active.engine.drain_events(),
            None => Vec::new(),
        };
        for event in events {
            self.handle_engine_event(event, now);
        }

        if self.autosave.poll(now) {
            tracing::debug!("Autosave timer fired");
            self.notify(HostEvent::Autosave);
            true
        } else {
            false
        }
    }

    // ========================================================================
    // History
    // ========================================================================

    pub fn undo(&mut self) {
        let Some(active) = self.active.as_mut() else {
            tracing::debug!("undo with no active editor");
            return;
        };
        active.engine.undo();
        self.after_history_step();
    }

    pub fn redo(&mut self) {
        let Some(active) = self.active.as_mut() else {
            tracing::debug!("redo with no active editor");
            return;
        };
        active.engine.redo();
        self.after_history_step();
    }

    fn after_history_step(&mut self) {
        self.sync_content();
        if self.variant() == EngineVariant::Structured {
            self.notify(HostEvent::Autosave);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.engine.history().undo > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.engine.history().redo > 0)
    }

    // ========================================================================
    // Content
    // ========================================================================

    /// Overwrite the content holder. The engine keeps its own buffer until the next mount.
    pub fn set_text_content(&mut self, text: &str) {
        if !self.document.set_text_content(CONTENT_ID, text) {
            tracing::warn!("Content holder #{} missing from page", CONTENT_ID);
        }
    }

    pub fn get_text_content(&self) -> String {
        self.document.text_content(CONTENT_ID).unwrap_or_default()
    }

    fn sync_content(&mut self) {
        if let Some(active) = &self.active {
            let value = active.engine.value();
            self.document.set_text_content(CONTENT_ID, &value);
        }
    }

    /// Selection, or the form around the caret, reformatted for copying out.
    ///
    /// Always `None` on the generic editor.
    pub fn get_selected_text(&self) -> Option<String> {
        if self.variant() != EngineVariant::Structured {
            return None;
        }
        let structured = self.active.as_ref()?.engine.as_structured()?;
        let text = structured
            .selected_text()
            .filter(|t| !t.is_empty())
            .or_else(|| structured.focused_text().filter(|t| !t.is_empty()))?;
        Some(self.reformatter.reformat(&text))
    }

    /// Append console output, then keep the newest line in view
    pub fn append(&mut self, text: &str) {
        let Some(structured) = self
            .active
            .as_mut()
            .and_then(|active| active.engine.as_structured_mut())
        else {
            tracing::debug!("append without a structured editor");
            return;
        };
        structured.append_text(text);
        self.sync_content();
        self.document.scroll_to_bottom(MOUNT_ID);
    }

    // ========================================================================
    // Clean state
    // ========================================================================

    pub fn mark_clean(&mut self) {
        self.last_clean = self.get_text_content();
        self.notify(HostEvent::Change);
    }

    pub fn is_clean(&self) -> bool {
        self.last_clean == self.get_text_content()
    }

    // ========================================================================
    // Presentation
    // ========================================================================

    fn theme_strategy(&self) -> ThemeStrategy {
        match self.variant() {
            EngineVariant::Generic => ThemeStrategy::EngineOption,
            EngineVariant::Structured => ThemeStrategy::StylesheetSwap,
        }
    }

    pub fn change_theme(&mut self, is_dark: bool) {
        self.dark_theme = Some(is_dark);
        let strategy = self.theme_strategy();
        let engine = self.active.as_mut().map(|active| &mut *active.engine);
        strategy.apply(&self.config.theme, is_dark, engine, &mut self.document);
    }

    /// Font size of the rendered editor, in CSS pixels
    pub fn set_text_size(&mut self, size: u32) {
        self.text_size = Some(size);
        let surface = self.variant().surface_id();
        if !self
            .document
            .set_style(surface, "font-size", &format!("{}px", size))
        {
            tracing::debug!("No #{} surface yet, text size deferred", surface);
        }
    }

    // ========================================================================
    // InstaRepl
    // ========================================================================

    /// Insert the evaluation panel before the gutter and remount.
    ///
    /// The remount drops undo history and re-marks clean; text survives through the page.
    pub fn show_insta_repl(&mut self) {
        if self.variant() != EngineVariant::Structured {
            tracing::debug!("InstaRepl is only available on the structured editor");
            return;
        }
        if self.document.contains(INSTAREPL_ID) {
            tracing::debug!("InstaRepl panel already shown");
            return;
        }
        let panel = ElementSpec::div(INSTAREPL_ID).with_class("instarepl");
        if !self.document.insert_before(MOUNT_ID, panel, GUTTER_ID) {
            tracing::warn!("Could not place InstaRepl panel before #{}", GUTTER_ID);
            return;
        }
        self.init();
    }

    pub fn hide_insta_repl(&mut self) {
        if self.variant() != EngineVariant::Structured {
            tracing::debug!("InstaRepl is only available on the structured editor");
            return;
        }
        if !self.document.remove(INSTAREPL_ID) {
            tracing::debug!("InstaRepl panel not shown");
            return;
        }
        self.init();
    }

    fn notify(&mut self, event: HostEvent) {
        if self.config.notify_host {
            self.host.notify(event);
        } else {
            tracing::trace!(?event, "Host notifications disabled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::engine::HeadlessFactory;
    use crate::host::RecordingHost;

    type TestSession = Session<MemoryDocument, HeadlessFactory, RecordingHost>;

    fn session(variant: EngineVariant, text: &str) -> TestSession {
        let document = match variant {
            EngineVariant::Generic => MemoryDocument::generic_page(text),
            EngineVariant::Structured => MemoryDocument::structured_page(text),
        };
        let config = BridgeConfig {
            notify_host: true,
            ..BridgeConfig::default()
        };
        Session::new(
            document,
            HeadlessFactory::new(variant),
            RecordingHost::new(),
            config,
        )
    }

    #[test]
    fn test_state_transitions() {
        let mut session = session(EngineVariant::Structured, "(a)");
        assert_eq!(session.state(), SessionState::Uninitialized);
        session.init();
        assert_eq!(session.state(), SessionState::Active(MountMode::Edit));
        session.init_console(true);
        assert_eq!(
            session.state(),
            SessionState::Active(MountMode::Console { repl: true })
        );
        assert_eq!(session.generation(), 2);
    }

    #[test]
    fn test_stale_events_are_dropped() {
        let mut session = session(EngineVariant::Generic, "x");
        session.init();
        let old = session.factory().active().unwrap().clone();
        session.init();
        session.host_mut().take();

        session.handle_engine_event(
            EngineEvent::Change {
                generation: old.generation(),
                origin: ChangeOrigin::Keystroke,
            },
            Instant::now(),
        );
        assert!(session.host().events.is_empty());
        assert!(!session.autosave_pending());
    }

    #[test]
    fn test_disabled_notifications_reach_nothing() {
        let mut session = Session::new(
            MemoryDocument::generic_page("x"),
            HeadlessFactory::new(EngineVariant::Generic),
            RecordingHost::new(),
            BridgeConfig::default(),
        );
        session.on_load();
        assert!(session.host().events.is_empty());
        assert!(session.is_clean());
    }

    #[test]
    fn test_console_mount_options() {
        let mut session = session(EngineVariant::Structured, "");
        session.init_console(false);
        let options = session.factory().active().unwrap().options();
        assert_eq!(options.append_limit, Some(2000));
        assert!(!options.structure_features);
        assert_eq!(
            session.document().style(CONTENT_ID, "white-space").as_deref(),
            Some("pre-wrap")
        );
    }
}

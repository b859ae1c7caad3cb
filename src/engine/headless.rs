//! Headless engine for driving a session without a browser.
//!
//! Not an editor: it only knows whole-buffer edits, appends at the end, and
//! a selection / focused-form slot. The factory keeps a handle to the live
//! instance only, so a harness can type into it while disposed engines are
//! released with the session's box.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use ropey::Rope;

use super::{
    ChangeOrigin, EditHistory, EditOperation, EditorEngine, EngineEvent, EngineFactory,
    EngineVariant, HistorySize, MountOptions, StructuredEditing, GENERIC_SURFACE_ID,
};
use crate::document::{Document, ElementSpec};

#[derive(Debug)]
struct HeadlessState {
    variant: EngineVariant,
    options: MountOptions,
    rope: Rope,
    history: EditHistory,
    theme: Option<String>,
    selection: Option<String>,
    focused_form: Option<String>,
    events: VecDeque<EngineEvent>,
    disposed: bool,
}

impl HeadlessState {
    fn edit(&mut self, op: EditOperation, origin: ChangeOrigin) {
        op.apply(&mut self.rope);
        self.history.push(op);
        self.events.push_back(EngineEvent::Change {
            generation: self.options.generation,
            origin,
        });
    }
}

/// Shared view of one mounted headless engine
#[derive(Debug, Clone)]
pub struct HeadlessHandle {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessHandle {
    /// Insert text at the end of the buffer as if typed
    pub fn type_text(&self, text: &str) {
        let mut state = self.state.borrow_mut();
        let offset = state.rope.len_chars();
        state.edit(
            EditOperation::insert(offset, text.to_string()),
            ChangeOrigin::Keystroke,
        );
    }

    /// Replace the whole buffer from code (paste handler, formatter, ...)
    pub fn replace_all(&self, text: &str) {
        let mut state = self.state.borrow_mut();
        let old = state.rope.to_string();
        state.edit(
            EditOperation::replace(0, old, text.to_string()),
            ChangeOrigin::Programmatic,
        );
    }

    /// Press Enter on a console line
    pub fn submit(&self, text: &str) {
        let mut state = self.state.borrow_mut();
        let generation = state.options.generation;
        state.events.push_back(EngineEvent::Submit {
            generation,
            text: text.to_string(),
        });
    }

    pub fn set_selection(&self, text: Option<&str>) {
        self.state.borrow_mut().selection = text.map(str::to_string);
    }

    pub fn set_focused_form(&self, text: Option<&str>) {
        self.state.borrow_mut().focused_form = text.map(str::to_string);
    }

    pub fn value(&self) -> String {
        self.state.borrow().rope.to_string()
    }

    pub fn theme(&self) -> Option<String> {
        self.state.borrow().theme.clone()
    }

    pub fn options(&self) -> MountOptions {
        self.state.borrow().options.clone()
    }

    pub fn generation(&self) -> u64 {
        self.state.borrow().options.generation
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// Number of owners of this engine's state, this handle included
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.state)
    }
}

/// Engine instance owned by the session
#[derive(Debug)]
pub struct HeadlessEngine {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessEngine {
    pub fn new(variant: EngineVariant, options: &MountOptions) -> Self {
        let state = HeadlessState {
            variant,
            options: options.clone(),
            rope: Rope::from_str(&options.initial_text),
            history: EditHistory::new(),
            theme: None,
            selection: None,
            focused_form: None,
            events: VecDeque::new(),
            disposed: false,
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn handle(&self) -> HeadlessHandle {
        HeadlessHandle {
            state: Rc::clone(&self.state),
        }
    }

    fn is_structured(&self) -> bool {
        self.state.borrow().variant == EngineVariant::Structured
    }
}

impl EditorEngine for HeadlessEngine {
    fn value(&self) -> String {
        self.state.borrow().rope.to_string()
    }

    fn set_value(&mut self, text: &str) {
        let mut state = self.state.borrow_mut();
        state.rope = Rope::from_str(text);
        state.history.clear();
    }

    fn undo(&mut self) {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        state.history.undo(&mut state.rope);
    }

    fn redo(&mut self) {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        state.history.redo(&mut state.rope);
    }

    fn history(&self) -> HistorySize {
        let state = self.state.borrow();
        HistorySize {
            undo: state.history.undo_count(),
            redo: state.history.redo_count(),
        }
    }

    fn set_theme(&mut self, theme: &str) {
        self.state.borrow_mut().theme = Some(theme.to_string());
    }

    fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.state.borrow_mut().events.drain(..).collect()
    }

    fn as_structured(&self) -> Option<&dyn StructuredEditing> {
        if self.is_structured() {
            Some(self as &dyn StructuredEditing)
        } else {
            None
        }
    }

    fn as_structured_mut(&mut self) -> Option<&mut dyn StructuredEditing> {
        if self.is_structured() {
            Some(self as &mut dyn StructuredEditing)
        } else {
            None
        }
    }

    fn dispose(&mut self, document: &mut dyn Document) {
        let mut state = self.state.borrow_mut();
        if state.disposed {
            return;
        }
        state.disposed = true;
        state.events.clear();
        if state.variant == EngineVariant::Generic {
            document.remove(GENERIC_SURFACE_ID);
        }
    }
}

impl StructuredEditing for HeadlessEngine {
    fn append_text(&mut self, text: &str) {
        let mut state = self.state.borrow_mut();
        let end = state.rope.len_chars();
        state.rope.insert(end, text);

        if let Some(limit) = state.options.append_limit {
            let len = state.rope.len_chars();
            if len > limit {
                state.rope.remove(0..len - limit);
            }
        }
        // Trimming shifts every offset, so older history no longer lines up
        state.history.clear();
    }

    fn selected_text(&self) -> Option<String> {
        self.state.borrow().selection.clone()
    }

    fn focused_text(&self) -> Option<String> {
        self.state.borrow().focused_form.clone()
    }
}

/// Factory producing headless engines of a single variant
#[derive(Debug)]
pub struct HeadlessFactory {
    variant: EngineVariant,
    active: Option<HeadlessHandle>,
    mount_count: usize,
}

impl HeadlessFactory {
    pub fn new(variant: EngineVariant) -> Self {
        Self {
            variant,
            active: None,
            mount_count: 0,
        }
    }

    /// The most recently mounted engine
    pub fn active(&self) -> Option<&HeadlessHandle> {
        self.active.as_ref()
    }

    /// How many engines this factory has mounted
    pub fn mount_count(&self) -> usize {
        self.mount_count
    }
}

impl EngineFactory for HeadlessFactory {
    fn variant(&self) -> EngineVariant {
        self.variant
    }

    fn mount(
        &mut self,
        document: &mut dyn Document,
        options: &MountOptions,
    ) -> Box<dyn EditorEngine> {
        if self.variant == EngineVariant::Generic {
            document.append_element(
                None,
                ElementSpec::div(GENERIC_SURFACE_ID).with_class("CodeMirror"),
            );
        }
        let engine = HeadlessEngine::new(self.variant, options);
        self.active = Some(engine.handle());
        self.mount_count += 1;
        Box::new(engine)
    }
}

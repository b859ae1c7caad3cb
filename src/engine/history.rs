//! Edit history (undo/redo) for the headless engine.

use ropey::Rope;

/// A single replace operation, in character offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOperation {
    /// Char offset where the edit occurred
    pub offset: usize,
    /// Text that was deleted (empty for pure inserts)
    pub deleted_text: String,
    /// Text that was inserted (empty for pure deletes)
    pub inserted_text: String,
}

impl EditOperation {
    pub fn insert(offset: usize, text: String) -> Self {
        Self {
            offset,
            deleted_text: String::new(),
            inserted_text: text,
        }
    }

    pub fn replace(offset: usize, deleted_text: String, inserted_text: String) -> Self {
        Self {
            offset,
            deleted_text,
            inserted_text,
        }
    }

    /// Get the inverse operation for undo
    pub fn inverse(&self) -> Self {
        Self {
            offset: self.offset,
            deleted_text: self.inserted_text.clone(),
            inserted_text: self.deleted_text.clone(),
        }
    }

    /// Apply this operation to a rope
    pub fn apply(&self, rope: &mut Rope) {
        let end = self.offset + self.deleted_text.chars().count();
        rope.remove(self.offset..end);
        rope.insert(self.offset, &self.inserted_text);
    }
}

/// Edit history with undo/redo stacks.
///
/// The redo stack holds inverses, so both undo and redo apply the inverse of
/// the operation they pop.
#[derive(Debug, Clone, Default)]
pub struct EditHistory {
    undo_stack: Vec<EditOperation>,
    redo_stack: Vec<EditOperation>,
    max_size: usize,
}

impl EditHistory {
    /// Create a new edit history with default max size
    pub fn new() -> Self {
        Self::with_max_size(1000)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
        }
    }

    /// Push an operation onto the undo stack (clears redo stack)
    pub fn push(&mut self, op: EditOperation) {
        self.redo_stack.clear();
        self.undo_stack.push(op);

        while self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
    }

    /// Pop an operation from the undo stack (moves to redo stack)
    pub fn pop_undo(&mut self) -> Option<EditOperation> {
        let op = self.undo_stack.pop()?;
        self.redo_stack.push(op.inverse());
        Some(op)
    }

    /// Pop an operation from the redo stack (moves to undo stack)
    pub fn pop_redo(&mut self) -> Option<EditOperation> {
        let op = self.redo_stack.pop()?;
        self.undo_stack.push(op.inverse());
        Some(op)
    }

    /// Undo the latest edit on `rope`. Returns false when there is nothing to undo.
    pub fn undo(&mut self, rope: &mut Rope) -> bool {
        match self.pop_undo() {
            Some(op) => {
                op.inverse().apply(rope);
                true
            }
            None => false,
        }
    }

    /// Redo the latest undone edit on `rope`.
    pub fn redo(&mut self, rope: &mut Rope) -> bool {
        match self.pop_redo() {
            Some(op) => {
                op.inverse().apply(rope);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_operation_inverse() {
        let op = EditOperation::replace(5, "old".to_string(), "new".to_string());
        let inv = op.inverse();
        assert_eq!(inv.deleted_text, "new");
        assert_eq!(inv.inserted_text, "old");
        assert_eq!(inv.offset, 5);
    }

    #[test]
    fn test_apply_replace() {
        let mut rope = Rope::from_str("(def x 1)");
        EditOperation::replace(7, "1".to_string(), "42".to_string()).apply(&mut rope);
        assert_eq!(rope.to_string(), "(def x 42)");
    }

    #[test]
    fn test_undo_redo_on_rope() {
        let mut rope = Rope::from_str("ab");
        let mut history = EditHistory::new();

        let op = EditOperation::insert(2, "c".to_string());
        op.apply(&mut rope);
        history.push(op);
        assert_eq!(rope.to_string(), "abc");

        assert!(history.undo(&mut rope));
        assert_eq!(rope.to_string(), "ab");
        assert!(history.can_redo());

        assert!(history.redo(&mut rope));
        assert_eq!(rope.to_string(), "abc");
        assert!(!history.can_redo());
        assert!(history.can_undo());
    }

    #[test]
    fn test_undo_on_empty_history_is_noop() {
        let mut rope = Rope::from_str("x");
        let mut history = EditHistory::new();
        assert!(!history.undo(&mut rope));
        assert!(!history.redo(&mut rope));
        assert_eq!(rope.to_string(), "x");
    }

    #[test]
    fn test_history_push_clears_redo() {
        let mut history = EditHistory::new();
        history.push(EditOperation::insert(0, "a".to_string()));
        history.pop_undo();
        assert!(history.can_redo());

        history.push(EditOperation::insert(0, "b".to_string()));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_history_max_size() {
        let mut history = EditHistory::with_max_size(3);
        for i in 0..5 {
            history.push(EditOperation::insert(i, format!("{}", i)));
        }
        assert_eq!(history.undo_count(), 3);
    }
}

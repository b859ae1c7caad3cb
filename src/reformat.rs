//! Reformatting of forms copied out of the structure-aware editor
//!
//! Selected text runs through a paren pass (close what is open, drop what
//! is stray) and then an indentation pass. Both passes live in an external
//! library; the bridge only sequences them.

/// Two-pass reformatter for Lisp text
pub trait Reformatter {
    /// Balance delimiters, keeping indentation as-is
    fn normalize_structure(&self, text: &str) -> String;

    /// Re-derive indentation from the (already balanced) structure
    fn normalize_indent(&self, text: &str) -> String;

    fn reformat(&self, text: &str) -> String {
        let balanced = self.normalize_structure(text);
        self.normalize_indent(&balanced)
    }
}

/// Returns text unchanged
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl Reformatter for Passthrough {
    fn normalize_structure(&self, text: &str) -> String {
        text.to_string()
    }

    fn normalize_indent(&self, text: &str) -> String {
        text.to_string()
    }
}

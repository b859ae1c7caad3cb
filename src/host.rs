//! One-way notifications from the page to its host application

use std::io::Write;

use serde::{Deserialize, Serialize};

/// Lifecycle and console events sent to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    /// Page finished loading
    Load,
    /// Content or clean state may have changed; the host re-queries `is_clean`
    Change,
    /// Quiescence after typing; the host should persist the buffer
    Autosave,
    /// Console input submitted, newline-terminated
    Enter { text: String },
}

impl HostEvent {
    /// Name of the host callback this event maps to
    pub fn callback_name(&self) -> &'static str {
        match self {
            HostEvent::Load => "onload",
            HostEvent::Change => "onchange",
            HostEvent::Autosave => "onautosave",
            HostEvent::Enter { .. } => "onenter",
        }
    }

    /// JavaScript a webview would evaluate to deliver this event to `bridge_object`
    pub fn to_script(&self, bridge_object: &str) -> String {
        match self {
            HostEvent::Enter { text } => format!(
                "{}.{}({});",
                bridge_object,
                self.callback_name(),
                serde_json::to_string(text).unwrap_or_default()
            ),
            _ => format!("{}.{}();", bridge_object, self.callback_name()),
        }
    }
}

/// Fire-and-forget sink for host notifications
pub trait HostChannel {
    fn notify(&mut self, event: HostEvent);
}

/// Keeps every notification in order
#[derive(Debug, Default, Clone)]
pub struct RecordingHost {
    pub events: Vec<HostEvent>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, event: &HostEvent) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }

    pub fn take(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }
}

impl HostChannel for RecordingHost {
    fn notify(&mut self, event: HostEvent) {
        self.events.push(event);
    }
}

/// Writes each notification as one JSON line
#[derive(Debug)]
pub struct JsonLinesHost<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesHost<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> HostChannel for JsonLinesHost<W> {
    fn notify(&mut self, event: HostEvent) {
        let line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to serialize host event {:?}: {}", event, e);
                return;
            }
        };
        if let Err(e) = writeln!(self.writer, "{}", line).and_then(|_| self.writer.flush()) {
            tracing::warn!("Failed to deliver host event: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        assert_eq!(
            serde_json::to_string(&HostEvent::Autosave).unwrap(),
            r#"{"event":"autosave"}"#
        );
        assert_eq!(
            serde_json::to_string(&HostEvent::Enter {
                text: "(+ 1 2)\n".to_string()
            })
            .unwrap(),
            r#"{"event":"enter","text":"(+ 1 2)\n"}"#
        );
    }

    #[test]
    fn test_to_script_escapes_text() {
        let event = HostEvent::Enter {
            text: "\"hi\"\n".to_string(),
        };
        assert_eq!(event.to_script("window.java"), r#"window.java.onenter("\"hi\"\n");"#);
        assert_eq!(HostEvent::Load.to_script("window.java"), "window.java.onload();");
    }

    #[test]
    fn test_json_lines_host_writes_one_line_per_event() {
        let mut host = JsonLinesHost::new(Vec::new());
        host.notify(HostEvent::Load);
        host.notify(HostEvent::Change);
        let out = String::from_utf8(host.into_inner()).unwrap();
        assert_eq!(out, "{\"event\":\"load\"}\n{\"event\":\"change\"}\n");
    }
}

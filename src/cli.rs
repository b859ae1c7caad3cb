//! Command-line arguments and script commands for the headless harness
//!
//! The harness mounts a session over an in-memory page and reads one command
//! per line from stdin. Host notifications are written to stdout as JSON lines.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use editor_bridge::EngineVariant;

/// Drive an editor session without a browser
#[derive(Parser, Debug)]
#[command(name = "editor-bridge", version, about = "Headless editor session harness")]
pub struct CliArgs {
    /// File whose contents seed the page
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Which editor widget to emulate
    #[arg(long, value_enum, default_value_t = VariantArg::Structured)]
    pub variant: VariantArg,

    /// Mount a console surface instead of an edit surface
    #[arg(long)]
    pub console: bool,

    /// Keep structure-aware features in console mode
    #[arg(long, requires = "console")]
    pub repl: bool,

    /// Config file (defaults to ~/.config/editor-bridge/config.yaml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VariantArg {
    Generic,
    Structured,
}

impl From<VariantArg> for EngineVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Generic => EngineVariant::Generic,
            VariantArg::Structured => EngineVariant::Structured,
        }
    }
}

/// One line of a harness script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    /// Keystroke edit appended to the buffer
    Type(String),
    /// Non-interactive whole-buffer replacement
    Program(String),
    Submit(String),
    /// Advance the clock
    Wait(u64),
    Init,
    Console { repl: bool },
    Undo,
    Redo,
    Clean,
    Status,
    Theme { dark: bool },
    Size(u32),
    InstaRepl { show: bool },
    Append(String),
    Select(Option<String>),
    Focus(Option<String>),
    Selected,
    Set(String),
    Get,
}

/// `\n` and `\t` escapes in script arguments
fn unescape(text: &str) -> String {
    text.replace("\\n", "\n").replace("\\t", "\t")
}

fn optional_text(rest: &str) -> Option<String> {
    if rest.is_empty() {
        None
    } else {
        Some(unescape(rest))
    }
}

impl ScriptCommand {
    /// Parse one script line. Blank lines and `#` comments yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(' ') {
            Some((word, rest)) => (word, rest),
            None => (line, ""),
        };

        let command = match word {
            "type" => ScriptCommand::Type(unescape(rest)),
            "program" => ScriptCommand::Program(unescape(rest)),
            "submit" => ScriptCommand::Submit(unescape(rest)),
            "wait" => ScriptCommand::Wait(
                rest.trim()
                    .parse()
                    .map_err(|e| format!("Invalid wait '{}': {}", rest, e))?,
            ),
            "init" => ScriptCommand::Init,
            "console" => match rest.trim() {
                "" | "plain" => ScriptCommand::Console { repl: false },
                "repl" => ScriptCommand::Console { repl: true },
                other => return Err(format!("Unknown console mode '{}'", other)),
            },
            "undo" => ScriptCommand::Undo,
            "redo" => ScriptCommand::Redo,
            "clean" => ScriptCommand::Clean,
            "status" => ScriptCommand::Status,
            "theme" => match rest.trim() {
                "dark" => ScriptCommand::Theme { dark: true },
                "light" => ScriptCommand::Theme { dark: false },
                other => return Err(format!("Unknown theme '{}'", other)),
            },
            "size" => ScriptCommand::Size(
                rest.trim()
                    .parse()
                    .map_err(|e| format!("Invalid size '{}': {}", rest, e))?,
            ),
            "instarepl" => match rest.trim() {
                "on" => ScriptCommand::InstaRepl { show: true },
                "off" => ScriptCommand::InstaRepl { show: false },
                other => return Err(format!("Expected on/off, got '{}'", other)),
            },
            "append" => ScriptCommand::Append(unescape(rest)),
            "select" => ScriptCommand::Select(optional_text(rest)),
            "focus" => ScriptCommand::Focus(optional_text(rest)),
            "selected" => ScriptCommand::Selected,
            "set" => ScriptCommand::Set(unescape(rest)),
            "get" => ScriptCommand::Get,
            other => return Err(format!("Unknown command '{}'", other)),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(ScriptCommand::parse("").unwrap(), None);
        assert_eq!(ScriptCommand::parse("   ").unwrap(), None);
        assert_eq!(ScriptCommand::parse("# note").unwrap(), None);
    }

    #[test]
    fn test_type_keeps_spaces_and_unescapes() {
        assert_eq!(
            ScriptCommand::parse("type (defn f [x]\\n  x)").unwrap(),
            Some(ScriptCommand::Type("(defn f [x]\n  x)".to_string()))
        );
    }

    #[test]
    fn test_wait_and_size() {
        assert_eq!(
            ScriptCommand::parse("wait 1000").unwrap(),
            Some(ScriptCommand::Wait(1000))
        );
        assert_eq!(
            ScriptCommand::parse("size 14").unwrap(),
            Some(ScriptCommand::Size(14))
        );
        assert!(ScriptCommand::parse("wait soon").is_err());
    }

    #[test]
    fn test_select_without_text_clears() {
        assert_eq!(
            ScriptCommand::parse("select").unwrap(),
            Some(ScriptCommand::Select(None))
        );
    }

    #[test]
    fn test_toggles() {
        assert_eq!(
            ScriptCommand::parse("instarepl on").unwrap(),
            Some(ScriptCommand::InstaRepl { show: true })
        );
        assert_eq!(
            ScriptCommand::parse("theme dark").unwrap(),
            Some(ScriptCommand::Theme { dark: true })
        );
        assert_eq!(
            ScriptCommand::parse("console repl").unwrap(),
            Some(ScriptCommand::Console { repl: true })
        );
        assert!(ScriptCommand::parse("instarepl maybe").is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert!(ScriptCommand::parse("explode").is_err());
    }

    #[test]
    fn test_variant_conversion() {
        assert_eq!(
            EngineVariant::from(VariantArg::Generic),
            EngineVariant::Generic
        );
    }
}

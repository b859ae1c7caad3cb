//! Headless harness for the editor session bridge

use std::io::{self, BufRead};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use editor_bridge::engine::{EngineVariant, HeadlessFactory};
use editor_bridge::host::JsonLinesHost;
use editor_bridge::{BridgeConfig, MemoryDocument, Session};

mod cli;

use cli::{CliArgs, ScriptCommand};

type HarnessSession = Session<MemoryDocument, HeadlessFactory, JsonLinesHost<io::Stdout>>;

fn main() -> Result<()> {
    editor_bridge::tracing::init();

    let args = CliArgs::parse();

    let text = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => String::new(),
    };

    let mut config = match &args.config {
        Some(path) => BridgeConfig::load_from(path),
        None => BridgeConfig::load(),
    };
    // The harness exists to show notifications
    config.notify_host = true;

    let variant = EngineVariant::from(args.variant);
    let document = match variant {
        EngineVariant::Generic => MemoryDocument::generic_page(&text),
        EngineVariant::Structured => MemoryDocument::structured_page(&text),
    };
    let mut session = Session::new(
        document,
        HeadlessFactory::new(variant),
        JsonLinesHost::new(io::stdout()),
        config,
    );

    let mut now = Instant::now();
    session.on_load();
    if args.console {
        session.init_console(args.repl);
    }

    for (index, line) in io::stdin().lock().lines().enumerate() {
        let line = line.context("Failed to read command")?;
        match ScriptCommand::parse(&line) {
            Ok(Some(command)) => {
                if let ScriptCommand::Wait(ms) = command {
                    now += Duration::from_millis(ms);
                } else {
                    run(&mut session, command);
                }
                session.tick(now);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("line {}: {}", index + 1, e);
                println!("{}", json!({ "error": e, "line": index + 1 }));
            }
        }
    }

    Ok(())
}

fn run(session: &mut HarnessSession, command: ScriptCommand) {
    let engine = session.factory().active().cloned();
    match command {
        ScriptCommand::Type(text) => {
            if let Some(engine) = engine {
                engine.type_text(&text);
            }
        }
        ScriptCommand::Program(text) => {
            if let Some(engine) = engine {
                engine.replace_all(&text);
            }
        }
        ScriptCommand::Submit(text) => {
            if let Some(engine) = engine {
                engine.submit(&text);
            }
        }
        ScriptCommand::Select(text) => {
            if let Some(engine) = engine {
                engine.set_selection(text.as_deref());
            }
        }
        ScriptCommand::Focus(text) => {
            if let Some(engine) = engine {
                engine.set_focused_form(text.as_deref());
            }
        }
        ScriptCommand::Wait(_) => {}
        ScriptCommand::Init => session.init(),
        ScriptCommand::Console { repl } => session.init_console(repl),
        ScriptCommand::Undo => session.undo(),
        ScriptCommand::Redo => session.redo(),
        ScriptCommand::Clean => session.mark_clean(),
        ScriptCommand::Theme { dark } => session.change_theme(dark),
        ScriptCommand::Size(size) => session.set_text_size(size),
        ScriptCommand::InstaRepl { show: true } => session.show_insta_repl(),
        ScriptCommand::InstaRepl { show: false } => session.hide_insta_repl(),
        ScriptCommand::Append(text) => session.append(&text),
        ScriptCommand::Set(text) => session.set_text_content(&text),
        ScriptCommand::Status => println!(
            "{}",
            json!({
                "clean": session.is_clean(),
                "can_undo": session.can_undo(),
                "can_redo": session.can_redo(),
                "generation": session.generation(),
            })
        ),
        ScriptCommand::Get => println!("{}", json!({ "text": session.get_text_content() })),
        ScriptCommand::Selected => {
            println!("{}", json!({ "selected": session.get_selected_text() }))
        }
    }
}

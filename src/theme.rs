//! Theme switching for the embedded editors
//!
//! The generic editor takes its theme as an engine option. The structure-aware
//! editor is themed by whichever stylesheet is linked in the page head.

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::engine::EditorEngine;

/// How a theme change reaches the rendered editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeStrategy {
    /// Set the theme option on the live engine instance
    EngineOption,
    /// Replace the single stylesheet link in the document head
    StylesheetSwap,
}

/// Theme names for both strategies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default = "default_engine_dark")]
    pub engine_dark: String,
    #[serde(default = "default_engine_light")]
    pub engine_light: String,
    #[serde(default = "default_stylesheet_dark")]
    pub stylesheet_dark: String,
    #[serde(default = "default_stylesheet_light")]
    pub stylesheet_light: String,
}

fn default_engine_dark() -> String {
    "lesser-dark".to_string()
}

fn default_engine_light() -> String {
    "default".to_string()
}

fn default_stylesheet_dark() -> String {
    "paren-soup-dark.css".to_string()
}

fn default_stylesheet_light() -> String {
    "paren-soup-light.css".to_string()
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            engine_dark: default_engine_dark(),
            engine_light: default_engine_light(),
            stylesheet_dark: default_stylesheet_dark(),
            stylesheet_light: default_stylesheet_light(),
        }
    }
}

impl ThemeConfig {
    /// Theme name or stylesheet href for the given strategy
    pub fn resolve(&self, strategy: ThemeStrategy, is_dark: bool) -> &str {
        match (strategy, is_dark) {
            (ThemeStrategy::EngineOption, true) => &self.engine_dark,
            (ThemeStrategy::EngineOption, false) => &self.engine_light,
            (ThemeStrategy::StylesheetSwap, true) => &self.stylesheet_dark,
            (ThemeStrategy::StylesheetSwap, false) => &self.stylesheet_light,
        }
    }
}

impl ThemeStrategy {
    /// Apply a theme using this strategy.
    ///
    /// `engine` may be `None` before the first mount; the engine-option
    /// strategy then has nothing to act on.
    pub fn apply(
        self,
        config: &ThemeConfig,
        is_dark: bool,
        engine: Option<&mut (dyn EditorEngine + 'static)>,
        document: &mut dyn Document,
    ) {
        let name = config.resolve(self, is_dark);
        match self {
            ThemeStrategy::EngineOption => match engine {
                Some(engine) => engine.set_theme(name),
                None => tracing::debug!("No active editor, theme {} not applied", name),
            },
            ThemeStrategy::StylesheetSwap => document.replace_stylesheet(name),
        }
        tracing::debug!(strategy = ?self, theme = name, "Theme changed");
    }
}

//! Syntax markup engine.
//!
//! A table-driven registry maps file paths to language rules; the
//! colorizer styles one visible line slice at a time. The engine holds
//! no buffer state, just the active language and its resolved color
//! set, so the view can swap it per buffer switch.

mod colorize;
mod languages;
mod regions;

pub use languages::{LANGUAGES, LanguageMode, LanguageSyntax, detect};
pub use regions::{MAX_REGIONS, Region, RegionKind, find_exclusion_regions};

use cm_config::{ProgramDefaults, SyntaxColorSet};

#[derive(Debug, Default)]
pub struct MarkupEngine {
    syntax: Option<&'static LanguageSyntax>,
    colors: SyntaxColorSet,
    enabled: bool,
}

impl MarkupEngine {
    pub fn new(defaults: &ProgramDefaults) -> Self {
        Self {
            syntax: None,
            colors: defaults.syntax_colors("default"),
            enabled: defaults.colorize_syntax,
        }
    }

    /// Pick the language for a file path and resolve its color set.
    /// Unknown paths clear the language; such lines pass through the
    /// colorizer untouched.
    pub fn set_language_from_path(&mut self, path: &str, defaults: &ProgramDefaults) {
        self.syntax = detect(path);
        let key = self.language().key();
        self.colors = defaults.syntax_colors(key);
    }

    pub fn language(&self) -> LanguageMode {
        self.syntax.map(|s| s.mode).unwrap_or_default()
    }

    pub fn language_name(&self) -> &'static str {
        self.syntax.map(|s| s.name).unwrap_or("")
    }

    /// Colorize the visible slice of one line. The full line supplies
    /// context that may have scrolled out of the window.
    pub fn colorize(&self, full_line: &str, visible: &str) -> String {
        if !self.enabled {
            return visible.to_string();
        }
        colorize::colorize_line(self.syntax, &self.colors, full_line, visible)
    }
}

//! Program defaults: the `.cmrc` configuration file.
//!
//! The file is a JSON object, optionally preceded by `#` comment lines
//! which the loader strips. Unknown fields are ignored so configs from
//! newer builds still load. Per-language syntax color sets inherit
//! slot-by-slot from the `default` set. When no config exists a
//! bootstrap file with the true-color defaults is written.
//!
//! `ProgramDefaults` is resolved once at startup and passed by shared
//! reference to every component that looks colors up; nothing mutates
//! it afterwards.

pub mod color;

pub use color::RESET;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Syntax color slots for one language, resolved to SGR prefixes.
/// Empty prefix means "leave unstyled".
#[derive(Debug, Clone, Default)]
pub struct SyntaxColorSet {
    pub comment: String,
    pub include: String,
    pub keyword: String,
    pub r#type: String,
    pub constant: String,
    pub string: String,
    pub number: String,
    pub method_definition: String,
}

/// Resolved program defaults, immutable after startup.
#[derive(Debug, Clone)]
pub struct ProgramDefaults {
    pub tab_size: usize,
    pub jump_scroll: bool,
    pub show_line_numbers: bool,
    pub colorize_syntax: bool,
    pub live_status_lines: bool,
    pub auto_save_on_buffer_change: bool,

    pub status_bar_text: String,
    pub status_bar_background: String,
    pub line_number_text: String,
    pub command_line_message_text: String,

    default_syntax: SyntaxColorSet,
    syntax: BTreeMap<String, SyntaxColorSet>,
}

impl Default for ProgramDefaults {
    fn default() -> Self {
        // The bootstrap file is the source of truth for defaults; a
        // first run and a round-tripped config agree exactly.
        let json = strip_comment_lines(BOOTSTRAP);
        let file: ConfigFile = serde_json::from_str(&json).unwrap_or_default();
        file.resolve()
    }
}

impl ProgramDefaults {
    /// Load `path`, or write the bootstrap file there first when it
    /// does not exist yet.
    pub fn load_or_bootstrap(path: &Path) -> Result<Self> {
        if !path.exists() {
            write_bootstrap(path)?;
            info!(target: "config", path = %path.display(), "wrote bootstrap defaults");
        }
        Self::load(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let json = strip_comment_lines(&raw);
        let file: ConfigFile = serde_json::from_str(&json)
            .with_context(|| format!("parsing {}", path.display()))?;
        info!(target: "config", path = %path.display(), "loaded defaults");
        Ok(file.resolve())
    }

    /// `$HOME/.cmrc`.
    pub fn default_path() -> PathBuf {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_default()
            .join(".cmrc")
    }

    /// Color set for a language key (`"c"`, `"cpp"`, `"python"`, ...).
    /// Slots missing from the per-language entry inherit from
    /// `default`; unknown keys get the default set outright.
    pub fn syntax_colors(&self, lang_key: &str) -> SyntaxColorSet {
        match self.syntax.get(lang_key) {
            Some(set) => {
                let base = &self.default_syntax;
                let pick = |s: &String, fallback: &String| {
                    if s.is_empty() { fallback.clone() } else { s.clone() }
                };
                SyntaxColorSet {
                    comment: pick(&set.comment, &base.comment),
                    include: pick(&set.include, &base.include),
                    keyword: pick(&set.keyword, &base.keyword),
                    r#type: pick(&set.r#type, &base.r#type),
                    constant: pick(&set.constant, &base.constant),
                    string: pick(&set.string, &base.string),
                    number: pick(&set.number, &base.number),
                    method_definition: pick(&set.method_definition, &base.method_definition),
                }
            }
            None => self.default_syntax.clone(),
        }
    }
}

/// Drop leading `#` comment lines (and blanks) before the JSON object.
fn strip_comment_lines(raw: &str) -> String {
    raw.lines()
        .skip_while(|l| {
            let t = l.trim_start();
            t.is_empty() || t.starts_with('#')
        })
        .collect::<Vec<_>>()
        .join("\n")
}

//-------------------------------------------------------------------
// On-disk schema
//-------------------------------------------------------------------

fn default_tabs() -> usize {
    4
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfigFile {
    tabs: usize,
    jumpscroll: bool,
    #[serde(rename = "showLineNumbers")]
    show_line_numbers: bool,
    #[serde(rename = "colorizeSyntax")]
    colorize_syntax: bool,
    #[serde(rename = "liveStatusLines")]
    live_status_lines: bool,
    #[serde(rename = "autoSaveOnBufferChange")]
    auto_save_on_buffer_change: bool,
    colors: UiColors,
    #[serde(rename = "syntaxColors")]
    syntax_colors: BTreeMap<String, SyntaxColors>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        ConfigFile {
            tabs: default_tabs(),
            jumpscroll: default_true(),
            show_line_numbers: default_true(),
            colorize_syntax: default_true(),
            live_status_lines: default_true(),
            auto_save_on_buffer_change: false,
            colors: UiColors::default(),
            syntax_colors: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UiColors {
    #[serde(rename = "statusBarTextColor")]
    status_bar_text: String,
    #[serde(rename = "statusBarBackgroundColor")]
    status_bar_background: String,
    #[serde(rename = "lineNumberTextColor")]
    line_number_text: String,
    #[serde(rename = "commandLineMessageTextColor")]
    command_line_message_text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SyntaxColors {
    #[serde(rename = "commentTextColor")]
    comment: String,
    #[serde(rename = "includeTextColor")]
    include: String,
    #[serde(rename = "keywordTextColor")]
    keyword: String,
    #[serde(rename = "typeTextColor")]
    r#type: String,
    #[serde(rename = "constantTextColor")]
    constant: String,
    #[serde(rename = "stringTextColor")]
    string: String,
    #[serde(rename = "numberTextColor")]
    number: String,
    #[serde(rename = "methodDefinitionTextColor")]
    method_definition: String,
}

impl SyntaxColors {
    fn resolve(&self) -> SyntaxColorSet {
        SyntaxColorSet {
            comment: color::fg_prefix(&self.comment),
            include: color::fg_prefix(&self.include),
            keyword: color::fg_prefix(&self.keyword),
            r#type: color::fg_prefix(&self.r#type),
            constant: color::fg_prefix(&self.constant),
            string: color::fg_prefix(&self.string),
            number: color::fg_prefix(&self.number),
            method_definition: color::fg_prefix(&self.method_definition),
        }
    }
}

impl ConfigFile {
    fn resolve(self) -> ProgramDefaults {
        let tab_size = match self.tabs {
            2 | 4 | 8 => self.tabs,
            _ => 4,
        };
        let default_syntax = self
            .syntax_colors
            .get("default")
            .map(SyntaxColors::resolve)
            .unwrap_or_default();
        let syntax = self
            .syntax_colors
            .iter()
            .filter(|(k, _)| k.as_str() != "default")
            .map(|(k, v)| (k.clone(), v.resolve()))
            .collect();
        ProgramDefaults {
            tab_size,
            jump_scroll: self.jumpscroll,
            show_line_numbers: self.show_line_numbers,
            colorize_syntax: self.colorize_syntax,
            live_status_lines: self.live_status_lines,
            auto_save_on_buffer_change: self.auto_save_on_buffer_change,
            status_bar_text: color::fg_prefix(&self.colors.status_bar_text),
            status_bar_background: color::bg_prefix(&self.colors.status_bar_background),
            line_number_text: color::fg_prefix(&self.colors.line_number_text),
            command_line_message_text: color::fg_prefix(&self.colors.command_line_message_text),
            default_syntax,
            syntax,
        }
    }
}

//-------------------------------------------------------------------
// Bootstrap
//-------------------------------------------------------------------

const BOOTSTRAP: &str = r#"# .cmrc defaults file
# Uses RGB true color - requires 24-bit color terminal support
# color syntax is ANSI:<name>, XTERM256:<index>, RGB:<R>,<G>,<B>
# --------------------------------------------------------------------------------

{
    "tabs": 4,
    "jumpscroll": true,
    "showLineNumbers": true,
    "colorizeSyntax": true,
    "liveStatusLines": true,
    "autoSaveOnBufferChange": false,

    "colors": {
        "statusBarTextColor": "RGB:250,250,245",
        "statusBarBackgroundColor": "RGB:60,70,100",
        "lineNumberTextColor": "RGB:100,100,110",
        "commandLineMessageTextColor": "RGB:180,150,220"
    },

    "syntaxColors": {
        "default": {
            "commentTextColor": "RGB:130,140,150",
            "includeTextColor": "RGB:255,150,130",
            "keywordTextColor": "RGB:200,150,255",
            "typeTextColor": "RGB:100,220,220",
            "constantTextColor": "RGB:255,180,100",
            "methodDefinitionTextColor": "RGB:130,220,130",
            "stringTextColor": "RGB:150,230,150",
            "numberTextColor": "RGB:180,220,255"
        },
        "c": {
        },
        "cpp": {
        },
        "swift": {
            "keywordTextColor": "RGB:255,120,130",
            "typeTextColor": "RGB:130,200,255",
            "constantTextColor": "RGB:255,200,100"
        },
        "python": {
            "keywordTextColor": "RGB:255,200,100",
            "methodDefinitionTextColor": "RGB:100,180,255"
        },
        "javascript": {
            "keywordTextColor": "RGB:255,150,180"
        }
    }
}
"#;

fn write_bootstrap(path: &Path) -> Result<()> {
    fs::write(path, BOOTSTRAP).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_parses_to_defaults() {
        let defaults = ProgramDefaults::default();
        assert_eq!(defaults.tab_size, 4);
        assert!(defaults.jump_scroll);
        assert!(defaults.show_line_numbers);
        assert!(defaults.colorize_syntax);
        assert!(!defaults.auto_save_on_buffer_change);
        assert!(!defaults.status_bar_text.is_empty());
    }

    #[test]
    fn comment_lines_are_stripped_before_parsing() {
        let raw = "# comment\n# another\n\n{\"tabs\": 8}";
        let json = strip_comment_lines(raw);
        let file: ConfigFile = serde_json::from_str(&json).unwrap();
        assert_eq!(file.resolve().tab_size, 8);
    }

    #[test]
    fn invalid_tab_size_falls_back_to_four() {
        let file: ConfigFile = serde_json::from_str("{\"tabs\": 3}").unwrap();
        assert_eq!(file.resolve().tab_size, 4);
    }

    #[test]
    fn per_language_sets_inherit_from_default() {
        let defaults = ProgramDefaults::default();
        let python = defaults.syntax_colors("python");
        let base = defaults.syntax_colors("default");
        // Overridden slot differs, inherited slot matches.
        assert_ne!(python.keyword, base.keyword);
        assert_eq!(python.string, base.string);
        assert_eq!(python.comment, base.comment);
        // Unknown language gets the default set.
        let unknown = defaults.syntax_colors("cobol");
        assert_eq!(unknown.keyword, base.keyword);
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let file: ConfigFile =
            serde_json::from_str("{\"tabs\": 2, \"futureKnob\": {\"x\": 1}}").unwrap();
        assert_eq!(file.resolve().tab_size, 2);
    }
}

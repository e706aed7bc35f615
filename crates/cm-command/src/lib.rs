//! Static command table and completion.
//!
//! Commands are rows in one table; the mode machine matches a
//! committed name to a [`CommandKind`] tag and dispatches in a single
//! `match`. Completion (prefix, dehyphenated, acronym) lives in
//! [`Completer`] and also serves the symbol child tables used by the
//! `utf-box` / `utf-symbol` commands.

mod completer;
mod symbols;

pub use completer::Completer;
pub use symbols::{SYMBOLS, SymbolEntry, find_symbol};

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CommandFlags: u8 {
        /// Command requires an argument.
        const NEEDS_ARG = 0x01;
        /// Argument is optional.
        const OPTIONAL_ARG = 0x02;
        /// Argument is a symbol name resolved via a child completer.
        const SYMBOL_ARG = 0x04;
    }
}

/// Dispatch tag; the editor owns the handler logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Find,
    Count,
    Entab,
    Detab,
    TrimTrailing,
    UtfBox,
    UtfSymbol,
    Replace,
    ReplaceAll,
    GotoLine,
    GotoError,
    Save,
    SaveAs,
    Load,
    BufferNext,
    BufferPrev,
    BufferNew,
    BufferList,
    Mark,
    Cut,
    Paste,
    ProjectList,
    Build,
    Split,
    Unsplit,
    Quit,
    Help,
}

/// One command table row.
#[derive(Debug)]
pub struct CommandEntry {
    pub name: &'static str,
    pub arg_hint: Option<&'static str>,
    pub description: &'static str,
    pub flags: CommandFlags,
    pub kind: CommandKind,
    /// Prefix filtering the symbol child table (`box-`, `sym-`).
    pub symbol_filter: Option<&'static str>,
}

const fn entry(
    name: &'static str,
    arg_hint: Option<&'static str>,
    description: &'static str,
    flags: CommandFlags,
    kind: CommandKind,
    symbol_filter: Option<&'static str>,
) -> CommandEntry {
    CommandEntry {
        name,
        arg_hint,
        description,
        flags,
        kind,
        symbol_filter,
    }
}

pub static COMMANDS: &[CommandEntry] = &[
    // Find commands
    entry(
        "find",
        Some("<pattern>"),
        "Search for text in buffer",
        CommandFlags::NEEDS_ARG,
        CommandKind::Find,
        None,
    ),
    // Buffer info commands
    entry(
        "wc",
        None,
        "Count lines and characters in buffer",
        CommandFlags::empty(),
        CommandKind::Count,
        None,
    ),
    // Tab conversion commands
    entry(
        "entab",
        None,
        "Convert leading spaces to tabs",
        CommandFlags::empty(),
        CommandKind::Entab,
        None,
    ),
    entry(
        "detab",
        None,
        "Convert tabs to spaces",
        CommandFlags::empty(),
        CommandKind::Detab,
        None,
    ),
    entry(
        "trim-trailing",
        None,
        "Strip trailing whitespace from every line",
        CommandFlags::empty(),
        CommandKind::TrimTrailing,
        None,
    ),
    // UTF symbol insertion
    entry(
        "utf-box",
        Some("<symbol>"),
        "Insert box drawing symbol (TAB for completion)",
        CommandFlags::NEEDS_ARG.union(CommandFlags::SYMBOL_ARG),
        CommandKind::UtfBox,
        Some("box-"),
    ),
    entry(
        "utf-symbol",
        Some("<symbol>"),
        "Insert common symbol (TAB for completion)",
        CommandFlags::NEEDS_ARG.union(CommandFlags::SYMBOL_ARG),
        CommandKind::UtfSymbol,
        Some("sym-"),
    ),
    // Replace commands
    entry(
        "replace",
        Some("<replacement>"),
        "Replace next occurrence (uses last find)",
        CommandFlags::NEEDS_ARG,
        CommandKind::Replace,
        None,
    ),
    entry(
        "replace-all",
        Some("<replacement>"),
        "Replace all occurrences (uses last find)",
        CommandFlags::NEEDS_ARG,
        CommandKind::ReplaceAll,
        None,
    ),
    // Navigation commands
    entry(
        "goto-line",
        Some("<line>"),
        "Go to specified line number",
        CommandFlags::NEEDS_ARG,
        CommandKind::GotoLine,
        None,
    ),
    entry(
        "goto-error",
        None,
        "Jump to first error in build output",
        CommandFlags::empty(),
        CommandKind::GotoError,
        None,
    ),
    // File commands
    entry(
        "save",
        Some("[filename]"),
        "Save current buffer",
        CommandFlags::OPTIONAL_ARG,
        CommandKind::Save,
        None,
    ),
    entry(
        "save-as",
        Some("<filename>"),
        "Save buffer to new file",
        CommandFlags::NEEDS_ARG,
        CommandKind::SaveAs,
        None,
    ),
    entry(
        "load",
        Some("<filename>"),
        "Load file into new buffer",
        CommandFlags::NEEDS_ARG,
        CommandKind::Load,
        None,
    ),
    // Buffer commands
    entry(
        "buffer-next",
        None,
        "Switch to next buffer",
        CommandFlags::empty(),
        CommandKind::BufferNext,
        None,
    ),
    entry(
        "buffer-prev",
        None,
        "Switch to previous buffer",
        CommandFlags::empty(),
        CommandKind::BufferPrev,
        None,
    ),
    entry(
        "buffer-new",
        Some("<filename>"),
        "Create new buffer",
        CommandFlags::NEEDS_ARG,
        CommandKind::BufferNew,
        None,
    ),
    entry(
        "buffer-list",
        None,
        "Show project/buffer list",
        CommandFlags::empty(),
        CommandKind::BufferList,
        None,
    ),
    // Mark and cut/paste commands
    entry(
        "mark",
        None,
        "Set mark at cursor position",
        CommandFlags::empty(),
        CommandKind::Mark,
        None,
    ),
    entry(
        "cut",
        None,
        "Cut from mark to cursor",
        CommandFlags::empty(),
        CommandKind::Cut,
        None,
    ),
    entry(
        "paste",
        None,
        "Paste from cut buffer",
        CommandFlags::empty(),
        CommandKind::Paste,
        None,
    ),
    // Project commands
    entry(
        "project-list",
        None,
        "Show project file list",
        CommandFlags::empty(),
        CommandKind::ProjectList,
        None,
    ),
    entry(
        "project-build",
        Some("[target]"),
        "Run project build and show output",
        CommandFlags::OPTIONAL_ARG,
        CommandKind::Build,
        None,
    ),
    // Split screen commands
    entry(
        "split",
        None,
        "Split screen horizontally",
        CommandFlags::empty(),
        CommandKind::Split,
        None,
    ),
    entry(
        "unsplit",
        None,
        "Return to single view",
        CommandFlags::empty(),
        CommandKind::Unsplit,
        None,
    ),
    // Application commands
    entry(
        "quit",
        None,
        "Quit editor",
        CommandFlags::empty(),
        CommandKind::Quit,
        None,
    ),
    entry(
        "help",
        None,
        "Show help screen",
        CommandFlags::empty(),
        CommandKind::Help,
        None,
    ),
];

/// Exact name lookup.
pub fn find_exact(name: &str) -> Option<&'static CommandEntry> {
    COMMANDS.iter().find(|c| c.name == name)
}

/// A completer over the command table names.
pub fn command_completer() -> Completer {
    Completer::new(COMMANDS.iter().map(|c| c.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_lookup_and_flags() {
        let find = find_exact("find").unwrap();
        assert!(find.flags.contains(CommandFlags::NEEDS_ARG));
        let save = find_exact("save").unwrap();
        assert!(save.flags.contains(CommandFlags::OPTIONAL_ARG));
        let utf = find_exact("utf-box").unwrap();
        assert!(utf.flags.contains(CommandFlags::SYMBOL_ARG));
        assert_eq!(utf.symbol_filter, Some("box-"));
        assert!(find_exact("nonesuch").is_none());
    }

    #[test]
    fn table_names_are_unique() {
        for (i, a) in COMMANDS.iter().enumerate() {
            for b in &COMMANDS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}

//! Symbol tables for `utf-box` and `utf-symbol`.
//!
//! Names are hyphenated so the completer's acronym rule works on them
//! too (`btl` completes `box-top-left`). The leading `box-` / `sym-`
//! segment is the child-completer filter.

#[derive(Debug)]
pub struct SymbolEntry {
    pub name: &'static str,
    pub ch: char,
    pub description: &'static str,
}

const fn sym(name: &'static str, ch: char, description: &'static str) -> SymbolEntry {
    SymbolEntry {
        name,
        ch,
        description,
    }
}

pub static SYMBOLS: &[SymbolEntry] = &[
    // Box drawing
    sym("box-horizontal", '─', "Horizontal line"),
    sym("box-vertical", '│', "Vertical line"),
    sym("box-top-left", '┌', "Top left corner"),
    sym("box-top-right", '┐', "Top right corner"),
    sym("box-bottom-left", '└', "Bottom left corner"),
    sym("box-bottom-right", '┘', "Bottom right corner"),
    sym("box-tee-left", '├', "Tee pointing right from left edge"),
    sym("box-tee-right", '┤', "Tee pointing left from right edge"),
    sym("box-tee-down", '┬', "Tee pointing down from top edge"),
    sym("box-tee-up", '┴', "Tee pointing up from bottom edge"),
    sym("box-cross", '┼', "Four-way intersection"),
    sym("box-double-horizontal", '═', "Double horizontal line"),
    sym("box-double-vertical", '║', "Double vertical line"),
    sym("box-double-top-left", '╔', "Double top left corner"),
    sym("box-double-top-right", '╗', "Double top right corner"),
    sym("box-double-bottom-left", '╚', "Double bottom left corner"),
    sym("box-double-bottom-right", '╝', "Double bottom right corner"),
    // Common symbols
    sym("sym-bullet", '•', "Bullet"),
    sym("sym-arrow-left", '←', "Left arrow"),
    sym("sym-arrow-right", '→', "Right arrow"),
    sym("sym-arrow-up", '↑', "Up arrow"),
    sym("sym-arrow-down", '↓', "Down arrow"),
    sym("sym-check", '✓', "Check mark"),
    sym("sym-cross", '✗', "Ballot cross"),
    sym("sym-degree", '°', "Degree sign"),
    sym("sym-ellipsis", '…', "Horizontal ellipsis"),
    sym("sym-copyright", '©', "Copyright sign"),
    sym("sym-plus-minus", '±', "Plus-minus sign"),
    sym("sym-not-equal", '≠', "Not equal"),
    sym("sym-less-equal", '≤', "Less than or equal"),
    sym("sym-greater-equal", '≥', "Greater than or equal"),
    sym("sym-pi", 'π', "Greek small pi"),
    sym("sym-lambda", 'λ', "Greek small lambda"),
];

/// Resolve a symbol name to its character.
pub fn find_symbol(name: &str) -> Option<char> {
    SYMBOLS.iter().find(|s| s.name == name).map(|s| s.ch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Completer;

    #[test]
    fn lookup_by_exact_name() {
        assert_eq!(find_symbol("box-cross"), Some('┼'));
        assert_eq!(find_symbol("sym-bullet"), Some('•'));
        assert_eq!(find_symbol("box-nope"), None);
    }

    #[test]
    fn child_completer_filters_by_prefix() {
        let boxes = Completer::filtered(SYMBOLS.iter().map(|s| s.name), "box-");
        let hits = boxes.find_matches("box-double");
        assert_eq!(hits.len(), 6);
        assert!(boxes.find_matches("sym-bullet").is_empty());
    }

    #[test]
    fn acronyms_work_on_symbol_names() {
        let boxes = Completer::filtered(SYMBOLS.iter().map(|s| s.name), "box-");
        assert_eq!(boxes.complete_prefix("bc"), "box-cross");
        // "btl" is ambiguous between box-top-left and box-tee-left;
        // completion stops at the shared stem.
        assert_eq!(boxes.complete_prefix("btl"), "box-t");
    }
}

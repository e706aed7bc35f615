//! Edit buffer model: line-structured text, cursor, mark, find state,
//! and the edit hints that drive minimum redraw.
//!
//! Invariants maintained by every public operation:
//! * A buffer always holds at least one line (possibly empty).
//! * `cursor.row < line_count()` and `cursor.col <= char_count(cursor.row)`.
//!   The one-past-end column is the insertion point after the line's last
//!   character, not including the newline.
//! * `touched` is true exactly when content differs from the last
//!   load/save baseline.
//!
//! Mutations either succeed and report an [`EditHint`], or reject the
//! input with `EditHint::None` and no state change (backspace at the
//! buffer start, cut with no mark set). File I/O failures surface as
//! [`EditorError`] without leaving the buffer partially updated.

mod buffer;
mod list;

pub use buffer::{EditBuffer, FindState};
pub use list::{BufferId, BufferList};

use thiserror::Error;

/// A position inside a buffer: (row, column) where `col` is a character
/// index within the line, never a display column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn origin() -> Self {
        Self { row: 0, col: 0 }
    }
}

/// The minimum visible update a mutation requires.
///
/// The scopes widen in this order: nothing, the tail of one line, one
/// full line, everything from a point to the end of the viewport. A
/// rendering layer combines hints across a batch by taking the widest;
/// collapsing everything to a full repaint throws away the interactive
/// feel on slow terminals, so the distinction is kept deliberately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditHint {
    /// Cursor-only change; nothing to repaint.
    None,
    /// Repaint the single changed line in full.
    Line { row: usize },
    /// Repaint from `col` to the end of line `row`.
    LinePastPoint { row: usize, col: usize },
    /// Repaint from (`row`, `col`) to the end of the viewport.
    ScreenPastPoint { row: usize, col: usize },
}

impl EditHint {
    fn rank(&self) -> u8 {
        match self {
            EditHint::None => 0,
            EditHint::LinePastPoint { .. } => 1,
            EditHint::Line { .. } => 2,
            EditHint::ScreenPastPoint { .. } => 3,
        }
    }

    /// Anchor row of the hint, if it has one.
    pub fn row(&self) -> Option<usize> {
        match self {
            EditHint::None => None,
            EditHint::Line { row }
            | EditHint::LinePastPoint { row, .. }
            | EditHint::ScreenPastPoint { row, .. } => Some(*row),
        }
    }

    /// Combine two hints into the smallest scope covering both.
    /// Line-scoped hints on different rows widen to the screen scope
    /// anchored at the upper row.
    pub fn widen(self, other: EditHint) -> EditHint {
        match (self, other) {
            (EditHint::None, h) | (h, EditHint::None) => h,
            (a, b) => {
                let (ra, rb) = (a.row().unwrap_or(0), b.row().unwrap_or(0));
                let screen = matches!(a, EditHint::ScreenPastPoint { .. })
                    || matches!(b, EditHint::ScreenPastPoint { .. });
                if !screen && ra == rb {
                    if a.rank() >= b.rank() { a } else { b }
                } else {
                    let col = match (a, b) {
                        (
                            EditHint::ScreenPastPoint { row, col },
                            EditHint::ScreenPastPoint { row: r2, col: c2 },
                        ) => {
                            if row < r2 || (row == r2 && col <= c2) {
                                col
                            } else {
                                c2
                            }
                        }
                        _ => 0,
                    };
                    EditHint::ScreenPastPoint {
                        row: ra.min(rb),
                        col,
                    }
                }
            }
        }
    }
}

/// Failure taxonomy. Range rejections are not errors (they report
/// `EditHint::None`); everything here is either shown in the message
/// area or returned over the bridge.
#[derive(Debug, Error)]
pub enum EditorError {
    /// User-visible command failure (file not found, no mark set, ...).
    #[error("{0}")]
    Command(String),
    /// File I/O failure; on save, `touched` stays set so the user can
    /// retry.
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Bridge request failure, reported as an `ok:false` record.
    #[error("{0}")]
    Bridge(String),
}

pub type Result<T> = std::result::Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widen_takes_the_larger_scope_on_one_row() {
        let a = EditHint::LinePastPoint { row: 3, col: 7 };
        let b = EditHint::Line { row: 3 };
        assert_eq!(a.widen(b), EditHint::Line { row: 3 });
        assert_eq!(b.widen(a), EditHint::Line { row: 3 });
    }

    #[test]
    fn widen_across_rows_escalates_to_screen() {
        let a = EditHint::Line { row: 2 };
        let b = EditHint::Line { row: 5 };
        assert_eq!(a.widen(b), EditHint::ScreenPastPoint { row: 2, col: 0 });
    }

    #[test]
    fn widen_none_is_identity() {
        let h = EditHint::Line { row: 1 };
        assert_eq!(EditHint::None.widen(h), h);
        assert_eq!(h.widen(EditHint::None), h);
        assert_eq!(EditHint::None.widen(EditHint::None), EditHint::None);
    }

    #[test]
    fn widen_screen_hints_keeps_upper_anchor() {
        let a = EditHint::ScreenPastPoint { row: 4, col: 9 };
        let b = EditHint::ScreenPastPoint { row: 2, col: 3 };
        assert_eq!(a.widen(b), EditHint::ScreenPastPoint { row: 2, col: 3 });
    }
}

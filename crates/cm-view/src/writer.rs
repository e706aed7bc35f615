//! Terminal writer: queued primitive operations, flushed once.
//!
//! Views queue MoveTo / Print / Clear commands while formatting; one
//! flush per update keeps partial repaints atomic on screen. The same
//! queue renders to a string through crossterm's ANSI writer, which is
//! how the view tests observe output without a terminal.

use anyhow::Result;
use crossterm::{
    Command as _,
    cursor::MoveTo,
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::io::{Write, stdout};

#[derive(Debug)]
enum Command {
    MoveTo(u16, u16),
    Print(String),
    ClearToEol,
    ClearAll,
}

/// Short-lived per-update command queue. Positions are (column, row),
/// zero-based, matching crossterm.
#[derive(Debug, Default)]
pub struct Writer {
    cmds: Vec<Command>,
}

impl Writer {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }

    pub fn move_to(&mut self, col: u16, row: u16) {
        self.cmds.push(Command::MoveTo(col, row));
    }

    pub fn print<S: Into<String>>(&mut self, s: S) {
        let s: String = s.into();
        if !s.is_empty() {
            self.cmds.push(Command::Print(s));
        }
    }

    pub fn clear_to_eol(&mut self) {
        self.cmds.push(Command::ClearToEol);
    }

    pub fn clear_all(&mut self) {
        self.cmds.push(Command::ClearAll);
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Queue everything to stdout and flush once.
    pub fn flush(self) -> Result<()> {
        let mut out = stdout();
        for cmd in &self.cmds {
            match cmd {
                Command::MoveTo(col, row) => queue!(out, MoveTo(*col, *row))?,
                Command::Print(s) => queue!(out, Print(s))?,
                Command::ClearToEol => queue!(out, Clear(ClearType::UntilNewLine))?,
                Command::ClearAll => queue!(out, Clear(ClearType::All))?,
            }
        }
        out.flush()?;
        Ok(())
    }

    /// The exact byte stream `flush` would emit. Test-facing.
    pub fn to_ansi(&self) -> String {
        let mut out = String::new();
        for cmd in &self.cmds {
            match cmd {
                Command::MoveTo(col, row) => {
                    let _ = MoveTo(*col, *row).write_ansi(&mut out);
                }
                Command::Print(s) => out.push_str(s),
                Command::ClearToEol => {
                    let _ = Clear(ClearType::UntilNewLine).write_ansi(&mut out);
                }
                Command::ClearAll => {
                    let _ = Clear(ClearType::All).write_ansi(&mut out);
                }
            }
        }
        out
    }
}

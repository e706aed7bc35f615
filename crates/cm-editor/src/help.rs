//! Help view content, generated from the live tables so it never
//! drifts from what the editor actually binds.

use crate::control::{CONTROL_COMMANDS, CTRL_X_COMMANDS};
use cm_command::COMMANDS;

pub fn help_lines() -> Vec<String> {
    let mut out = Vec::new();
    out.push("cm - terminal text editor".to_string());
    out.push(String::new());
    out.push("Press <esc> to open the command line; TAB completes".to_string());
    out.push("command names (prefixes, dehyphenated prefixes, and".to_string());
    out.push("acronyms all match: bl -> buffer-list).".to_string());
    out.push(String::new());

    out.push("Commands".to_string());
    out.push("--------".to_string());
    for cmd in COMMANDS {
        let arg = cmd.arg_hint.unwrap_or("");
        out.push(format!("  {:<14} {:<13} {}", cmd.name, arg, cmd.description));
    }

    out.push(String::new());
    out.push("Control keys".to_string());
    out.push("------------".to_string());
    for row in CONTROL_COMMANDS {
        out.push(format!("  C-{}   {}", row.tag, row.op.describe()));
    }
    for row in CTRL_X_COMMANDS {
        out.push(format!("  C-x C-{}   {}", row.tag, row.op.describe()));
    }
    out.push(String::new());
    out.push("<esc> leaves any modal view.".to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_covers_every_command_and_chord() {
        let text = help_lines().join("\n");
        for cmd in COMMANDS {
            assert!(text.contains(cmd.name), "missing {}", cmd.name);
        }
        assert!(text.contains("C-X") || text.contains("C-x"));
        assert!(text.contains("buffer-list"));
    }
}

//! Color specification parsing and SGR sequence construction.
//!
//! Config values look like `ANSI:<name>`, `XTERM256:<index>`, or
//! `RGB:<r>,<g>,<b>`. Parsed colors resolve to the escape prefix that
//! selects them, built through crossterm's ANSI writer so the byte
//! sequences stay consistent with the rest of the terminal output.

use crossterm::Command;
use crossterm::style::{Color, SetBackgroundColor, SetForegroundColor};

/// Attribute reset, appended after every styled span.
pub const RESET: &str = "\x1b[0m";

/// Parse a color value from the config file. A missing selector or an
/// unrecognized name yields `None` (no styling), matching the editor's
/// tolerance for partial color configs.
pub fn parse_color(spec: &str) -> Option<Color> {
    let (selector, rest) = spec.split_once(':')?;
    match selector.trim().to_ascii_uppercase().as_str() {
        "ANSI" => ansi_by_name(rest.trim()),
        "XTERM256" => rest.trim().parse::<u8>().ok().map(Color::AnsiValue),
        "RGB" => {
            let mut parts = rest.split(',').map(|p| p.trim().parse::<u8>());
            let r = parts.next()?.ok()?;
            let g = parts.next()?.ok()?;
            let b = parts.next()?.ok()?;
            Some(Color::Rgb { r, g, b })
        }
        _ => None,
    }
}

fn ansi_by_name(name: &str) -> Option<Color> {
    let color = match name.to_ascii_uppercase().as_str() {
        "BLACK" => Color::Black,
        "RED" => Color::DarkRed,
        "GREEN" => Color::DarkGreen,
        "YELLOW" => Color::DarkYellow,
        "BLUE" => Color::DarkBlue,
        "MAGENTA" => Color::DarkMagenta,
        "CYAN" => Color::DarkCyan,
        "WHITE" => Color::Grey,
        "BRIGHT_BLACK" => Color::DarkGrey,
        "BRIGHT_RED" => Color::Red,
        "BRIGHT_GREEN" => Color::Green,
        "BRIGHT_YELLOW" => Color::Yellow,
        "BRIGHT_BLUE" => Color::Blue,
        "BRIGHT_MAGENTA" => Color::Magenta,
        "BRIGHT_CYAN" => Color::Cyan,
        "BRIGHT_WHITE" => Color::White,
        _ => return None,
    };
    Some(color)
}

fn command_sequence(cmd: impl Command) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = cmd.write_ansi(&mut out);
    out
}

/// Foreground-select escape prefix for a config value; empty string
/// when the value does not parse.
pub fn fg_prefix(spec: &str) -> String {
    parse_color(spec)
        .map(|c| command_sequence(SetForegroundColor(c)))
        .unwrap_or_default()
}

/// Background-select escape prefix for a config value.
pub fn bg_prefix(spec: &str) -> String {
    parse_color(spec)
        .map(|c| command_sequence(SetBackgroundColor(c)))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_three_selector_forms() {
        assert_eq!(parse_color("ANSI:BRIGHT_WHITE"), Some(Color::White));
        assert_eq!(parse_color("XTERM256:42"), Some(Color::AnsiValue(42)));
        assert_eq!(
            parse_color("RGB:200,150,255"),
            Some(Color::Rgb {
                r: 200,
                g: 150,
                b: 255
            })
        );
    }

    #[test]
    fn bad_specs_yield_none() {
        assert_eq!(parse_color("nocolon"), None);
        assert_eq!(parse_color("ANSI:CHARTREUSE"), None);
        assert_eq!(parse_color("RGB:1,2"), None);
        assert_eq!(parse_color("XTERM256:900"), None);
    }

    #[test]
    fn rgb_prefix_is_a_truecolor_sgr() {
        let seq = fg_prefix("RGB:1,2,3");
        assert_eq!(seq, "\x1b[38;2;1;2;3m");
        let seq = bg_prefix("RGB:1,2,3");
        assert_eq!(seq, "\x1b[48;2;1;2;3m");
    }

    #[test]
    fn unparseable_prefix_is_empty() {
        assert_eq!(fg_prefix("bogus"), "");
    }
}

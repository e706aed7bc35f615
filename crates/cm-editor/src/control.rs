//! Control-key dispatch tables.
//!
//! Tables are (tag, enum, message) rows; one dispatcher match in the
//! editor interprets the enum. The C-X prefix reads a second chord
//! against its own table; unknown combinations are silently ignored.

/// Single-chord control operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOp {
    ToggleJumpScroll,
    FindAgain,
    ReplaceAgain,
    ToggleLineNumbers,
    Cut,
    PageDown,
    PageUp,
    CutToEndOfLine,
    Paste,
    NextBuffer,
    ProjectList,
    UpdateScreen,
    ShowBuild,
    SwitchView,
    Help,
}

impl ControlOp {
    pub fn describe(self) -> &'static str {
        match self {
            ControlOp::ToggleJumpScroll => "Toggle jump scrolling",
            ControlOp::FindAgain => "Repeat last find",
            ControlOp::ReplaceAgain => "Replace at match, then find next",
            ControlOp::ToggleLineNumbers => "Toggle line numbers",
            ControlOp::Cut => "Cut from mark to cursor",
            ControlOp::PageDown => "Page down",
            ControlOp::PageUp => "Page up",
            ControlOp::CutToEndOfLine => "Cut to end of line",
            ControlOp::Paste => "Paste the cut buffer",
            ControlOp::NextBuffer => "Switch to next buffer",
            ControlOp::ProjectList => "Show project file list",
            ControlOp::UpdateScreen => "Repaint the screen",
            ControlOp::ShowBuild => "Show build output",
            ControlOp::SwitchView => "Switch active view when split",
            ControlOp::Help => "Show help",
        }
    }
}

/// C-X prefix operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlXOp {
    Save,
    Quit,
}

impl CtrlXOp {
    pub fn describe(self) -> &'static str {
        match self {
            CtrlXOp::Save => "Save current buffer",
            CtrlXOp::Quit => "Quit editor",
        }
    }
}

pub struct ControlCmd {
    pub tag: char,
    pub op: ControlOp,
    pub message: Option<&'static str>,
}

const fn ctl(tag: char, op: ControlOp, message: Option<&'static str>) -> ControlCmd {
    ControlCmd { tag, op, message }
}

pub static CONTROL_COMMANDS: &[ControlCmd] = &[
    ctl('J', ControlOp::ToggleJumpScroll, None),
    ctl('F', ControlOp::FindAgain, None),
    ctl('R', ControlOp::ReplaceAgain, None),
    ctl('L', ControlOp::ToggleLineNumbers, None),
    ctl('W', ControlOp::Cut, Some("(text cut)")),
    ctl('V', ControlOp::PageDown, Some("(paged down)")),
    ctl('Z', ControlOp::PageUp, Some("(paged up)")),
    ctl('K', ControlOp::CutToEndOfLine, Some("(text cut to end of line)")),
    ctl('Y', ControlOp::Paste, Some("(text pasted)")),
    ctl('N', ControlOp::NextBuffer, Some("(next buffer)")),
    ctl('P', ControlOp::ProjectList, Some("(Project List)")),
    ctl('U', ControlOp::UpdateScreen, Some("(Update Screen)")),
    ctl('B', ControlOp::ShowBuild, Some("(Build)")),
    ctl('O', ControlOp::SwitchView, Some("(switch view)")),
    ctl('_', ControlOp::Help, Some("(Help)")),
];

pub struct CtrlXCmd {
    pub tag: char,
    pub op: CtrlXOp,
}

pub static CTRL_X_COMMANDS: &[CtrlXCmd] = &[
    CtrlXCmd {
        tag: 'S',
        op: CtrlXOp::Save,
    },
    CtrlXCmd {
        tag: 'C',
        op: CtrlXOp::Quit,
    },
];

pub fn lookup_control(tag: char) -> Option<&'static ControlCmd> {
    CONTROL_COMMANDS.iter().find(|c| c.tag == tag)
}

pub fn lookup_ctrl_x(tag: char) -> Option<&'static CtrlXCmd> {
    CTRL_X_COMMANDS.iter().find(|c| c.tag == tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_resolve_to_their_operations() {
        assert_eq!(lookup_control('K').unwrap().op, ControlOp::CutToEndOfLine);
        assert_eq!(lookup_control('_').unwrap().op, ControlOp::Help);
        assert!(lookup_control('Q').is_none());
        assert_eq!(lookup_ctrl_x('S').unwrap().op, CtrlXOp::Save);
        assert_eq!(lookup_ctrl_x('C').unwrap().op, CtrlXOp::Quit);
        assert!(lookup_ctrl_x('Z').is_none());
    }
}

//! Views: the edit viewport, the command line, and the modal panes.
//!
//! Views own presentation state only. They borrow buffers for the
//! duration of one operation, queue output into a [`Writer`], and
//! report status enums upward; the mode router decides what happens
//! next.

mod command_line;
mod edit_view;
mod pane;
mod writer;

pub use command_line::CommandLineView;
pub use edit_view::{EditStatus, EditView};
pub use pane::{PaneStatus, TextPane};
pub use writer::Writer;

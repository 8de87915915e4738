pub mod apply;
pub mod check;
pub mod shape;

pub use apply::{apply_command, configure_project};
pub use check::check_command;
pub use shape::shape_command;

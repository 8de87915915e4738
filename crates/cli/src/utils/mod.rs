pub mod file;

pub use file::{BuildLocation, find_build_files, locate_build_file};

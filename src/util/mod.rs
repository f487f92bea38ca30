// Utility Module

pub mod file_ops;

pub use file_ops::{format_file_size, read_file, read_input, write_file, write_output};

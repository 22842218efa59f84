//! Utility modules for koules_dynamics

pub mod matrix_io;

pub use matrix_io::{read_matrix, write_matrix};

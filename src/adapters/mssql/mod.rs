//! Direct SQL Server access ("Maze")

pub mod client;
pub mod rows;

pub use client::MssqlClient;
pub use rows::{column_value, row_to_map, student_projection};

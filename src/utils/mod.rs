//! Utility functions and types

pub(crate) mod parallel;
pub mod frame;

pub use parallel::{ParallelConfig, try_parallel_map};
pub use frame::{column_to_array1, columns_to_array2};

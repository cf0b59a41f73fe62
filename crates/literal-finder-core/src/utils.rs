//! Utility functions for resolver implementations.

pub mod paths;

#[doc(inline)]
pub use paths::{join_path, last_segment, path_to_segments, unraw};

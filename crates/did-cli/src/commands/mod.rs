//! Command implementations.

pub mod check;
pub mod log;
pub mod summary;
pub mod util;

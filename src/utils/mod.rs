//! Common utilities and helpers

pub mod path;
pub mod time;

pub use path::PathUtils;
pub use time::TimeParser;

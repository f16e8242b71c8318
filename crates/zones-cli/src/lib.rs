//! Library surface of the `zones` command-line tool.

pub mod config;
pub mod logging;
pub mod pipeline;

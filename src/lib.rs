#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod core;
pub mod driver;
pub mod error;
pub mod graph;
pub mod oracle;
pub mod render;
pub mod util;

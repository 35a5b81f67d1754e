//! Infrastructure adapters for IO, git, config, and external integrations.

pub mod clipboard;
pub mod config;
pub mod fs;
pub mod git;
pub mod logging;

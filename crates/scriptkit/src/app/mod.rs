//! Application layer orchestrating domain logic and infrastructure.

pub mod collect;
pub mod render;
pub mod scan;
pub mod submodule;
pub mod tokens;

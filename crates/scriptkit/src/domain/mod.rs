//! Core request and error types shared by the application layer.

pub mod errors;
pub mod model;

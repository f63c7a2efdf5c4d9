//! Report formatters

pub mod json;
pub mod pretty;

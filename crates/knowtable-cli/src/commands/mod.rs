//! CLI command handlers

pub mod complete;
pub mod decompose;
pub mod embed;
pub mod status;

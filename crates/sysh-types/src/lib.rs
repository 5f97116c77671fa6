//! Foundation types for sysh.
//!
//! Shared by the command core and the binary: the error enum every handler
//! returns and the runtime configuration that parameterises the handlers.

pub mod config;
pub mod error;

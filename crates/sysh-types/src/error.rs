//! Error types for sysh.

use std::io;

use nix::errno::Errno;

/// Errors produced by sysh handlers and configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum SyshError {
    #[error("{0}")]
    Command(String),

    #[error("config error: {0}")]
    Config(String),

    /// Displays the errno description when the error carries an OS code.
    #[error("{}", io_description(.0))]
    Io(#[from] io::Error),

    /// A raw system call failed; displays the OS description unchanged.
    #[error("{}", .0.desc())]
    Sys(#[from] Errno),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

fn io_description(err: &io::Error) -> String {
    match err.raw_os_error() {
        Some(code) => Errno::from_raw(code).desc().to_string(),
        None => err.to_string(),
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SyshError>;

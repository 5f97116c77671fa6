//! Shared helpers for command tests.

use std::sync::{Mutex, MutexGuard};

use sysh_types::config::ShellConfig;

use crate::commands::standard_registry;
use crate::interpreter::Environment;
use crate::sink::BufferSink;

static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Serialise tests that read or change the process working directory.
pub fn cwd_lock() -> MutexGuard<'static, ()> {
    CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Run `sysh <args...>` through the standard registry with `config`.
pub fn run_with(config: &ShellConfig, args: &[&str]) -> BufferSink {
    let registry = standard_registry().unwrap();
    let mut argv = vec!["sysh"];
    argv.extend_from_slice(args);
    let mut sink = BufferSink::new();
    let mut env = Environment {
        sink: &mut sink,
        config,
    };
    registry.dispatch(&argv, &mut env).unwrap();
    sink
}

/// Run `sysh <args...>` with the default config and return everything printed.
pub fn run(args: &[&str]) -> String {
    run_with(&ShellConfig::default(), args).output()
}

/// A path as `&str`; temp dirs are always UTF-8 in tests.
pub fn path_str(path: &std::path::Path) -> &str {
    path.to_str().unwrap()
}

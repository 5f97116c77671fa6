//! sysh entry point.
//!
//! `sysh <command> [arg ...]` runs exactly one command against the operating
//! system and prints the outcome to stdout. Log output goes to stderr and is
//! controlled with `RUST_LOG`. The process always exits successfully.

mod settings;

use anyhow::Result;

use sysh_terminal::{Environment, StdoutSink, standard_registry};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = settings::load_config();
    let registry = standard_registry()?;
    log::debug!("registry ready with {} commands", registry.len());

    let args: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let argv: Vec<&str> = args.iter().map(String::as_str).collect();

    let mut sink = StdoutSink;
    let mut env = Environment {
        sink: &mut sink,
        config: &config,
    };
    if let Err(e) = registry.dispatch(&argv, &mut env) {
        log::error!("could not write to stdout: {e}");
    }
    Ok(())
}

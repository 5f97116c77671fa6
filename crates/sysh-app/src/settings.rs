//! Config file discovery for the binary.

use std::ffi::OsString;
use std::path::Path;

use sysh_types::config::ShellConfig;

/// Names a TOML file to load handler settings from.
pub const CONFIG_ENV: &str = "SYSH_CONFIG";

/// Load the config named by `SYSH_CONFIG`, or defaults.
pub fn load_config() -> ShellConfig {
    config_from(std::env::var_os(CONFIG_ENV))
}

/// A config that fails to load is logged and replaced by defaults.
fn config_from(path: Option<OsString>) -> ShellConfig {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return ShellConfig::default();
    };
    match ShellConfig::load(Path::new(&path)) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("ignoring {CONFIG_ENV}: {e}");
            ShellConfig::default()
        },
    }
}

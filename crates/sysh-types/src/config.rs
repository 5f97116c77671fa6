//! Runtime configuration loaded from an optional TOML file.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SyshError};

/// Smallest chunk `cat` is allowed to read with.
pub const MIN_READ_CHUNK: usize = 4096;
/// Largest chunk `cat` will allocate.
pub const MAX_READ_CHUNK: usize = 1 << 20;
/// Smallest bound `pwd` is allowed to apply to the working directory.
pub const MIN_CWD_LEN: usize = 512;
/// Largest bound `pwd` accepts.
pub const MAX_CWD_LEN: usize = 64 * 1024;

/// Tunables consumed by the command handlers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    /// Chunk size for `cat` reads.
    #[serde(default = "default_read_chunk")]
    pub read_chunk_size: usize,
    /// Longest working directory `pwd` will print.
    #[serde(default = "default_cwd_max")]
    pub cwd_max_len: usize,
    /// Permission bits passed to `mkdir`.
    #[serde(default = "default_dir_mode")]
    pub dir_mode: u32,
    /// Kernel table `netstat` reads.
    #[serde(default = "default_netstat_path")]
    pub netstat_path: String,
    /// Remote endpoint `getIP` connects to when discovering the local address.
    #[serde(default = "default_probe_addr")]
    pub ip_probe_addr: String,
}

fn default_read_chunk() -> usize {
    MIN_READ_CHUNK
}
fn default_cwd_max() -> usize {
    4096
}
fn default_dir_mode() -> u32 {
    0o755
}
fn default_netstat_path() -> String {
    "/proc/net/tcp".to_string()
}
fn default_probe_addr() -> String {
    "8.8.8.8:80".to_string()
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: default_read_chunk(),
            cwd_max_len: default_cwd_max(),
            dir_mode: default_dir_mode(),
            netstat_path: default_netstat_path(),
            ip_probe_addr: default_probe_addr(),
        }
    }
}

impl ShellConfig {
    /// Parse a config from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(text)?;
        Ok(cfg.validated())
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SyshError::Config(format!("{}: {e}", path.display())))?;
        log::debug!("loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Pull buffer sizes into their allowed ranges and drop non-permission
    /// mode bits.
    pub fn validated(mut self) -> Self {
        if self.read_chunk_size < MIN_READ_CHUNK {
            log::warn!(
                "read_chunk_size {} below minimum, using {MIN_READ_CHUNK}",
                self.read_chunk_size
            );
            self.read_chunk_size = MIN_READ_CHUNK;
        } else if self.read_chunk_size > MAX_READ_CHUNK {
            log::warn!(
                "read_chunk_size {} above maximum, using {MAX_READ_CHUNK}",
                self.read_chunk_size
            );
            self.read_chunk_size = MAX_READ_CHUNK;
        }
        if self.cwd_max_len < MIN_CWD_LEN {
            log::warn!(
                "cwd_max_len {} below minimum, using {MIN_CWD_LEN}",
                self.cwd_max_len
            );
            self.cwd_max_len = MIN_CWD_LEN;
        } else if self.cwd_max_len > MAX_CWD_LEN {
            log::warn!(
                "cwd_max_len {} above maximum, using {MAX_CWD_LEN}",
                self.cwd_max_len
            );
            self.cwd_max_len = MAX_CWD_LEN;
        }
        self.dir_mode &= 0o7777;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ShellConfig::default();
        assert_eq!(cfg.read_chunk_size, 4096);
        assert_eq!(cfg.dir_mode, 0o755);
        assert_eq!(cfg.netstat_path, "/proc/net/tcp");
        assert_eq!(cfg.ip_probe_addr, "8.8.8.8:80");
        assert!(cfg.cwd_max_len >= MIN_CWD_LEN);
    }

    #[test]
    fn empty_toml_is_default() {
        let cfg = ShellConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, ShellConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let cfg = ShellConfig::from_toml_str(
            "netstat_path = \"/proc/net/tcp6\"\nread_chunk_size = 65536\n",
        )
        .unwrap();
        assert_eq!(cfg.netstat_path, "/proc/net/tcp6");
        assert_eq!(cfg.read_chunk_size, 65536);
        assert_eq!(cfg.dir_mode, 0o755);
    }

    #[test]
    fn small_buffers_are_clamped() {
        let cfg = ShellConfig::from_toml_str("read_chunk_size = 16\ncwd_max_len = 8\n").unwrap();
        assert_eq!(cfg.read_chunk_size, MIN_READ_CHUNK);
        assert_eq!(cfg.cwd_max_len, MIN_CWD_LEN);
    }

    #[test]
    fn huge_buffers_are_clamped() {
        let cfg = ShellConfig::from_toml_str(
            "read_chunk_size = 9223372036854775807\ncwd_max_len = 9223372036854775807\n",
        )
        .unwrap();
        assert_eq!(cfg.read_chunk_size, MAX_READ_CHUNK);
        assert_eq!(cfg.cwd_max_len, MAX_CWD_LEN);

        let edge = ShellConfig::from_toml_str("read_chunk_size = 1048576\n").unwrap();
        assert_eq!(edge.read_chunk_size, MAX_READ_CHUNK);
    }

    #[test]
    fn unknown_key_rejected() {
        let err = ShellConfig::from_toml_str("colour = \"red\"").unwrap_err();
        assert!(matches!(err, SyshError::TomlParse(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sysh.toml");
        std::fs::write(&path, "dir_mode = 0o700\n").unwrap();
        let cfg = ShellConfig::load(&path).unwrap();
        assert_eq!(cfg.dir_mode, 0o700);
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ShellConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, SyshError::Config(_)));
    }
}

//! Path utilities for hyperfill.
//!
//! Configuration lives under `~/.hyperfill/config.toml`.

use std::path::PathBuf;

/// Returns the hyperfill home directory (`~/.hyperfill/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".hyperfill")
}

/// Returns the default config file path (`~/.hyperfill/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

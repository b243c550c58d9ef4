//! Centralized configuration for the store.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - StoreConfig::from_env() reads the env vars; with_* builders override
//!   them programmatically (tests use these).

use std::fmt;

#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Whether to fsync the data/ovflow file on every page write.
    /// Env: MAH_DATA_FSYNC (default false; crash recovery is out of scope,
    /// so per-page fsync buys nothing unless the operator asks for it).
    pub data_fsync: bool,

    /// Whether to verify the header/tuple-run consistency of every page
    /// read from disk. Env: MAH_PAGE_VERIFY (default true;
    /// "0|false|off|no" disables).
    pub verify_pages: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_fsync: false,
            verify_pages: true,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("MAH_DATA_FSYNC") {
            cfg.data_fsync = env_truthy(&v);
        }
        if let Ok(v) = std::env::var("MAH_PAGE_VERIFY") {
            cfg.verify_pages = !env_falsy(&v);
        }

        cfg
    }

    pub fn with_data_fsync(mut self, on: bool) -> Self {
        self.data_fsync = on;
        self
    }

    pub fn with_verify_pages(mut self, on: bool) -> Self {
        self.verify_pages = on;
        self
    }
}

impl fmt::Display for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "data_fsync={} verify_pages={}",
            self.data_fsync, self.verify_pages
        )
    }
}

fn env_truthy(v: &str) -> bool {
    let s = v.trim().to_ascii_lowercase();
    s == "1" || s == "true" || s == "yes" || s == "on"
}

fn env_falsy(v: &str) -> bool {
    let s = v.trim().to_ascii_lowercase();
    s == "0" || s == "false" || s == "no" || s == "off"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_builders() {
        let cfg = StoreConfig::default();
        assert!(!cfg.data_fsync);
        assert!(cfg.verify_pages);

        let cfg = cfg.with_data_fsync(true).with_verify_pages(false);
        assert!(cfg.data_fsync);
        assert!(!cfg.verify_pages);
    }
}

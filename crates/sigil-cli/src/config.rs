//! Typed operator configuration, loaded from TOML with CLI flags layered
//! on top (§3 "Configuration"), mirroring the teacher's
//! `sigil-daemon::config::DaemonConfig` load/save/default shape.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Base URL of the escrow box this party deposits to.
    pub escrow_base_url: String,

    /// `host:port` this party listens on for transport connections.
    pub listen_addr: String,

    /// Path to this party's encrypted key-value store.
    pub store_path: PathBuf,

    /// This party's 16-hex-char contribution to the `ExchangeID`.
    pub party_id_part: String,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            escrow_base_url: "http://127.0.0.1:8080".to_string(),
            listen_addr: "127.0.0.1:9000".to_string(),
            store_path: Self::default_store_path(),
            party_id_part: "0000000000000000".to_string(),
        }
    }
}

impl ExchangeConfig {
    fn default_store_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sigil-exchange")
            .join("store.bin")
    }

    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

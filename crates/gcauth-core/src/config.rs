// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Verifier configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Apple's production Game Center public key, preloaded at start.
pub const DEFAULT_PUBLIC_KEY_URL: &str = "https://static.gc.apple.com/public-key/gc-prod-2.cer";

/// Settings for server-side identity verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Certificates fetched when the verifier starts.
    pub preload_urls: Vec<String>,
    /// Public-key hosts must equal this or be a subdomain of it.
    pub trusted_host_suffix: String,
    /// Reject public-key URLs that are not `https`.
    pub require_https: bool,
    /// Interval between background refreshes of cached certificates.
    pub refresh_interval_secs: u64,
    /// Per-attempt timeout for certificate downloads.
    pub fetch_timeout_ms: u64,
    /// Extra download attempts after the first failure.
    pub fetch_retries: u32,
    /// Reject signatures older than this. `None` disables the check.
    pub max_signature_age_secs: Option<u64>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            preload_urls: vec![DEFAULT_PUBLIC_KEY_URL.to_owned()],
            trusted_host_suffix: "apple.com".into(),
            require_https: true,
            refresh_interval_secs: 30 * 60,
            fetch_timeout_ms: 6000,
            fetch_retries: 3,
            max_signature_age_secs: None,
        }
    }
}

impl VerifierConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Read a config file. Missing keys take their default values.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

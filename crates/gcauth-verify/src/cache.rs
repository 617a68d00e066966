// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Certificate cache keyed by canonical public-key URL (no query, no fragment).
//
// Entries are loaded on first use or by preload, and replaced by the
// periodic refresh. A failed refresh keeps the previous certificate.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument};

use gcauth_core::error::Result;

use crate::certificates::TrustedCertificate;
use crate::fetch::CertificateFetcher;
use crate::trust::cache_key;

pub struct CertificateCache<F> {
    fetcher: F,
    entries: RwLock<HashMap<String, Arc<TrustedCertificate>>>,
}

impl<F: CertificateFetcher> CertificateCache<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            entries: RwLock::new(HashMap::new()),
        }
    }

    async fn load(&self, url: &str) -> Result<Arc<TrustedCertificate>> {
        let bytes = self.fetcher.fetch(url).await?;
        let cert = TrustedCertificate::from_bytes(&bytes)?;
        debug!(url, fingerprint = cert.fingerprint(), "certificate loaded");
        Ok(Arc::new(cert))
    }

    /// Cached certificate for `url`, fetching it on a miss.
    pub async fn get(&self, url: &str) -> Result<Arc<TrustedCertificate>> {
        let key = cache_key(url);
        if let Some(cert) = self.entries.read().await.get(&key) {
            return Ok(Arc::clone(cert));
        }

        let cert = self.load(&key).await?;
        let mut entries = self.entries.write().await;
        // Keep whichever copy landed first if another request raced us.
        Ok(Arc::clone(entries.entry(key).or_insert(cert)))
    }

    /// Load every URL up front. Failures are logged, not returned.
    #[instrument(skip_all)]
    pub async fn preload(&self, urls: &[String]) {
        for url in urls {
            let key = cache_key(url);
            match self.load(&key).await {
                Ok(cert) => {
                    self.entries.write().await.insert(key, cert);
                }
                Err(e) => {
                    error!(url = %key, error = %e, "failed to preload certificate; verification may fail");
                }
            }
        }
    }

    /// Re-fetch every cached certificate. Returns how many were replaced.
    #[instrument(skip_all)]
    pub async fn refresh_all(&self) -> usize {
        let urls: Vec<String> = self.entries.read().await.keys().cloned().collect();
        let mut refreshed = 0;
        for url in urls {
            debug!(url, "refreshing certificate");
            match self.load(&url).await {
                Ok(cert) => {
                    self.entries.write().await.insert(url, cert);
                    refreshed += 1;
                }
                Err(e) => error!(url, error = %e, "certificate refresh failed; keeping previous"),
            }
        }
        info!(refreshed, "certificate refresh complete");
        refreshed
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Refresh `cache` every `period`, starting one period from now.
pub fn spawn_refresh<F: CertificateFetcher>(
    cache: Arc<CertificateCache<F>>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            cache.refresh_all().await;
        }
    })
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Certificate download with a bounded retry budget.
//
// Every failed attempt is retried until the budget is spent; the pause grows
// linearly with the attempt number. Requests bypass HTTP caches so a rotated
// key is picked up on the next refresh.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use tracing::{debug, instrument, warn};

use gcauth_core::config::VerifierConfig;
use gcauth_core::error::{GcAuthError, Result};

/// Source of raw certificate bytes.
#[async_trait]
pub trait CertificateFetcher: Send + Sync + 'static {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// HTTPS fetcher backed by `reqwest` over rustls.
pub struct HttpCertificateFetcher {
    client: reqwest::Client,
    retries: u32,
    retry_pause: Duration,
}

impl HttpCertificateFetcher {
    pub fn new(config: &VerifierConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.fetch_timeout())
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| GcAuthError::CertificateFetch(format!("HTTP client setup: {e}")))?;
        Ok(Self {
            client,
            retries: config.fetch_retries,
            retry_pause: Duration::from_millis(250),
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| GcAuthError::CertificateFetch(format!("{url}: {e}")))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| GcAuthError::CertificateFetch(format!("{url}: {e}")))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl CertificateFetcher for HttpCertificateFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        with_retries(self.retries, self.retry_pause, move || self.fetch_once(url)).await
    }
}

/// Run `attempt` until it succeeds or `retries` extra attempts have failed.
pub async fn with_retries<T, Fut, Op>(retries: u32, pause: Duration, mut attempt: Op) -> Result<T>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut failures = 0u32;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) if failures >= retries => {
                warn!(attempts = failures + 1, error = %err, "giving up");
                return Err(err);
            }
            Err(err) => {
                failures += 1;
                let delay = pause.saturating_mul(failures);
                debug!(attempt = failures, delay_ms = delay.as_millis() as u64, error = %err, "retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test]
    async fn stops_after_retry_budget() {
        let calls = &AtomicU32::new(0);
        let result: Result<()> = with_retries(3, Duration::ZERO, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(GcAuthError::CertificateFetch("connection refused".into()))
        })
        .await;
        assert!(matches!(result, Err(GcAuthError::CertificateFetch(_))));
        // One initial attempt plus three retries.
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn returns_first_success() {
        let calls = &AtomicU32::new(0);
        let value = with_retries(3, Duration::ZERO, move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(GcAuthError::CertificateFetch("timed out".into()))
            } else {
                Ok(n)
            }
        })
        .await
        .unwrap();
        assert_eq!(value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let calls = &AtomicU32::new(0);
        let result: Result<()> = with_retries(0, Duration::ZERO, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(GcAuthError::CertificateFetch("dns".into()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn client_builds_from_default_config() {
        let fetcher = HttpCertificateFetcher::new(&VerifierConfig::default()).unwrap();
        assert_eq!(fetcher.retries, 3);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Server-side identity verification.
//
// Given the seven fields a game received from the signature bridge, confirm
// that Apple signed them:
//   1. the public-key URL points inside the trusted host suffix
//   2. the signature is fresh enough (optional)
//   3. the certificate at that URL verifies the rebuilt payload

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use gcauth_core::config::VerifierConfig;
use gcauth_core::error::{GcAuthError, Result};
use gcauth_core::types::IdentityVerificationSignature;

use crate::cache::{CertificateCache, spawn_refresh};
use crate::fetch::{CertificateFetcher, HttpCertificateFetcher};
use crate::payload::build_payload;
use crate::trust::trusted_key_url;

/// Verifies Game Center identity signatures.
///
/// Owns a background task that refreshes cached certificates; it stops on
/// [`shutdown`](Self::shutdown) or drop.
pub struct IdentityVerifier<F: CertificateFetcher> {
    config: VerifierConfig,
    cache: Arc<CertificateCache<F>>,
    refresh: Option<JoinHandle<()>>,
}

impl IdentityVerifier<HttpCertificateFetcher> {
    /// Build a verifier that downloads certificates over HTTPS.
    ///
    /// Must be called inside a Tokio runtime.
    pub async fn start(config: VerifierConfig) -> Result<Self> {
        let fetcher = HttpCertificateFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, fetcher).await)
    }
}

impl<F: CertificateFetcher> IdentityVerifier<F> {
    /// Preload the configured certificates and start the refresh task.
    pub async fn with_fetcher(config: VerifierConfig, fetcher: F) -> Self {
        let cache = Arc::new(CertificateCache::new(fetcher));
        cache.preload(&config.preload_urls).await;
        let refresh = spawn_refresh(Arc::clone(&cache), config.refresh_interval());
        let preloaded = cache.len().await;
        info!(
            preloaded,
            refresh_secs = config.refresh_interval_secs,
            "identity verifier started"
        );
        Self {
            config,
            cache,
            refresh: Some(refresh),
        }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<CertificateCache<F>> {
        &self.cache
    }

    /// `Ok(())` if Apple's key signed these fields.
    #[instrument(skip_all, fields(player_id = %sig.player_id, bundle_id = %sig.bundle_id))]
    pub async fn verify(&self, sig: &IdentityVerificationSignature) -> Result<()> {
        debug!(
            url = %sig.public_key_url,
            timestamp = sig.timestamp,
            "verifying identity signature"
        );
        let url = trusted_key_url(&sig.public_key_url, &self.config)?;
        self.check_freshness(sig.timestamp, Utc::now().timestamp_millis())?;

        let salt = sig.salt_bytes()?;
        let signature = sig.signature_bytes()?;
        let cert = self.cache.get(url.as_str()).await?;

        let payload = build_payload(&sig.player_id, &sig.bundle_id, sig.timestamp, &salt);
        cert.verify_rsa_sha256(&payload, &signature)?;
        info!(fingerprint = cert.fingerprint(), "identity signature verified");
        Ok(())
    }

    /// Boolean form of [`verify`](Self::verify); the reason is logged.
    pub async fn is_authenticated(&self, sig: &IdentityVerificationSignature) -> bool {
        match self.verify(sig).await {
            Ok(()) => true,
            Err(e) => {
                error!(player_id = %sig.player_id, error = %e, "Game Center authentication failed");
                false
            }
        }
    }

    fn check_freshness(&self, timestamp: u64, now_millis: i64) -> Result<()> {
        let Some(max_age) = self.config.max_signature_age_secs else {
            return Ok(());
        };
        // Future timestamps (clock skew) count as fresh.
        let age_millis = i128::from(now_millis) - i128::from(timestamp);
        if age_millis > i128::from(max_age) * 1000 {
            let age_secs = i64::try_from(age_millis / 1000).unwrap_or(i64::MAX);
            return Err(GcAuthError::SignatureExpired { age_secs });
        }
        Ok(())
    }

    /// Stop the background refresh. Cached certificates stay usable.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.refresh.take() {
            handle.abort();
            debug!("certificate refresh stopped");
        }
    }
}

impl<F: CertificateFetcher> Drop for IdentityVerifier<F> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

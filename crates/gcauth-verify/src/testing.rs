// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared test fixtures: an RSA-2048 signer and its self-signed certificate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use ring::rand::SystemRandom;
use ring::signature::{RSA_PKCS1_SHA256, RsaKeyPair};

use gcauth_core::error::{GcAuthError, Result};

use crate::fetch::CertificateFetcher;

pub const KEY_PKCS8: &[u8] = include_bytes!("../tests/fixtures/signer-key.pk8");
pub const CERT_DER: &[u8] = include_bytes!("../tests/fixtures/signer-cert.cer");

/// RSA PKCS#1 v1.5 / SHA-256 signature by the fixture key.
pub fn sign(payload: &[u8]) -> Vec<u8> {
    let key = RsaKeyPair::from_pkcs8(KEY_PKCS8).expect("fixture key");
    let mut signature = vec![0u8; key.public().modulus_len()];
    key.sign(&RSA_PKCS1_SHA256, &SystemRandom::new(), payload, &mut signature)
        .expect("signing");
    signature
}

/// Serves the fixture certificate and counts requests.
#[derive(Clone, Default)]
pub struct FixtureFetcher {
    pub calls: Arc<AtomicUsize>,
    pub failing: Arc<AtomicBool>,
}

#[async_trait]
impl CertificateFetcher for FixtureFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(GcAuthError::CertificateFetch(format!("{url}: unreachable")));
        }
        Ok(CERT_DER.to_vec())
    }
}

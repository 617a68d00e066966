// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Game Center signing certificates.
//
// Only the certificate's public key is used: Apple's certificates are
// trusted by the host of the URL they came from, not by chain validation.
// Parsing and signature checks go through `rustls-webpki` with its `ring`
// backend.

use rustls::pki_types::CertificateDer;
use sha2::{Digest, Sha256};
use tracing::debug;
use webpki::EndEntityCert;

use gcauth_core::encoding;
use gcauth_core::error::{GcAuthError, Result};

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

/// A parsed X.509 certificate whose key verifies identity signatures.
#[derive(Debug, Clone)]
pub struct TrustedCertificate {
    der: Vec<u8>,
    fingerprint: String,
}

impl TrustedCertificate {
    /// Accept a DER certificate, or a single PEM `CERTIFICATE` block.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let der = match std::str::from_utf8(bytes) {
            Ok(text) if text.trim_start().starts_with(PEM_BEGIN) => pem_body(text)?,
            _ => bytes.to_vec(),
        };

        EndEntityCert::try_from(&CertificateDer::from(der.as_slice()))
            .map_err(|e| GcAuthError::Certificate(format!("X.509 parse failed: {e:?}")))?;

        let fingerprint = fingerprint(&der);
        debug!(%fingerprint, len = der.len(), "certificate parsed");
        Ok(Self { der, fingerprint })
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Lowercase hex SHA-256 of the DER encoding.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Check an RSA PKCS#1 v1.5 / SHA-256 signature over `payload`.
    pub fn verify_rsa_sha256(&self, payload: &[u8], signature: &[u8]) -> Result<()> {
        let der = CertificateDer::from(self.der.as_slice());
        let cert = EndEntityCert::try_from(&der)
            .map_err(|e| GcAuthError::Certificate(format!("X.509 parse failed: {e:?}")))?;
        cert.verify_signature(webpki::ring::RSA_PKCS1_2048_8192_SHA256, payload, signature)
            .map_err(|e| {
                debug!(error = ?e, "signature rejected");
                GcAuthError::SignatureMismatch
            })
    }
}

/// Lowercase hex SHA-256 of `der`.
pub fn fingerprint(der: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(der);
    hex::encode(hasher.finalize())
}

fn pem_body(text: &str) -> Result<Vec<u8>> {
    let start = text
        .find(PEM_BEGIN)
        .map(|i| i + PEM_BEGIN.len())
        .ok_or_else(|| GcAuthError::Certificate("missing PEM header".into()))?;
    let end = text[start..]
        .find(PEM_END)
        .map(|i| start + i)
        .ok_or_else(|| GcAuthError::Certificate("unterminated PEM block".into()))?;
    let body: String = text[start..end]
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    encoding::decode(&body)
}

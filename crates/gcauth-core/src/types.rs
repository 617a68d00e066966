// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Game Center identity verification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::encoding;
use crate::error::Result;

/// Correlates the log lines of a single bridge invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw output of the platform's signature-generation primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSignature {
    /// Absolute string form of the public-key URL.
    pub public_key_url: String,
    pub signature: Vec<u8>,
    pub salt: Vec<u8>,
    /// Milliseconds since the Unix epoch, as supplied by the platform.
    pub timestamp: u64,
}

/// Error surfaced by the platform SDK.
///
/// `domain` and `code` are logged for diagnostics; only `description` is
/// handed to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError {
    pub domain: Option<String>,
    pub code: Option<i64>,
    /// Localized description, passed through verbatim.
    pub description: String,
}

impl PlatformError {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            domain: None,
            code: None,
            description: description.into(),
        }
    }
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.domain, self.code) {
            (Some(domain), Some(code)) => write!(f, "{domain} ({code}): {}", self.description),
            (Some(domain), None) => write!(f, "{domain}: {}", self.description),
            _ => f.write_str(&self.description),
        }
    }
}

/// The seven fields delivered to the success callback.
///
/// This is also the document a game posts to its backend, and what
/// `gcauth-verify` checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityVerificationSignature {
    pub public_key_url: String,
    pub timestamp: u64,
    /// Standard base64 of the signature bytes.
    pub signature: String,
    /// Standard base64 of the salt bytes.
    pub salt: String,
    pub player_id: String,
    pub alias: String,
    pub bundle_id: String,
}

impl IdentityVerificationSignature {
    /// Combine the platform output with the ambient session and process
    /// identity, encoding the binary fields.
    pub fn from_generated(
        generated: GeneratedSignature,
        player_id: String,
        alias: String,
        bundle_id: String,
    ) -> Self {
        Self {
            public_key_url: generated.public_key_url,
            timestamp: generated.timestamp,
            signature: encoding::encode(&generated.signature),
            salt: encoding::encode(&generated.salt),
            player_id,
            alias,
            bundle_id,
        }
    }

    pub fn signature_bytes(&self) -> Result<Vec<u8>> {
        encoding::decode(&self.signature)
    }

    pub fn salt_bytes(&self) -> Result<Vec<u8>> {
        encoding::decode(&self.salt)
    }

    /// The timestamp as a wall-clock instant, if it is representable.
    pub fn signed_at(&self) -> Option<DateTime<Utc>> {
        let millis = i64::try_from(self.timestamp).ok()?;
        DateTime::from_timestamp_millis(millis)
    }
}

/// Reason delivered to the failure callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureFailure {
    pub reason: String,
}

/// Terminal result of one bridge invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SignatureOutcome {
    Succeeded(IdentityVerificationSignature),
    Failed(SignatureFailure),
}

impl SignatureOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(SignatureFailure {
            reason: reason.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

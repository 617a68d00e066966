// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for gcauth.

use thiserror::Error;

/// Top-level error type for all gcauth operations.
///
/// Only the bridge's FFI edge flattens this to text; everything behind it
/// propagates the variant.
#[derive(Debug, Error)]
pub enum GcAuthError {
    // -- Platform bridge --
    #[error("GameCenter authentication is only available on Apple platforms")]
    PlatformUnavailable,

    #[error("local player session is no longer available")]
    SessionReleased,

    #[error("platform bridge error: {0}")]
    Bridge(String),

    // -- Verification --
    #[error("public key URL is not trusted: {0}")]
    UntrustedKeyUrl(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("base64 decoding failed: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("certificate fetch failed: {0}")]
    CertificateFetch(String),

    #[error("certificate rejected: {0}")]
    Certificate(String),

    #[error("signature does not match payload")]
    SignatureMismatch,

    #[error("signature is {age_secs}s old")]
    SignatureExpired { age_secs: i64 },

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GcAuthError>;

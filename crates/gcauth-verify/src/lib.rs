// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// gcauth Verify: server-side check of the fields produced by the signature
// bridge. Fetches and caches Apple's public-key certificate, rebuilds the
// signed payload, and checks the RSA/SHA-256 signature against it.

pub mod cache;
pub mod certificates;
pub mod fetch;
pub mod payload;
pub mod trust;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::CertificateCache;
pub use certificates::TrustedCertificate;
pub use fetch::{CertificateFetcher, HttpCertificateFetcher};
pub use payload::build_payload;
pub use verifier::IdentityVerifier;

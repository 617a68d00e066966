// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! gcauth: Game Center identity-verification signature bridge.
//!
//! The Rust-facing entry point is [`SignatureBridge`], which takes its
//! platform capabilities by injection and reports a single
//! [`SignatureOutcome`](gcauth_core::SignatureOutcome). The C plugin ABI in
//! [`ffi`] wraps a process-wide bridge built from [`platform_services`] and
//! splits that outcome into the success / failure callback pair.

pub mod ffi;
pub mod logging;
pub mod signature;
pub mod traits;

#[cfg(target_vendor = "apple")]
pub mod gamekit;

#[cfg(not(target_vendor = "apple"))]
pub mod stub;

use std::sync::Arc;

pub use signature::SignatureBridge;

/// Retrieves the platform implementation for the target operating system.
///
/// RETURNS: a shared trait object (`dyn PlatformServices`) that abstracts
/// away the underlying native SDK.
pub fn platform_services() -> Arc<dyn traits::PlatformServices> {
    #[cfg(target_vendor = "apple")]
    {
        // Apple: GKLocalPlayer via `objc2` message sends.
        Arc::new(gamekit::GameKitPlatform::new())
    }
    #[cfg(not(target_vendor = "apple"))]
    {
        // Everything else: every request fails with `PlatformUnavailable`.
        Arc::new(stub::StubPlatform)
    }
}

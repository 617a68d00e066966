// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic capability traits consumed by the signature bridge.
//
// GameKit exposes the local player as a process-wide singleton. These traits
// turn that into injected capabilities so the bridge can run against a fake
// session in tests.

use std::sync::Arc;

use gcauth_core::error::Result;
use gcauth_core::types::{GeneratedSignature, PlatformError};

/// Single-shot completion handed to the platform's signature primitive.
pub type SignatureCompletion =
    Box<dyn FnOnce(std::result::Result<GeneratedSignature, PlatformError>) + Send + 'static>;

/// The currently signed-in player on this device.
pub trait LocalPlayerSession: Send + Sync {
    /// Stable identifier of the authenticated player, if known.
    fn player_id(&self) -> Option<String>;

    /// Display name of the player, if known.
    fn alias(&self) -> Option<String>;

    /// Ask the platform for an identity-verification signature.
    ///
    /// Implementations invoke `completion` at most once, on any thread they
    /// like. An unauthenticated player is reported through `completion`, not
    /// by returning early. Implementations must not keep a strong reference to
    /// themselves alive inside `completion`.
    fn generate_identity_verification_signature(&self, completion: SignatureCompletion);
}

/// Supplies the current local-player session.
pub trait SessionProvider: Send + Sync {
    /// The provider owns the session; callers hold at most a weak reference
    /// across an asynchronous request.
    fn local_player(&self) -> Result<Arc<dyn LocalPlayerSession>>;
}

/// Identity of the running application.
pub trait ApplicationIdentity: Send + Sync {
    /// Bundle identifier (e.g. `com.example.game`), if the process has one.
    fn bundle_identifier(&self) -> Option<String>;
}

/// Everything the signature bridge needs from the host platform.
pub trait PlatformServices: SessionProvider + ApplicationIdentity {
    /// Human-readable platform name (e.g. "GameKit", "Desktop (stub)").
    fn platform_name(&self) -> &str;
}

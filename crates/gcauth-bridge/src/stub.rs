// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub platform for non-Apple builds where GameKit is unavailable.
//
// There is no local player to hand out, so every bridge invocation fails
// with `PlatformUnavailable` through the normal failure path.

use std::sync::Arc;

use gcauth_core::error::{GcAuthError, Result};

use crate::traits::*;

/// Platform returned on targets without GameKit.
pub struct StubPlatform;

impl PlatformServices for StubPlatform {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl SessionProvider for StubPlatform {
    fn local_player(&self) -> Result<Arc<dyn LocalPlayerSession>> {
        tracing::warn!("SessionProvider::local_player called on stub platform");
        Err(GcAuthError::PlatformUnavailable)
    }
}

impl ApplicationIdentity for StubPlatform {
    fn bundle_identifier(&self) -> Option<String> {
        None
    }
}

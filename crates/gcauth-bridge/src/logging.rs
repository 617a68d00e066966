// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Log subscriber for the plugin when it is loaded into a host process.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the plugin's filter directives.
pub const LOG_ENV: &str = "GCAUTH_LOG";

static INIT: Once = Once::new();

/// Install a fmt subscriber once per process.
///
/// Leaves an existing global subscriber (installed by the host) in place.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_ok();
        tracing::debug!(installed, "gcauth bridge logging initialised");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Signature bridge: one platform request per call, one outcome per request.
//
// The bridge keeps only a weak reference to the local-player session while
// the platform works, reads the player fields when the completion runs, and
// drops every session reference before the caller's callback fires.
//
// The callback never runs on the caller's stack: an outcome produced before
// `generate` returns (no session, an inline completion, a dropped completion)
// is handed to a short-lived delivery thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread;

use gcauth_core::error::GcAuthError;
use gcauth_core::types::{
    GeneratedSignature, IdentityVerificationSignature, PlatformError, RequestId, SignatureOutcome,
};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::traits::{LocalPlayerSession, PlatformServices};

/// Reason delivered when the platform drops its completion without calling it.
pub const ABANDONED_REASON: &str = "signature request was abandoned before completion";

/// Requests identity-verification signatures from an injected platform.
pub struct SignatureBridge {
    platform: Arc<dyn PlatformServices>,
}

impl SignatureBridge {
    pub fn new(platform: Arc<dyn PlatformServices>) -> Self {
        Self { platform }
    }

    pub fn platform_name(&self) -> &str {
        self.platform.platform_name()
    }

    /// Issue one signature request and report its outcome to `on_complete`.
    ///
    /// `on_complete` runs exactly once, after this call has returned, on
    /// whichever thread the platform completes on. Concurrent calls are
    /// independent; nothing is queued or de-duplicated.
    pub fn generate<F>(&self, on_complete: F)
    where
        F: FnOnce(SignatureOutcome) + Send + 'static,
    {
        let request = RequestId::new();
        let returned = Arc::new(AtomicBool::new(false));
        let delivery = Delivery {
            request,
            returned: Arc::clone(&returned),
            on_complete: Some(on_complete),
        };
        self.issue(request, delivery);
        returned.store(true, Ordering::Release);
    }

    fn issue<F>(&self, request: RequestId, delivery: Delivery<F>)
    where
        F: FnOnce(SignatureOutcome) + Send + 'static,
    {
        let session = match self.platform.local_player() {
            Ok(session) => session,
            Err(err) => {
                error!(%request, error = %err, "no local player session");
                delivery.deliver(SignatureOutcome::failed(err.to_string()));
                return;
            }
        };

        // Process identity is fixed for the lifetime of the process.
        let bundle_id = self.platform.bundle_identifier();
        let weak_session = Arc::downgrade(&session);

        debug!(
            %request,
            platform = self.platform.platform_name(),
            "requesting identity verification signature"
        );

        session.generate_identity_verification_signature(Box::new(move |result| {
            let outcome = resolve(request, result, weak_session, bundle_id);
            delivery.deliver(outcome);
        }));
    }

    /// Single-shot future form of [`generate`](Self::generate).
    pub async fn generate_async(&self) -> SignatureOutcome {
        let (tx, rx) = oneshot::channel();
        self.generate(move |outcome| {
            let _ = tx.send(outcome);
        });
        rx.await
            .unwrap_or_else(|_| SignatureOutcome::failed(ABANDONED_REASON))
    }
}

/// Turn the platform's completion into the caller-facing outcome.
///
/// Consumes the weak session so no reference survives past this call.
fn resolve(
    request: RequestId,
    result: Result<GeneratedSignature, PlatformError>,
    session: Weak<dyn LocalPlayerSession>,
    bundle_id: Option<String>,
) -> SignatureOutcome {
    let generated = match result {
        Ok(generated) => generated,
        Err(err) => {
            error!(%request, error = %err, "identity verification signature generation failed");
            return SignatureOutcome::failed(err.description);
        }
    };

    let Some(session) = session.upgrade() else {
        error!(%request, "local player released before signature completed");
        return SignatureOutcome::failed(GcAuthError::SessionReleased.to_string());
    };
    let player_id = session.player_id();
    let alias = session.alias();
    drop(session);

    let signature = IdentityVerificationSignature::from_generated(
        generated,
        or_empty(request, "player_id", player_id),
        or_empty(request, "alias", alias),
        or_empty(request, "bundle_id", bundle_id),
    );
    info!(
        %request,
        player_id = %signature.player_id,
        timestamp = signature.timestamp,
        "identity verification signature generated"
    );
    SignatureOutcome::Succeeded(signature)
}

fn or_empty(request: RequestId, field: &'static str, value: Option<String>) -> String {
    value.unwrap_or_else(|| {
        warn!(%request, field, "platform returned no value; delivering empty string");
        String::new()
    })
}

/// Owns the caller's callback until it has fired.
///
/// If the platform drops the completion without calling it, `Drop` delivers
/// an abandoned failure so the caller still hears back exactly once.
struct Delivery<F>
where
    F: FnOnce(SignatureOutcome) + Send + 'static,
{
    request: RequestId,
    /// Set once `generate` has returned to its caller.
    returned: Arc<AtomicBool>,
    on_complete: Option<F>,
}

impl<F> Delivery<F>
where
    F: FnOnce(SignatureOutcome) + Send + 'static,
{
    fn deliver(mut self, outcome: SignatureOutcome) {
        if let Some(on_complete) = self.on_complete.take() {
            self.fire(on_complete, outcome);
        }
    }

    fn fire(&self, on_complete: F, outcome: SignatureOutcome) {
        if self.returned.load(Ordering::Acquire) {
            on_complete(outcome);
            return;
        }

        debug!(request = %self.request, "deferring delivery off the calling stack");
        let slot = Arc::new(Mutex::new(Some((on_complete, outcome))));
        let handoff = Arc::clone(&slot);
        let spawned = thread::Builder::new()
            .name("gcauth-delivery".into())
            .spawn(move || {
                if let Some((on_complete, outcome)) = take(&handoff) {
                    on_complete(outcome);
                }
            });
        if let Err(e) = spawned {
            // Late beats never.
            error!(request = %self.request, error = %e, "delivery thread failed to start; delivering inline");
            if let Some((on_complete, outcome)) = take(&slot) {
                on_complete(outcome);
            }
        }
    }
}

fn take<T>(slot: &Mutex<Option<T>>) -> Option<T> {
    slot.lock().ok().and_then(|mut slot| slot.take())
}

impl<F> Drop for Delivery<F>
where
    F: FnOnce(SignatureOutcome) + Send + 'static,
{
    fn drop(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            warn!(request = %self.request, "platform dropped completion without calling it");
            self.fire(on_complete, SignatureOutcome::failed(ABANDONED_REASON));
        }
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// C plugin ABI. See `include/gcauth_bridge.h`.
//
// The Rust bridge reports one `SignatureOutcome`; this module splits it into
// the success / failure function-pointer pair the host registered. Callback
// typedefs use `extern "system"`, which is `__stdcall` on 32-bit Windows and
// the C convention everywhere else.
//
// Strings handed to a callback are owned here and freed when it returns.

use std::ffi::{CString, c_char};
use std::sync::OnceLock;

use gcauth_core::types::SignatureOutcome;

use crate::signature::SignatureBridge;
use crate::{logging, platform_services};

/// Success callback: URL, timestamp, base64 signature, base64 salt, player
/// id, alias, bundle id.
pub type GenerateSucceeded = unsafe extern "system" fn(
    public_key_url: *const c_char,
    timestamp: u64,
    signature: *const c_char,
    salt: *const c_char,
    player_id: *const c_char,
    alias: *const c_char,
    bundle_id: *const c_char,
);

/// Failure callback: free-text reason from the platform.
pub type GenerateFailed = unsafe extern "system" fn(reason: *const c_char);

static BRIDGE: OnceLock<SignatureBridge> = OnceLock::new();

fn shared_bridge() -> &'static SignatureBridge {
    BRIDGE.get_or_init(|| {
        logging::init();
        let bridge = SignatureBridge::new(platform_services());
        tracing::info!(platform = bridge.platform_name(), "gcauth bridge ready");
        bridge
    })
}

/// Request an identity-verification signature for the local player.
///
/// Returns immediately. Exactly one of the callbacks fires exactly once,
/// after this call has returned, on a thread chosen by the platform.
///
/// # Safety
///
/// Both callbacks must be valid for the signature above and stay callable
/// until one of them has fired. They may be invoked from any thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn invoke_generate_identity_verification_signature(
    on_success: GenerateSucceeded,
    on_failure: GenerateFailed,
) {
    shared_bridge().generate(move |outcome| {
        // SAFETY: the host promised both pointers stay callable until one fires.
        unsafe { deliver(outcome, on_success, on_failure) }
    });
}

/// Symbol exported by the original Unity plugin header.
///
/// # Safety
///
/// Same contract as [`invoke_generate_identity_verification_signature`].
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn GenerateIdentityVerificationSignature(
    on_success: GenerateSucceeded,
    on_failure: GenerateFailed,
) {
    // SAFETY: forwarded unchanged.
    unsafe { invoke_generate_identity_verification_signature(on_success, on_failure) }
}

/// Fire the callback matching `outcome`.
///
/// # Safety
///
/// `on_success` and `on_failure` must be callable.
pub unsafe fn deliver(
    outcome: SignatureOutcome,
    on_success: GenerateSucceeded,
    on_failure: GenerateFailed,
) {
    match outcome {
        SignatureOutcome::Succeeded(sig) => {
            let url = c_string(&sig.public_key_url);
            let signature = c_string(&sig.signature);
            let salt = c_string(&sig.salt);
            let player_id = c_string(&sig.player_id);
            let alias = c_string(&sig.alias);
            let bundle_id = c_string(&sig.bundle_id);
            // SAFETY: caller guarantees the pointer; every CString outlives the call.
            unsafe {
                on_success(
                    url.as_ptr(),
                    sig.timestamp,
                    signature.as_ptr(),
                    salt.as_ptr(),
                    player_id.as_ptr(),
                    alias.as_ptr(),
                    bundle_id.as_ptr(),
                )
            }
        }
        SignatureOutcome::Failed(failure) => {
            let reason = c_string(&failure.reason);
            // SAFETY: caller guarantees the pointer; `reason` outlives the call.
            unsafe { on_failure(reason.as_ptr()) }
        }
    }
}

/// NUL-terminated copy of `text`, cut at the first interior NUL.
fn c_string(text: &str) -> CString {
    let bytes = text.as_bytes();
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    CString::new(&bytes[..end]).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;
    use std::sync::Mutex;
    #[cfg(not(target_vendor = "apple"))]
    use std::thread::{self, ThreadId};
    #[cfg(not(target_vendor = "apple"))]
    use std::time::{Duration, Instant};

    use gcauth_core::types::IdentityVerificationSignature;

    use super::*;

    type Row = (String, u64, String, String, String, String, String);

    unsafe fn owned(ptr: *const c_char) -> String {
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }

    macro_rules! recorders {
        ($successes:ident, $failures:ident, $on_success:ident, $on_failure:ident) => {
            static $successes: Mutex<Vec<Row>> = Mutex::new(Vec::new());
            static $failures: Mutex<Vec<String>> = Mutex::new(Vec::new());

            unsafe extern "system" fn $on_success(
                url: *const c_char,
                timestamp: u64,
                signature: *const c_char,
                salt: *const c_char,
                player_id: *const c_char,
                alias: *const c_char,
                bundle_id: *const c_char,
            ) {
                let row = unsafe {
                    (
                        owned(url),
                        timestamp,
                        owned(signature),
                        owned(salt),
                        owned(player_id),
                        owned(alias),
                        owned(bundle_id),
                    )
                };
                $successes.lock().unwrap().push(row);
            }

            unsafe extern "system" fn $on_failure(reason: *const c_char) {
                let reason = unsafe { owned(reason) };
                $failures.lock().unwrap().push(reason);
            }
        };
    }

    recorders!(SUCCESS_ROWS, FAILURE_ROWS, record_success, record_failure);
    recorders!(FAIL_ONLY_OK, FAIL_ONLY_ERR, fail_only_success, fail_only_failure);
    #[cfg(not(target_vendor = "apple"))]
    recorders!(STUB_OK, STUB_ERR, stub_success, stub_failure);
    #[cfg(not(target_vendor = "apple"))]
    static STUB_THREADS: Mutex<Vec<ThreadId>> = Mutex::new(Vec::new());

    #[cfg(not(target_vendor = "apple"))]
    unsafe extern "system" fn stub_failure_on_thread(reason: *const c_char) {
        STUB_THREADS.lock().unwrap().push(thread::current().id());
        unsafe { stub_failure(reason) }
    }

    #[cfg(not(target_vendor = "apple"))]
    fn wait_until(done: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done() {
            assert!(Instant::now() < deadline, "callback never fired");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn success_outcome_reaches_success_callback_only() {
        let sig = IdentityVerificationSignature {
            public_key_url: "https://static.gc.apple.com/public-key/gc-prod-2.cer".into(),
            timestamp: u64::MAX,
            signature: "c2lnbmF0dXJl".into(),
            salt: "c2FsdA==".into(),
            player_id: "G:42".into(),
            alias: "Zoë".into(),
            bundle_id: "com.example.game".into(),
        };
        unsafe {
            deliver(
                SignatureOutcome::Succeeded(sig),
                record_success,
                record_failure,
            )
        };

        assert!(FAILURE_ROWS.lock().unwrap().is_empty());
        assert_eq!(
            *SUCCESS_ROWS.lock().unwrap(),
            vec![(
                "https://static.gc.apple.com/public-key/gc-prod-2.cer".to_owned(),
                u64::MAX,
                "c2lnbmF0dXJl".to_owned(),
                "c2FsdA==".to_owned(),
                "G:42".to_owned(),
                "Zoë".to_owned(),
                "com.example.game".to_owned(),
            )]
        );
    }

    #[test]
    fn failure_outcome_reaches_failure_callback_only() {
        unsafe {
            deliver(
                SignatureOutcome::failed("The Internet connection appears to be offline."),
                fail_only_success,
                fail_only_failure,
            )
        };
        assert!(FAIL_ONLY_OK.lock().unwrap().is_empty());
        assert_eq!(
            *FAIL_ONLY_ERR.lock().unwrap(),
            vec!["The Internet connection appears to be offline.".to_owned()]
        );
    }

    #[cfg(not(target_vendor = "apple"))]
    #[test]
    fn exported_symbol_fails_on_stub_platform() {
        let caller = thread::current().id();
        unsafe { GenerateIdentityVerificationSignature(stub_success, stub_failure_on_thread) };
        wait_until(|| !STUB_ERR.lock().unwrap().is_empty());
        // Give a second, wrong callback time to show up.
        thread::sleep(Duration::from_millis(50));

        assert_ne!(*STUB_THREADS.lock().unwrap(), vec![caller]);
        assert_eq!(STUB_THREADS.lock().unwrap().len(), 1);
        assert!(STUB_OK.lock().unwrap().is_empty());
        assert_eq!(
            *STUB_ERR.lock().unwrap(),
            vec!["GameCenter authentication is only available on Apple platforms".to_owned()]
        );
    }

    #[test]
    fn interior_nul_truncates() {
        assert_eq!(c_string("abc\0def").as_bytes(), b"abc");
        assert_eq!(c_string("").as_bytes(), b"");
        assert_eq!(c_string("G:1").as_bytes(), b"G:1");
    }
}

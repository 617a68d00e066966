// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// GameKit platform via objc2.
//
// Requires compilation with an Apple SDK. GKLocalPlayer is reached through
// Objective-C message sends; the completion handler is a heap block built
// with `block2`.
//
// ## Unsafe usage
//
// 1. **ObjC message sends** (msg_send!): selector names and argument types
//    follow GameKit/Foundation headers. Nullable returns are typed as
//    `Option<Retained<_>>`.
// 2. **Raw completion arguments**: GameKit hands the block nullable object
//    pointers. They are only dereferenced inside the block, where GameKit
//    guarantees they are live.
// 3. **Send/Sync on the weak player handle**: objc weak references are
//    loaded atomically by the runtime, and GKLocalPlayer's identity
//    properties are readable from any thread.

#![cfg(target_vendor = "apple")]

use std::sync::{Arc, Mutex, OnceLock};

use block2::RcBlock;
use objc2::msg_send;
use objc2::rc::{Retained, Weak};
use objc2::runtime::{AnyClass, AnyObject};
use objc2_foundation::{NSBundle, NSData, NSError, NSString, NSURL};

use gcauth_core::error::{GcAuthError, Result};
use gcauth_core::types::{GeneratedSignature, PlatformError};

use crate::traits::*;

#[link(name = "GameKit", kind = "framework")]
unsafe extern "C" {}

/// GameKit-backed platform services.
pub struct GameKitPlatform {
    local_player: OnceLock<Arc<GameKitLocalPlayer>>,
}

impl GameKitPlatform {
    pub fn new() -> Self {
        Self {
            local_player: OnceLock::new(),
        }
    }
}

impl Default for GameKitPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformServices for GameKitPlatform {
    fn platform_name(&self) -> &str {
        "GameKit"
    }
}

impl SessionProvider for GameKitPlatform {
    fn local_player(&self) -> Result<Arc<dyn LocalPlayerSession>> {
        if let Some(player) = self.local_player.get() {
            return Ok(player.clone());
        }
        let player = Arc::new(GameKitLocalPlayer::shared()?);
        // A racing caller may have won; either handle wraps the same singleton.
        let _ = self.local_player.set(player);
        self.local_player
            .get()
            .map(|player| player.clone() as Arc<dyn LocalPlayerSession>)
            .ok_or_else(|| GcAuthError::Bridge("local player handle was not stored".into()))
    }
}

impl ApplicationIdentity for GameKitPlatform {
    fn bundle_identifier(&self) -> Option<String> {
        NSBundle::mainBundle()
            .bundleIdentifier()
            .map(|id| id.to_string())
    }
}

/// Weak handle to `[GKLocalPlayer localPlayer]`.
///
/// GameKit owns the singleton; this handle never extends its lifetime.
pub struct GameKitLocalPlayer {
    player: Weak<AnyObject>,
}

// SAFETY: see "Send/Sync on the weak player handle" in the module header.
unsafe impl Send for GameKitLocalPlayer {}
// SAFETY: as above; the handle is never mutated after construction.
unsafe impl Sync for GameKitLocalPlayer {}

impl GameKitLocalPlayer {
    fn shared() -> Result<Self> {
        let class = AnyClass::get(c"GKLocalPlayer")
            .ok_or_else(|| GcAuthError::Bridge("GameKit is not linked".into()))?;
        // SAFETY: `+[GKLocalPlayer localPlayer]` returns the process-wide
        // local player object.
        let player: Option<Retained<AnyObject>> = unsafe { msg_send![class, localPlayer] };
        let player =
            player.ok_or_else(|| GcAuthError::Bridge("GKLocalPlayer returned nil".into()))?;
        Ok(Self {
            player: Weak::from_retained(&player),
        })
    }

    fn string_property(&self, read: impl FnOnce(&AnyObject) -> Option<Retained<NSString>>) -> Option<String> {
        let player = self.player.load()?;
        read(&player).map(|value| value.to_string())
    }
}

impl LocalPlayerSession for GameKitLocalPlayer {
    fn player_id(&self) -> Option<String> {
        // SAFETY: `playerID` is a nullable NSString property of GKPlayer.
        self.string_property(|player| unsafe { msg_send![player, playerID] })
    }

    fn alias(&self) -> Option<String> {
        // SAFETY: `alias` is a nullable NSString property of GKPlayer.
        self.string_property(|player| unsafe { msg_send![player, alias] })
    }

    fn generate_identity_verification_signature(&self, completion: SignatureCompletion) {
        // The bridge defers this failure until its caller has returned.
        let Some(player) = self.player.load() else {
            completion(Err(PlatformError::new(GcAuthError::SessionReleased.to_string())));
            return;
        };

        // The block type is `Fn`; the completion is taken on first call.
        let completion = Mutex::new(Some(completion));
        let block = RcBlock::new(
            move |url: *mut NSURL,
                  signature: *mut NSData,
                  salt: *mut NSData,
                  timestamp: u64,
                  error: *mut NSError| {
                let Some(completion) = completion.lock().ok().and_then(|mut slot| slot.take())
                else {
                    return;
                };
                // SAFETY: GameKit passes nil or live objects for the duration
                // of the block invocation.
                let result = unsafe { convert_completion(url, signature, salt, timestamp, error) };
                completion(result);
            },
        );

        // SAFETY: documented GKLocalPlayer method taking a
        // `void (^)(NSURL *, NSData *, NSData *, uint64_t, NSError *)` block.
        // GameKit copies the block, so dropping our `RcBlock` afterwards is fine.
        unsafe {
            let _: () = msg_send![
                &*player,
                generateIdentityVerificationSignatureWithCompletionHandler: &*block
            ];
        }
    }
}

/// Copy GameKit's completion arguments into owned Rust values.
///
/// # Safety
///
/// Each pointer must be null or point to a live object of its type.
unsafe fn convert_completion(
    url: *mut NSURL,
    signature: *mut NSData,
    salt: *mut NSData,
    timestamp: u64,
    error: *mut NSError,
) -> std::result::Result<GeneratedSignature, PlatformError> {
    if let Some(error) = unsafe { error.as_ref() } {
        // SAFETY: standard NSError accessors.
        let (domain, code, description): (Retained<NSString>, isize, Retained<NSString>) = unsafe {
            (
                msg_send![error, domain],
                msg_send![error, code],
                msg_send![error, localizedDescription],
            )
        };
        return Err(PlatformError {
            domain: Some(domain.to_string()),
            code: Some(code as i64),
            description: description.to_string(),
        });
    }

    let public_key_url = unsafe { url.as_ref() }
        .and_then(|url| {
            // SAFETY: `absoluteString` is a nullable NSString property of NSURL.
            let text: Option<Retained<NSString>> = unsafe { msg_send![url, absoluteString] };
            text
        })
        .map(|text| text.to_string())
        .unwrap_or_default();

    Ok(GeneratedSignature {
        public_key_url,
        signature: unsafe { signature.as_ref() }
            .map(NSData::to_vec)
            .unwrap_or_default(),
        salt: unsafe { salt.as_ref() }
            .map(NSData::to_vec)
            .unwrap_or_default(),
        timestamp,
    })
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The byte string GameKit signs.

/// `player_id ‖ bundle_id ‖ timestamp (big-endian u64) ‖ salt`.
///
/// Identifiers are taken as UTF-8 with no separators or terminators.
pub fn build_payload(player_id: &str, bundle_id: &str, timestamp: u64, salt: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(player_id.len() + bundle_id.len() + 8 + salt.len());
    payload.extend_from_slice(player_id.as_bytes());
    payload.extend_from_slice(bundle_id.as_bytes());
    payload.extend_from_slice(&timestamp.to_be_bytes());
    payload.extend_from_slice(salt);
    payload
}

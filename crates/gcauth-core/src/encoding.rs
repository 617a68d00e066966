// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Canonical base64 for the binary signature and salt.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::Result;

/// Standard alphabet, padded, no line breaks.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode(text: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_is_padded_without_newlines() {
        let long = vec![0xA5u8; 300];
        let text = encode(&long);
        assert!(!text.contains('\n'));
        assert!(!text.contains('\r'));
        assert_eq!(encode(b"ab"), "YWI=");
        assert_eq!(encode(b"a"), "YQ==");
    }

    #[test]
    fn decode_rejects_url_safe_alphabet() {
        // 0xfb 0xff encodes to "+/8=" in the standard alphabet.
        assert_eq!(decode("+/8=").unwrap(), vec![0xfb, 0xff]);
        assert!(decode("-_8=").is_err());
    }
}

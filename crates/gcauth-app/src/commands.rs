// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command handlers for the gcauth binary.

use std::io::Read;
use std::path::Path;

use tracing::info;

use gcauth_bridge::{SignatureBridge, platform_services};
use gcauth_core::config::VerifierConfig;
use gcauth_core::error::{GcAuthError, Result};
use gcauth_core::types::{IdentityVerificationSignature, SignatureOutcome};
use gcauth_verify::trust::trusted_key_url;
use gcauth_verify::{CertificateFetcher, HttpCertificateFetcher, IdentityVerifier, TrustedCertificate};

/// Config from `path`, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<VerifierConfig> {
    match path {
        Some(path) => VerifierConfig::load(path),
        None => Ok(VerifierConfig::default()),
    }
}

/// Parse a signature document from a file, or stdin for `-`.
pub fn read_signature(path: &Path) -> Result<IdentityVerificationSignature> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&text)?)
}

pub async fn generate() -> Result<()> {
    let bridge = SignatureBridge::new(platform_services());
    info!(platform = bridge.platform_name(), "requesting signature");
    let outcome = bridge.generate_async().await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    match outcome {
        SignatureOutcome::Succeeded(_) => Ok(()),
        SignatureOutcome::Failed(failure) => Err(GcAuthError::Bridge(failure.reason)),
    }
}

pub async fn verify(config: Option<&Path>, path: &Path) -> Result<()> {
    let config = load_config(config)?;
    let sig = read_signature(path)?;
    let mut verifier = IdentityVerifier::start(config).await?;
    let result = verifier.verify(&sig).await;
    verifier.shutdown();
    result?;

    match sig.signed_at() {
        Some(at) => println!("verified: {} ({}) signed at {at}", sig.player_id, sig.alias),
        None => println!("verified: {} ({})", sig.player_id, sig.alias),
    }
    Ok(())
}

pub async fn fetch_cert(config: Option<&Path>, url: &str) -> Result<()> {
    let config = load_config(config)?;
    let url = trusted_key_url(url, &config)?;
    let fetcher = HttpCertificateFetcher::new(&config)?;
    let cert = TrustedCertificate::from_bytes(&fetcher.fetch(url.as_str()).await?)?;
    println!("{}  {url}", cert.fingerprint());
    Ok(())
}

pub fn print_config(config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_signature_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sig.json");
        std::fs::write(
            &path,
            r#"{
                "public_key_url": "https://static.gc.apple.com/public-key/gc-prod-2.cer",
                "timestamp": 1700000000000,
                "signature": "AAEC",
                "salt": "CQgHBg==",
                "player_id": "G:1",
                "alias": "Ada",
                "bundle_id": "com.example.game"
            }"#,
        )
        .unwrap();

        let sig = read_signature(&path).unwrap();
        assert_eq!(sig.timestamp, 1_700_000_000_000);
        assert_eq!(sig.salt_bytes().unwrap(), vec![9, 8, 7, 6]);
        assert_eq!(sig.bundle_id, "com.example.game");
    }

    #[test]
    fn incomplete_document_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sig.json");
        std::fs::write(&path, r#"{ "player_id": "G:1" }"#).unwrap();
        assert!(matches!(
            read_signature(&path),
            Err(GcAuthError::Serialization(_))
        ));
    }

    #[test]
    fn config_defaults_without_path() {
        assert_eq!(load_config(None).unwrap(), VerifierConfig::default());
    }

    #[cfg(not(target_vendor = "apple"))]
    #[tokio::test]
    async fn generate_fails_off_apple_platforms() {
        assert!(matches!(generate().await, Err(GcAuthError::Bridge(_))));
    }
}

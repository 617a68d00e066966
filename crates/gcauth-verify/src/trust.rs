// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Public-key URL trust check. Runs before any certificate is fetched.

use reqwest::Url;
use tracing::warn;

use gcauth_core::config::VerifierConfig;
use gcauth_core::error::{GcAuthError, Result};

/// Everything before the first `?`.
pub fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(head, _)| head)
}

/// Parse `raw` with its query and fragment removed.
///
/// Neither part reaches the server, so URLs differing only there name the
/// same certificate.
pub fn canonical_key_url(raw: &str) -> Result<Url> {
    let stripped = strip_query(raw);
    let mut url =
        Url::parse(stripped).map_err(|e| GcAuthError::InvalidUrl(format!("{stripped}: {e}")))?;
    url.set_fragment(None);
    Ok(url)
}

/// Certificate cache key for `raw`: the canonical URL string.
pub fn cache_key(raw: &str) -> String {
    match canonical_key_url(raw) {
        Ok(url) => url.into(),
        Err(_) => {
            let stripped = strip_query(raw);
            stripped
                .split_once('#')
                .map_or(stripped, |(head, _)| head)
                .to_owned()
        }
    }
}

/// Canonicalise `raw` and require a host inside the trusted suffix: the
/// suffix itself or a subdomain of it.
pub fn trusted_key_url(raw: &str, config: &VerifierConfig) -> Result<Url> {
    let url = canonical_key_url(raw)?;
    let stripped = url.as_str();

    if config.require_https && url.scheme() != "https" {
        warn!(url = stripped, "public key URL is not https");
        return Err(GcAuthError::UntrustedKeyUrl(stripped.to_owned()));
    }

    let suffix = config
        .trusted_host_suffix
        .trim_start_matches('.')
        .to_ascii_lowercase();
    let trusted = url.host_str().is_some_and(|host| {
        let host = host.to_ascii_lowercase();
        host == suffix || host.ends_with(&format!(".{suffix}"))
    });

    if !trusted {
        warn!(url = stripped, "public key URL is not trusted");
        return Err(GcAuthError::UntrustedKeyUrl(stripped.to_owned()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> VerifierConfig {
        VerifierConfig::default()
    }

    #[test]
    fn apple_subdomain_is_trusted() {
        let url = trusted_key_url(
            "https://static.gc.apple.com/public-key/gc-prod-2.cer",
            &config(),
        )
        .unwrap();
        assert_eq!(url.host_str(), Some("static.gc.apple.com"));
    }

    #[test]
    fn query_is_stripped() {
        assert_eq!(strip_query("https://a.apple.com/k.cer?x=1?y"), "https://a.apple.com/k.cer");
        assert_eq!(strip_query("https://a.apple.com/k.cer"), "https://a.apple.com/k.cer");
        let url = trusted_key_url("https://a.apple.com/k.cer?evil.com", &config()).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn fragment_is_dropped() {
        let url = trusted_key_url(
            "https://static.gc.apple.com/public-key/gc-prod-2.cer#17",
            &config(),
        )
        .unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(
            url.as_str(),
            "https://static.gc.apple.com/public-key/gc-prod-2.cer"
        );
    }

    #[test]
    fn cache_key_ignores_query_and_fragment() {
        let plain = cache_key("https://a.apple.com/k.cer");
        assert_eq!(plain, "https://a.apple.com/k.cer");
        for raw in [
            "https://a.apple.com/k.cer?v=2",
            "https://a.apple.com/k.cer#x",
            "https://a.apple.com/k.cer#x?v=2",
            "https://A.apple.com/k.cer",
        ] {
            assert_eq!(cache_key(raw), plain, "{raw}");
        }
        assert_eq!(cache_key("not a url#frag"), "not a url");
    }

    #[test]
    fn lookalike_suffix_is_rejected() {
        for raw in [
            "https://evilapple.com/k.cer",
            "https://apple.com.evil.net/k.cer",
            "https://example.org/k.cer",
        ] {
            assert!(
                matches!(
                    trusted_key_url(raw, &config()),
                    Err(GcAuthError::UntrustedKeyUrl(_))
                ),
                "{raw} should be untrusted"
            );
        }
    }

    #[test]
    fn plain_http_rejected_unless_allowed() {
        let raw = "http://static.gc.apple.com/public-key/gc-prod-2.cer";
        assert!(matches!(
            trusted_key_url(raw, &config()),
            Err(GcAuthError::UntrustedKeyUrl(_))
        ));
        let relaxed = VerifierConfig {
            require_https: false,
            ..config()
        };
        assert!(trusted_key_url(raw, &relaxed).is_ok());
    }

    #[test]
    fn garbage_is_invalid_url() {
        assert!(matches!(
            trusted_key_url("not a url", &config()),
            Err(GcAuthError::InvalidUrl(_))
        ));
    }
}

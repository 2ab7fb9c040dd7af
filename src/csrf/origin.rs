//! Same-origin verification for unsafe requests.
//!
//! Runs before any token work: a request that cannot even name a matching
//! origin is rejected without touching the codec. Origins compare exactly —
//! scheme, host and port — so sibling subdomains, suffix look-alikes and
//! differing ports are all distinct.

use axum::http::HeaderMap;
use url::Url;

use super::config::CsrfConfig;

/// Compare the request's claimed origin against the expected one.
///
/// Candidate: the `Origin` header, else the origin of a parseable
/// `Referer`. Expected: the configured application URL, else
/// `X-Forwarded-Proto`/`X-Forwarded-Host` (falling back to `Host`).
/// Missing or malformed values on either side fail the check.
#[must_use]
pub fn is_same_origin(config: &CsrfConfig, headers: &HeaderMap) -> bool {
    let Some(candidate) = candidate_origin(headers) else {
        return false;
    };
    let Some(expected) = expected_origin(config, headers) else {
        return false;
    };
    // url::Origin equality covers scheme + host + port; opaque origins
    // (unparseable or `null`) never match anything.
    candidate == expected && matches!(candidate, url::Origin::Tuple(..))
}

fn candidate_origin(headers: &HeaderMap) -> Option<url::Origin> {
    if let Some(origin) = header_str(headers, "origin")
        && !origin.is_empty()
    {
        return Url::parse(origin).ok().map(|url| url.origin());
    }
    let referer = header_str(headers, "referer")?;
    Url::parse(referer).ok().map(|url| url.origin())
}

fn expected_origin(config: &CsrfConfig, headers: &HeaderMap) -> Option<url::Origin> {
    if let Some(app_url) = config.app_url() {
        return Some(app_url.origin());
    }

    let proto = header_str(headers, "x-forwarded-proto").unwrap_or("https");
    let host = header_str(headers, "x-forwarded-host").or_else(|| header_str(headers, "host"))?;
    if host.is_empty() {
        return None;
    }
    Url::parse(&format!("{proto}://{host}"))
        .ok()
        .map(|url| url.origin())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config_with_app_url(url: &str) -> CsrfConfig {
        CsrfConfig::default().with_app_url(Some(Url::parse(url).expect("app url")))
    }

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).expect("header name"),
                HeaderValue::from_str(value).expect("header value"),
            );
        }
        map
    }

    #[test]
    fn matching_origin_against_app_url() {
        let config = config_with_app_url("https://app.example.com");
        let ok = headers(&[("origin", "https://app.example.com")]);
        assert!(is_same_origin(&config, &ok));
    }

    #[test]
    fn differing_port_is_a_different_origin() {
        let config = config_with_app_url("https://app.example.com");
        let other_port = headers(&[("origin", "https://app.example.com:8080")]);
        assert!(!is_same_origin(&config, &other_port));
    }

    #[test]
    fn default_port_normalizes() {
        let config = config_with_app_url("https://app.example.com");
        let explicit = headers(&[("origin", "https://app.example.com:443")]);
        assert!(is_same_origin(&config, &explicit));
    }

    #[test]
    fn foreign_origin_rejected() {
        let config = config_with_app_url("https://app.example.com");
        assert!(!is_same_origin(
            &config,
            &headers(&[("origin", "https://evil.com")])
        ));
    }

    #[test]
    fn suffix_lookalike_rejected() {
        // No substring matching: secure.com.evil.com is not secure.com.
        let config = config_with_app_url("https://secure.com");
        assert!(!is_same_origin(
            &config,
            &headers(&[("origin", "https://secure.com.evil.com")])
        ));
    }

    #[test]
    fn scheme_mismatch_rejected() {
        let config = config_with_app_url("https://app.example.com");
        assert!(!is_same_origin(
            &config,
            &headers(&[("origin", "http://app.example.com")])
        ));
    }

    #[test]
    fn referer_used_when_origin_missing() {
        let config = config_with_app_url("https://app.example.com");
        let ok = headers(&[("referer", "https://app.example.com/some/page?q=1")]);
        assert!(is_same_origin(&config, &ok));

        let bad = headers(&[("referer", "https://evil.com/page")]);
        assert!(!is_same_origin(&config, &bad));
    }

    #[test]
    fn no_candidate_headers_fails() {
        let config = config_with_app_url("https://app.example.com");
        assert!(!is_same_origin(&config, &HeaderMap::new()));
    }

    #[test]
    fn malformed_headers_fail_without_panic() {
        let config = config_with_app_url("https://app.example.com");
        for value in ["null", "not a url", "://", ""] {
            let map = headers(&[("origin", value)]);
            assert!(!is_same_origin(&config, &map), "accepted {value:?}");
        }
        let map = headers(&[("referer", "%%%%")]);
        assert!(!is_same_origin(&config, &map));
    }

    #[test]
    fn forwarded_headers_derive_expected_origin() {
        let config = CsrfConfig::default();
        let ok = headers(&[
            ("origin", "https://app.example.com"),
            ("x-forwarded-proto", "https"),
            ("x-forwarded-host", "app.example.com"),
        ]);
        assert!(is_same_origin(&config, &ok));
    }

    #[test]
    fn plain_host_fallback_defaults_to_https() {
        let config = CsrfConfig::default();
        let ok = headers(&[
            ("origin", "https://app.example.com"),
            ("host", "app.example.com"),
        ]);
        assert!(is_same_origin(&config, &ok));

        // Host resolves over https by default, so an http origin differs.
        let http_origin = headers(&[
            ("origin", "http://app.example.com"),
            ("host", "app.example.com"),
        ]);
        assert!(!is_same_origin(&config, &http_origin));
    }

    #[test]
    fn no_resolvable_host_fails() {
        let config = CsrfConfig::default();
        let map = headers(&[("origin", "https://app.example.com")]);
        assert!(!is_same_origin(&config, &map));
    }

    #[test]
    fn empty_origin_header_falls_back_to_referer() {
        let config = config_with_app_url("https://app.example.com");
        let map = headers(&[
            ("origin", ""),
            ("referer", "https://app.example.com/page"),
        ]);
        assert!(is_same_origin(&config, &map));
    }
}

//! Socket URL resolution.

use url::Url;

use mr_core::config::AppConfig;
use mr_core::constants::WS_PATH;
use mr_core::error::{MrError, MrResult};

/// Resolve the event stream URL.
///
/// A non-empty `explicit` address is returned as given (trimmed). Otherwise
/// the URL is derived from `origin`: `http` becomes `ws`, `https` becomes
/// `wss`, host and port are kept and the path is replaced by `/ws`.
pub fn resolve_ws_url(explicit: Option<&str>, origin: &str) -> MrResult<String> {
    if let Some(explicit) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        return Ok(explicit.to_string());
    }

    let origin = AppConfig::sanitize_address(origin);
    if origin.is_empty() {
        return Err(MrError::MissingConfig("server origin".into()));
    }

    let mut url = Url::parse(&origin)?;
    if url.host_str().is_none() {
        return Err(MrError::InvalidAddress(format!("{origin} has no host")));
    }

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(MrError::InvalidAddress(format!(
                "unsupported scheme {other} in {origin}"
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| MrError::InvalidAddress(format!("cannot use {scheme} for {origin}")))?;
    url.set_path(WS_PATH);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_address_is_used_verbatim() {
        assert_eq!(
            resolve_ws_url(Some("wss://events.example.com/custom?x=1"), "http://ignored").unwrap(),
            "wss://events.example.com/custom?x=1"
        );
        assert_eq!(
            resolve_ws_url(Some("  ws://10.0.0.2:9000/ws "), "").unwrap(),
            "ws://10.0.0.2:9000/ws"
        );
    }

    #[test]
    fn test_empty_explicit_falls_back_to_origin() {
        assert_eq!(
            resolve_ws_url(Some("  "), "http://localhost:8000").unwrap(),
            "ws://localhost:8000/ws"
        );
    }

    #[test]
    fn test_insecure_origin_upgrades_to_ws() {
        assert_eq!(
            resolve_ws_url(None, "http://recorder.local:8000/index.html").unwrap(),
            "ws://recorder.local:8000/ws"
        );
    }

    #[test]
    fn test_secure_origin_upgrades_to_wss() {
        assert_eq!(
            resolve_ws_url(None, "https://rec.example.com/").unwrap(),
            "wss://rec.example.com/ws"
        );
    }

    #[test]
    fn test_origin_without_scheme_is_insecure() {
        assert_eq!(
            resolve_ws_url(None, "127.0.0.1:8000").unwrap(),
            "ws://127.0.0.1:8000/ws"
        );
    }

    #[test]
    fn test_query_and_fragment_dropped() {
        assert_eq!(
            resolve_ws_url(None, "https://rec.example.com/app?tab=1#top").unwrap(),
            "wss://rec.example.com/ws"
        );
    }

    #[test]
    fn test_missing_origin_is_error() {
        assert!(matches!(
            resolve_ws_url(None, ""),
            Err(MrError::MissingConfig(_))
        ));
    }

    #[test]
    fn test_unsupported_scheme_is_error() {
        assert!(matches!(
            resolve_ws_url(None, "ftp://files.example.com"),
            Err(MrError::InvalidAddress(_))
        ));
    }
}

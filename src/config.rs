//! Controller configuration built from the environment at startup.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Error, Result};

/// Environment variable holding the GitHub bearer token.
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Environment variable overriding the GitHub API root (used by tests).
pub const GITHUB_API_URL_VAR: &str = "GITHUB_API_URL";

/// Default GitHub REST API root.
pub const DEFAULT_API_ROOT: &str = "https://api.github.com";

/// Steady-state interval between freshness reconcile passes.
pub const RESYNC_INTERVAL: Duration = Duration::from_secs(60);

/// Upper bound on any single tracker network call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the controller needs to run, resolved once at startup.
///
/// Passing this in explicitly (rather than reading process globals inside
/// the reconciler) keeps the credential source mockable.
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub bearer token.
    pub token: String,
    /// GitHub API root without trailing slash.
    pub api_root: String,
    /// Directory holding record files.
    pub store_root: PathBuf,
    /// Interval between steady-state resync passes.
    pub resync_interval: Duration,
    /// Per-request network timeout.
    pub request_timeout: Duration,
}

impl Config {
    /// Builds a configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] when `GITHUB_TOKEN` is unset or
    /// empty; this is fatal to controller startup.
    pub fn from_env(store_root: &Path) -> Result<Self> {
        let token = decode_token(env::var(GITHUB_TOKEN_VAR).ok())?;
        let api_root = env::var(GITHUB_API_URL_VAR)
            .unwrap_or_else(|_| DEFAULT_API_ROOT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            token,
            api_root,
            store_root: store_root.to_path_buf(),
            resync_interval: RESYNC_INTERVAL,
            request_timeout: REQUEST_TIMEOUT,
        })
    }
}

/// Normalizes the raw token value.
///
/// Deployments sometimes mount the token base64-encoded; attempt a decode
/// and fall back to the raw value when it is not valid base64 (or decodes
/// to non-UTF-8).
fn decode_token(raw: Option<String>) -> Result<String> {
    let raw = raw
        .filter(|token| !token.trim().is_empty())
        .ok_or(Error::MissingCredential(GITHUB_TOKEN_VAR))?;
    let trimmed = raw.trim();

    match STANDARD.decode(trimmed) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(decoded) => Ok(decoded.trim().to_string()),
            Err(_) => Ok(trimmed.to_string()),
        },
        Err(_) => Ok(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_is_fatal() {
        let err = decode_token(None).unwrap_err();
        assert!(matches!(err, Error::MissingCredential(GITHUB_TOKEN_VAR)));
    }

    #[test]
    fn empty_token_is_fatal() {
        let err = decode_token(Some("   ".into())).unwrap_err();
        assert!(matches!(err, Error::MissingCredential(_)));
    }

    #[test]
    fn plain_token_passes_through() {
        // Underscores are outside the standard base64 alphabet, so typical
        // GitHub tokens fail the decode attempt and are used verbatim.
        let token = decode_token(Some("ghp_examp1eT0ken".into())).unwrap();
        assert_eq!(token, "ghp_examp1eT0ken");
    }

    #[test]
    fn base64_token_is_decoded() {
        // "czNjcjN0" is base64 for "s3cr3t".
        let token = decode_token(Some("czNjcjN0".into())).unwrap();
        assert_eq!(token, "s3cr3t");
    }

    #[test]
    fn token_whitespace_is_trimmed() {
        let token = decode_token(Some("  ghp_examp1eT0ken\n".into())).unwrap();
        assert_eq!(token, "ghp_examp1eT0ken");
    }
}

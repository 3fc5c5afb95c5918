//! Repository locator: maps record URLs to an owner/name pair.

use crate::error::Error;

/// The only host accepted in record repository URLs.
pub const GITHUB_HOST: &str = "github.com";

/// An owner/name pair identifying one GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoRef {
    /// Parses a record's repository URL.
    ///
    /// Accepts exactly `https://github.com/<owner>/<repo>`, where both
    /// segments are non-empty and limited to ASCII alphanumerics, hyphens,
    /// and underscores. A trailing slash is tolerated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRepoUrl`] when the URL fails to parse, the
    /// host is not `github.com`, or the path does not have exactly two
    /// segments.
    pub fn parse(url: &str) -> Result<Self, Error> {
        let invalid = |reason: &str| Error::InvalidRepoUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let rest = url.strip_prefix("https://").ok_or_else(|| invalid("expected https scheme"))?;
        let (host, path) = rest.split_once('/').ok_or_else(|| invalid("missing repository path"))?;
        if host != GITHUB_HOST {
            return Err(invalid("host is not github.com"));
        }

        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        if segments.len() != 2 {
            return Err(invalid("path must be exactly <owner>/<repo>"));
        }
        for segment in &segments {
            if segment.is_empty() || !segment.chars().all(valid_segment_char) {
                return Err(invalid(
                    "owner and repo must be non-empty alphanumeric/hyphen/underscore",
                ));
            }
        }

        Ok(Self { owner: segments[0].to_string(), name: segments[1].to_string() })
    }
}

fn valid_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

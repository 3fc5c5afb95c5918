//! Live adapter for the `IssueTracker` port using the GitHub REST API.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ports::tracker::{IssueEdit, IssueTracker, RemoteIssue, TrackerFuture};

const GITHUB_API_VERSION: &str = "2022-11-28";
const PAGE_SIZE: usize = 100;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Live issue tracker backed by the GitHub REST v3 issues endpoints.
///
/// Every request carries bearer auth and is bounded by the configured
/// request timeout.
pub struct GithubTracker {
    client: Client,
    api_root: String,
}

impl GithubTracker {
    /// Creates a tracker from the controller configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot form a valid authorization
    /// header or the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("ghsync"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(GITHUB_API_VERSION));
        let auth = HeaderValue::from_str(&format!("Bearer {}", config.token.trim()))
            .map_err(|e| Error::upstream("building authorization header", e.into()))?;
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::upstream("constructing github client", e.into()))?;

        Ok(Self { client, api_root: config.api_root.trim_end_matches('/').to_string() })
    }

    fn issues_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{owner}/{repo}/issues", self.api_root)
    }
}

/// Issue as returned on the wire, including the marker field that
/// distinguishes pull requests from plain issues.
#[derive(Deserialize)]
struct IssuePayload {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    state: String,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

impl IssuePayload {
    fn into_issue(self) -> RemoteIssue {
        RemoteIssue { number: self.number, title: self.title, body: self.body, state: self.state }
    }
}

/// Error body returned by the GitHub API.
#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// Reads a response body, surfacing GitHub error messages on non-2xx.
async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> std::result::Result<T, BoxedError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| -> BoxedError { format!("failed to read GitHub response: {e}").into() })?;

    if !status.is_success() {
        let message =
            serde_json::from_str::<ApiError>(&text).map(|e| e.message).unwrap_or(text);
        return Err(format!("GitHub API error ({}): {message}", status.as_u16()).into());
    }

    serde_json::from_str(&text)
        .map_err(|e| -> BoxedError { format!("failed to parse GitHub response: {e}").into() })
}

impl IssueTracker for GithubTracker {
    fn list_issues(&self, owner: &str, repo: &str) -> TrackerFuture<'_, Vec<RemoteIssue>> {
        let url = self.issues_url(owner, repo);
        Box::pin(async move {
            let mut page = 1_u32;
            let mut issues = Vec::new();
            loop {
                let response = self
                    .client
                    .get(&url)
                    .query(&[
                        ("state", "all"),
                        ("per_page", &PAGE_SIZE.to_string()),
                        ("page", &page.to_string()),
                    ])
                    .send()
                    .await
                    .map_err(|e| -> BoxedError { e.into() })?;
                let chunk: Vec<IssuePayload> = read_json(response).await?;
                let chunk_len = chunk.len();
                issues.extend(
                    chunk
                        .into_iter()
                        .filter(|payload| payload.pull_request.is_none())
                        .map(IssuePayload::into_issue),
                );
                if chunk_len < PAGE_SIZE {
                    break;
                }
                page = page.saturating_add(1);
            }
            Ok(issues)
        })
    }

    fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
    ) -> TrackerFuture<'_, RemoteIssue> {
        let url = self.issues_url(owner, repo);
        let payload = serde_json::json!({ "title": title, "body": body });
        Box::pin(async move {
            let response = self
                .client
                .post(&url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| -> BoxedError { e.into() })?;
            let created: IssuePayload = read_json(response).await?;
            Ok(created.into_issue())
        })
    }

    fn edit_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        edit: IssueEdit,
    ) -> TrackerFuture<'_, RemoteIssue> {
        let url = format!("{}/{number}", self.issues_url(owner, repo));
        Box::pin(async move {
            let response = self
                .client
                .patch(&url)
                .json(&edit)
                .send()
                .await
                .map_err(|e| -> BoxedError { e.into() })?;
            let edited: IssuePayload = read_json(response).await?;
            Ok(edited.into_issue())
        })
    }
}

use std::thread;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::gate::Comment;
use crate::request::{GateRequest, RepoCoords};

use super::{Issue, IssueTracker};

const TOKEN_ENV: &str = "GITHUB_TOKEN";
const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 500;

fn resolve_token() -> Result<String> {
    std::env::var(TOKEN_ENV)
        .map_err(|_| Error::Tracker(format!("API token not found in ${TOKEN_ENV}")))
}

// ---------------------------------------------------------------------------
// Transport abstraction (for testability)
// ---------------------------------------------------------------------------

pub trait RestTransport {
    fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value>;
}

struct DefaultRestTransport {
    api_url: String,
    token: String,
}

impl RestTransport for DefaultRestTransport {
    fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let url = format!("{}{path}", self.api_url.trim_end_matches('/'));

        let mut backoff_ms = INITIAL_BACKOFF_MS;
        for attempt in 1..=MAX_RETRIES {
            let request = ureq::request(method, &url)
                .set("Authorization", &format!("Bearer {}", self.token))
                .set("Accept", "application/vnd.github+json")
                .set("User-Agent", "turnstile");

            let result = match body {
                Some(json) => request.send_json(json),
                None => request.call(),
            };

            match result {
                Ok(response) => {
                    return response
                        .into_json()
                        .map_err(|e| Error::Tracker(format!("failed to parse API response: {e}")));
                }
                Err(ref e) if attempt < MAX_RETRIES && is_retryable(e) => {
                    warn!(
                        attempt,
                        error = %e,
                        backoff_ms,
                        "retrying API request after transient error"
                    );
                    thread::sleep(Duration::from_millis(backoff_ms));
                    backoff_ms *= 2;
                }
                Err(e) => {
                    return Err(Error::Tracker(format!("API request failed: {e}")));
                }
            }
        }
        unreachable!()
    }
}

/// Only retry rate-limits (429), server errors (5xx), and transport/network errors.
fn is_retryable(err: &ureq::Error) -> bool {
    match err {
        ureq::Error::Status(code, _) => *code == 429 || *code >= 500,
        ureq::Error::Transport(_) => true,
    }
}

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiIssue {
    number: u64,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiComment {
    user: ApiUser,
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: String,
}

/// GitHub REST v3 tracker backend, authenticated via `GITHUB_TOKEN`.
pub struct RestTracker {
    coords: RepoCoords,
    transport: Box<dyn RestTransport>,
}

impl RestTracker {
    pub fn new(config: &Config, coords: RepoCoords) -> Result<Self> {
        let token = resolve_token()?;
        Ok(Self {
            coords,
            transport: Box::new(DefaultRestTransport {
                api_url: config.api_url.clone(),
                token,
            }),
        })
    }

    #[cfg(test)]
    fn with_transport(coords: RepoCoords, transport: Box<dyn RestTransport>) -> Self {
        Self { coords, transport }
    }

    fn issues_path(&self) -> String {
        format!("/repos/{}/{}/issues", self.coords.owner, self.coords.name)
    }
}

impl IssueTracker for RestTracker {
    fn create_gate(&self, request: &GateRequest) -> Result<Issue> {
        let payload = serde_json::json!({
            "title": request.title,
            "body": request.body,
            "assignees": request.assignees,
        });
        let json = self
            .transport
            .request("POST", &self.issues_path(), Some(&payload))?;
        let issue: ApiIssue = serde_json::from_value(json)
            .map_err(|e| Error::Tracker(format!("failed to parse issue response: {e}")))?;
        debug!(number = issue.number, "created gate issue");
        Ok(Issue {
            number: issue.number,
            url: issue.html_url,
        })
    }

    fn list_comments(&self, issue_number: u64) -> Result<Vec<Comment>> {
        let path = format!("{}/{issue_number}/comments?per_page=100", self.issues_path());
        let json = self.transport.request("GET", &path, None)?;
        let comments: Vec<ApiComment> = serde_json::from_value(json)
            .map_err(|e| Error::Tracker(format!("failed to parse comments response: {e}")))?;

        debug!(count = comments.len(), issue_number, "fetched comments");
        Ok(comments
            .into_iter()
            .map(|c| Comment {
                author: c.user.login,
                body: c.body.unwrap_or_default(),
            })
            .collect())
    }

    fn add_comment(&self, issue_number: u64, body: &str) -> Result<()> {
        let path = format!("{}/{issue_number}/comments", self.issues_path());
        let payload = serde_json::json!({ "body": body });
        self.transport.request("POST", &path, Some(&payload))?;
        Ok(())
    }

    fn close_issue(&self, issue_number: u64) -> Result<()> {
        let path = format!("{}/{issue_number}", self.issues_path());
        let payload = serde_json::json!({ "state": "closed" });
        self.transport.request("PATCH", &path, Some(&payload))?;
        debug!(issue_number, "closed gate issue");
        Ok(())
    }
}

use std::process::Command;
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::gate::Comment;
use crate::request::{GateRequest, RepoCoords};

use super::{Issue, IssueTracker};

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 500;

/// Abstraction over `gh` CLI execution for testability.
pub trait GhClient {
    fn run(&self, args: &[&str]) -> Result<String>;
}

/// Real `gh` CLI client with retry and exponential backoff.
struct DefaultGhClient;

impl GhClient for DefaultGhClient {
    fn run(&self, args: &[&str]) -> Result<String> {
        retry_with_backoff(|| {
            let output = Command::new("gh")
                .args(args)
                .output()
                .map_err(|e| Error::Tracker(format!("failed to run gh: {e}")))?;

            if output.status.success() {
                String::from_utf8(output.stdout)
                    .map_err(|e| Error::Tracker(format!("invalid utf8 from gh: {e}")))
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(Error::Tracker(format!("gh failed: {stderr}")))
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct GhIssue {
    number: u64,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct GhComment {
    user: GhUser,
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhUser {
    login: String,
}

/// Tracker backend driving the `gh` CLI, for environments where `gh` is
/// already authenticated and no raw token is available.
pub struct GhTracker {
    coords: RepoCoords,
    client: Box<dyn GhClient>,
}

impl GhTracker {
    pub fn new(coords: RepoCoords) -> Self {
        Self {
            coords,
            client: Box::new(DefaultGhClient),
        }
    }

    #[cfg(test)]
    fn with_client(coords: RepoCoords, client: Box<dyn GhClient>) -> Self {
        Self { coords, client }
    }

    fn issues_path(&self) -> String {
        format!("repos/{}/{}/issues", self.coords.owner, self.coords.name)
    }
}

impl IssueTracker for GhTracker {
    fn create_gate(&self, request: &GateRequest) -> Result<Issue> {
        let path = self.issues_path();
        let title_field = format!("title={}", request.title);
        let body_field = format!("body={}", request.body);

        let assignee_fields: Vec<String> = request
            .assignees
            .iter()
            .map(|a| format!("assignees[]={a}"))
            .collect();

        let mut args: Vec<&str> = vec![
            "api",
            path.as_str(),
            "-f",
            title_field.as_str(),
            "-f",
            body_field.as_str(),
        ];
        for field in &assignee_fields {
            args.push("-f");
            args.push(field.as_str());
        }

        let json = self.client.run(&args)?;
        let issue: GhIssue = serde_json::from_str(&json)
            .map_err(|e| Error::Tracker(format!("failed to parse gh output: {e}")))?;
        debug!(number = issue.number, "created gate issue");
        Ok(Issue {
            number: issue.number,
            url: issue.html_url,
        })
    }

    fn list_comments(&self, issue_number: u64) -> Result<Vec<Comment>> {
        let path = format!("{}/{issue_number}/comments?per_page=100", self.issues_path());
        let json = self.client.run(&["api", path.as_str()])?;
        let comments: Vec<GhComment> = serde_json::from_str(&json)
            .map_err(|e| Error::Tracker(format!("failed to parse gh output: {e}")))?;

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
        let body_field = format!("body={body}");
        self.client
            .run(&["api", path.as_str(), "-f", body_field.as_str()])?;
        Ok(())
    }

    fn close_issue(&self, issue_number: u64) -> Result<()> {
        let path = format!("{}/{issue_number}", self.issues_path());
        self.client
            .run(&["api", "-X", "PATCH", path.as_str(), "-f", "state=closed"])?;
        debug!(issue_number, "closed gate issue");
        Ok(())
    }
}

fn retry_with_backoff<F, T>(f: F) -> Result<T>
where
    F: Fn() -> Result<T>,
{
    retry_with_backoff_ms(f, INITIAL_BACKOFF_MS, MAX_RETRIES)
}

fn retry_with_backoff_ms<F, T>(f: F, initial_backoff_ms: u64, max_retries: u32) -> Result<T>
where
    F: Fn() -> Result<T>,
{
    let mut backoff_ms = initial_backoff_ms;

    for attempt in 1..=max_retries {
        match f() {
            Ok(val) => return Ok(val),
            Err(e) if attempt < max_retries => {
                warn!(attempt, error = %e, backoff_ms, "retrying after transient error");
                thread::sleep(Duration::from_millis(backoff_ms));
                backoff_ms *= 2;
            }
            Err(e) => return Err(e),
        }
    }

    unreachable!()
}

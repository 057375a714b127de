use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::gate::{ApprovalStatus, GatePolicy};
use crate::request::{GateRequest, RepoCoords};
use crate::tracker::{Issue, IssueTracker};

/// Creates the gate issue and polls its comment history until the gate
/// resolves, the overall timeout expires, or shutdown is requested.
#[derive(Debug)]
pub struct Waiter<T> {
    tracker: T,
    config: Config,
    policy: GatePolicy,
    coords: RepoCoords,
}

impl<T: IssueTracker> Waiter<T> {
    pub fn new(tracker: T, config: Config) -> Result<Self> {
        let coords = RepoCoords::parse(&config.repo)?;
        let policy = GatePolicy::new(
            config.approvers.clone(),
            config.minimum_approvals,
            config.effective_disallowed(),
            &config.approve_phrases,
            &config.deny_phrases,
        )?;
        // Fail on a contradictory policy before any issue is created.
        policy.required_approvals()?;
        Ok(Self {
            tracker,
            config,
            policy,
            coords,
        })
    }

    /// Run the gate to completion.
    ///
    /// When `shutdown` becomes true the waiter exits between polls, leaving
    /// the issue open so a rerun can pick the gate back up.
    pub async fn run(&self, mut shutdown: Option<watch::Receiver<bool>>) -> Result<ApprovalStatus> {
        let request = GateRequest::build(&self.config, &self.coords);
        let issue = self.tracker.create_gate(&request)?;
        info!(number = issue.number, url = %issue.url, "created gate issue");

        let deadline = (self.config.timeout_seconds > 0)
            .then(|| Instant::now() + Duration::from_secs(self.config.timeout_seconds));

        loop {
            if Self::shutdown_requested(shutdown.as_ref()) {
                info!("shutdown requested, leaving gate issue open");
                return Err(Error::Interrupted);
            }

            let comments = self.tracker.list_comments(issue.number)?;
            let status = self.policy.resolve(&comments)?;
            debug!(comments = comments.len(), ?status, "resolved gate status");

            match status {
                ApprovalStatus::Approved => {
                    self.finish(&issue, "Approved. Continuing workflow.")?;
                    info!(number = issue.number, "gate approved");
                    return Ok(status);
                }
                ApprovalStatus::Denied => {
                    self.finish(&issue, "Denied. Cancelling workflow.")?;
                    warn!(number = issue.number, "gate denied");
                    return Ok(status);
                }
                ApprovalStatus::Pending => {}
            }

            if let Some(deadline) = deadline
                && Instant::now() >= deadline
            {
                self.finish(&issue, "Timed out waiting for approval.")?;
                warn!(number = issue.number, "gate timed out");
                return Err(Error::Timeout);
            }

            debug!(poll_seconds = self.config.poll_seconds, "polling again");
            let stop = Self::wait_for_poll_or_shutdown(
                Duration::from_secs(self.config.poll_seconds),
                &mut shutdown,
            )
            .await;
            if stop {
                info!("shutdown requested, leaving gate issue open");
                return Err(Error::Interrupted);
            }
        }
    }

    fn finish(&self, issue: &Issue, note: &str) -> Result<()> {
        self.tracker.add_comment(issue.number, note)?;
        self.tracker.close_issue(issue.number)
    }

    fn shutdown_requested(shutdown: Option<&watch::Receiver<bool>>) -> bool {
        shutdown.is_some_and(|rx| *rx.borrow())
    }

    async fn wait_for_poll_or_shutdown(
        poll_duration: Duration,
        shutdown: &mut Option<watch::Receiver<bool>>,
    ) -> bool {
        if let Some(rx) = shutdown {
            tokio::select! {
                _ = tokio::time::sleep(poll_duration) => false,
                changed = rx.changed() => {
                    if changed.is_ok() {
                        *rx.borrow()
                    } else {
                        false
                    }
                }
            }
        } else {
            tokio::time::sleep(poll_duration).await;
            false
        }
    }
}

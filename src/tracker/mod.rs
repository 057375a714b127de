pub mod gh;
pub mod rest;

use crate::error::Result;
use crate::gate::Comment;
use crate::request::GateRequest;

/// A gate issue as created on the tracker.
#[derive(Debug, Clone)]
pub struct Issue {
    pub number: u64,
    pub url: String,
}

pub trait IssueTracker {
    /// Create the gate issue and return its number and URL.
    fn create_gate(&self, request: &GateRequest) -> Result<Issue>;

    /// Fetch the comment history for an issue, oldest first.
    fn list_comments(&self, issue_number: u64) -> Result<Vec<Comment>>;

    /// Add a comment to an issue.
    fn add_comment(&self, issue_number: u64, body: &str) -> Result<()>;

    /// Close an issue.
    fn close_issue(&self, issue_number: u64) -> Result<()>;
}

impl<T: IssueTracker> IssueTracker for std::rc::Rc<T> {
    fn create_gate(&self, request: &GateRequest) -> Result<Issue> {
        (**self).create_gate(request)
    }

    fn list_comments(&self, issue_number: u64) -> Result<Vec<Comment>> {
        (**self).list_comments(issue_number)
    }

    fn add_comment(&self, issue_number: u64, body: &str) -> Result<()> {
        (**self).add_comment(issue_number, body)
    }

    fn close_issue(&self, issue_number: u64) -> Result<()> {
        (**self).close_issue(issue_number)
    }
}

pub enum AnyTracker {
    Rest(rest::RestTracker),
    Gh(gh::GhTracker),
}

impl IssueTracker for AnyTracker {
    fn create_gate(&self, request: &GateRequest) -> Result<Issue> {
        match self {
            AnyTracker::Rest(t) => t.create_gate(request),
            AnyTracker::Gh(t) => t.create_gate(request),
        }
    }

    fn list_comments(&self, issue_number: u64) -> Result<Vec<Comment>> {
        match self {
            AnyTracker::Rest(t) => t.list_comments(issue_number),
            AnyTracker::Gh(t) => t.list_comments(issue_number),
        }
    }

    fn add_comment(&self, issue_number: u64, body: &str) -> Result<()> {
        match self {
            AnyTracker::Rest(t) => t.add_comment(issue_number, body),
            AnyTracker::Gh(t) => t.add_comment(issue_number, body),
        }
    }

    fn close_issue(&self, issue_number: u64) -> Result<()> {
        match self {
            AnyTracker::Rest(t) => t.close_issue(issue_number),
            AnyTracker::Gh(t) => t.close_issue(issue_number),
        }
    }
}

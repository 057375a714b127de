use regex::Regex;

use crate::error::{Error, Result};

pub const DEFAULT_APPROVE_PHRASES: &[&str] = &["approve", "approved", "lgtm", "yes"];
pub const DEFAULT_DENY_PHRASES: &[&str] = &["deny", "denied", "no", "reject"];

/// Outcome of replaying a gate's comment history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Denied,
}

impl ApprovalStatus {
    /// Approved and Denied end polling; Pending does not.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }
}

/// A single issue comment. Histories are ordered oldest-first.
#[derive(Debug, Clone)]
pub struct Comment {
    pub author: String,
    pub body: String,
}

/// Compiled matchers for one phrase vocabulary.
///
/// A body matches when, ignoring surrounding whitespace and a trailing run
/// of `.`/`!`, it equals one of the phrases case-insensitively. Phrase text
/// is escaped so vocabulary entries are matched literally.
#[derive(Debug)]
pub struct PhraseMatcher {
    patterns: Vec<Regex>,
}

impl PhraseMatcher {
    pub fn compile(phrases: &[String]) -> Result<Self> {
        let mut patterns = Vec::with_capacity(phrases.len());
        for phrase in phrases {
            let pattern = format!(r"(?i)^\s*{}[.!]*\s*$", regex::escape(phrase));
            patterns.push(Regex::new(&pattern)?);
        }
        Ok(Self { patterns })
    }

    pub fn matches(&self, body: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(body))
    }
}

/// Who may approve, how many distinct approvals are needed, and which
/// phrases count as approval or denial.
#[derive(Debug)]
pub struct GatePolicy {
    approvers: Vec<String>,
    minimum_approvals: usize,
    disallowed_users: Vec<String>,
    approve: PhraseMatcher,
    deny: PhraseMatcher,
}

impl GatePolicy {
    /// Build a policy, compiling both vocabularies up front.
    pub fn new(
        approvers: Vec<String>,
        minimum_approvals: usize,
        disallowed_users: Vec<String>,
        approve_phrases: &[String],
        deny_phrases: &[String],
    ) -> Result<Self> {
        Ok(Self {
            approvers,
            minimum_approvals,
            disallowed_users,
            approve: PhraseMatcher::compile(approve_phrases)?,
            deny: PhraseMatcher::compile(deny_phrases)?,
        })
    }

    /// Number of distinct approvals required.
    ///
    /// A zero minimum means "all named approvers"; zero with no named
    /// approvers is a contradiction and errors.
    pub fn required_approvals(&self) -> Result<usize> {
        if self.minimum_approvals > 0 {
            return Ok(self.minimum_approvals);
        }
        if self.approvers.is_empty() {
            return Err(Error::Policy(
                "no required approvers or minimum approvals set".to_string(),
            ));
        }
        Ok(self.approvers.len())
    }

    fn is_eligible(&self, author: &str) -> bool {
        if self.disallowed_users.iter().any(|u| u == author) {
            return false;
        }
        self.approvers.is_empty() || self.approvers.iter().any(|u| u == author)
    }

    /// Replay a comment history oldest-first and compute the gate status.
    ///
    /// Comments from ineligible or already-counted authors are skipped, a
    /// user's repeat approval counts once, and the pass short-circuits on
    /// the first qualifying denial or on reaching the approval threshold.
    pub fn resolve(&self, comments: &[Comment]) -> Result<ApprovalStatus> {
        let needed = self.required_approvals()?;
        let mut approvals: Vec<&str> = Vec::new();

        for comment in comments {
            if approvals.iter().any(|name| *name == comment.author) {
                continue;
            }
            if !self.is_eligible(&comment.author) {
                continue;
            }

            if self.approve.matches(&comment.body) {
                approvals.push(&comment.author);
                if approvals.len() >= needed {
                    return Ok(ApprovalStatus::Approved);
                }
                continue;
            }

            if self.deny.matches(&comment.body) {
                return Ok(ApprovalStatus::Denied);
            }
        }

        Ok(ApprovalStatus::Pending)
    }
}

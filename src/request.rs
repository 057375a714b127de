use crate::config::Config;
use crate::error::{Error, Result};

/// Repository coordinates split out of an `owner/name` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoords {
    pub owner: String,
    pub name: String,
}

impl RepoCoords {
    pub fn parse(full_name: &str) -> Result<Self> {
        let mut parts = full_name.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(Error::RepoFormat(format!(
                "repo owner and name in unexpected format: {full_name}"
            ))),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Title, body, and assignee list for a new gate issue.
///
/// Pure function of the config; creating the issue is the tracker's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRequest {
    pub title: String,
    pub body: String,
    pub assignees: Vec<String>,
}

impl GateRequest {
    pub fn build(config: &Config, coords: &RepoCoords) -> Self {
        let title = if config.issue_title.is_empty() {
            format!("Manual approval required (run {})", config.run_id)
        } else {
            format!(
                "Manual approval required for: {} (run {})",
                config.issue_title, config.run_id
            )
        };

        let approvers_text = if config.approvers.is_empty() {
            "Anyone can approve.".to_string()
        } else {
            config.approvers.join(", ")
        };

        // The issue is never left unassigned: with no named approvers it
        // goes to whoever started the workflow.
        let assignees = if config.approvers.is_empty() {
            vec![config.initiator.clone()]
        } else {
            config.approvers.clone()
        };

        let mut body = format!(
            "Workflow is pending manual review.\nURL: {run_url}\n\n\
             Required approvers: {approvers_text}\n\n\
             Respond {approve} to continue workflow or {deny} to cancel.",
            run_url = run_url(&config.base_url, coords, config.run_id),
            approve = quote_phrases(&config.approve_phrases),
            deny = quote_phrases(&config.deny_phrases),
        );

        if !config.issue_body.is_empty() {
            body = format!("{}\n\n{body}", config.issue_body);
        }

        Self {
            title,
            body,
            assignees,
        }
    }
}

fn run_url(base_url: &str, coords: &RepoCoords, run_id: u64) -> String {
    format!(
        "{}/{}/actions/runs/{run_id}",
        base_url.trim_end_matches('/'),
        coords.full_name()
    )
}

fn quote_phrases(phrases: &[String]) -> String {
    let quoted: Vec<String> = phrases.iter().map(|p| format!("\"{p}\"")).collect();
    quoted.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::default_test_config;

    #[test]
    fn test_parse_owner_and_name() {
        let coords = RepoCoords::parse("octo/widgets").unwrap();
        assert_eq!(coords.owner, "octo");
        assert_eq!(coords.name, "widgets");
        assert_eq!(coords.full_name(), "octo/widgets");
    }

    #[test]
    fn test_parse_rejects_malformed_coordinates() {
        for bad in ["octo", "octo/widgets/extra", "", "/widgets", "octo/"] {
            let err = RepoCoords::parse(bad).unwrap_err();
            assert!(
                matches!(err, Error::RepoFormat(_)),
                "expected RepoFormat for {bad:?}"
            );
            assert!(err.to_string().contains("unexpected format"));
        }
    }

    #[test]
    fn test_title_embeds_caller_title_and_run_id() {
        let config = Config {
            issue_title: "deploy to prod".to_string(),
            run_id: 42,
            ..default_test_config()
        };
        let coords = RepoCoords::parse(&config.repo).unwrap();
        let request = GateRequest::build(&config, &coords);
        assert_eq!(
            request.title,
            "Manual approval required for: deploy to prod (run 42)"
        );
    }

    #[test]
    fn test_title_without_caller_title() {
        let config = Config {
            issue_title: String::new(),
            run_id: 42,
            ..default_test_config()
        };
        let coords = RepoCoords::parse(&config.repo).unwrap();
        let request = GateRequest::build(&config, &coords);
        assert_eq!(request.title, "Manual approval required (run 42)");
    }

    #[test]
    fn test_body_links_run_and_quotes_phrases() {
        let config = Config {
            run_id: 7,
            ..default_test_config()
        };
        let coords = RepoCoords::parse(&config.repo).unwrap();
        let request = GateRequest::build(&config, &coords);
        assert!(
            request
                .body
                .contains("URL: https://github.com/octo/widgets/actions/runs/7")
        );
        assert!(
            request
                .body
                .contains("Respond \"approve\", \"approved\", \"lgtm\", \"yes\" to continue")
        );
        assert!(
            request
                .body
                .contains("or \"deny\", \"denied\", \"no\", \"reject\" to cancel")
        );
    }

    #[test]
    fn test_empty_approvers_assigns_initiator() {
        let config = Config {
            approvers: vec![],
            initiator: "starter".to_string(),
            ..default_test_config()
        };
        let coords = RepoCoords::parse(&config.repo).unwrap();
        let request = GateRequest::build(&config, &coords);
        assert_eq!(request.assignees, vec!["starter"]);
        assert!(request.body.contains("Required approvers: Anyone can approve."));
    }

    #[test]
    fn test_named_approvers_assigned_verbatim() {
        let config = Config {
            approvers: vec!["alice".to_string(), "bob".to_string()],
            ..default_test_config()
        };
        let coords = RepoCoords::parse(&config.repo).unwrap();
        let request = GateRequest::build(&config, &coords);
        assert_eq!(request.assignees, vec!["alice", "bob"]);
        assert!(request.body.contains("Required approvers: alice, bob"));
    }

    #[test]
    fn test_caller_body_is_prepended() {
        let config = Config {
            issue_body: "Release 1.2.3 gate.".to_string(),
            ..default_test_config()
        };
        let coords = RepoCoords::parse(&config.repo).unwrap();
        let request = GateRequest::build(&config, &coords);
        assert!(request.body.starts_with("Release 1.2.3 gate.\n\n"));
        assert!(request.body.contains("Workflow is pending manual review."));
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let config = Config {
            base_url: "https://github.example.com/".to_string(),
            run_id: 9,
            ..default_test_config()
        };
        let coords = RepoCoords::parse(&config.repo).unwrap();
        let request = GateRequest::build(&config, &coords);
        assert!(
            request
                .body
                .contains("URL: https://github.example.com/octo/widgets/actions/runs/9")
        );
    }
}

#![allow(dead_code)]

use turnstile::config::Config;

/// Sensible default `Config` for integration tests. Callers override fields
/// via struct update syntax.
pub fn default_test_config() -> Config {
    Config {
        tracker: "rest".to_string(),
        repo: "octo/widgets".to_string(),
        run_id: 1,
        approvers: vec![],
        minimum_approvals: 1,
        disallowed_users: vec![],
        approve_phrases: vec![
            "approve".to_string(),
            "approved".to_string(),
            "lgtm".to_string(),
            "yes".to_string(),
        ],
        deny_phrases: vec![
            "deny".to_string(),
            "denied".to_string(),
            "no".to_string(),
            "reject".to_string(),
        ],
        issue_title: String::new(),
        issue_body: String::new(),
        poll_seconds: 10,
        timeout_seconds: 0,
        base_url: "https://github.com".to_string(),
        api_url: "https://api.github.com".to_string(),
        initiator: "starter".to_string(),
        exclude_initiator: false,
        fail_on_denial: true,
        dry_run: false,
    }
}

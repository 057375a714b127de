use std::path::Path;

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::gate::{DEFAULT_APPROVE_PHRASES, DEFAULT_DENY_PHRASES};

pub const DEFAULT_CONFIG_PATH: &str = ".turnstile/config.toml";

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub tracker: Option<String>,
    pub repo: Option<String>,
    pub run_id: Option<u64>,
    pub approvers: Option<Vec<String>>,
    pub minimum_approvals: Option<usize>,
    pub disallowed_users: Option<Vec<String>>,
    pub approve_phrases: Option<Vec<String>>,
    pub deny_phrases: Option<Vec<String>>,
    pub issue_title: Option<String>,
    pub issue_body: Option<String>,
    pub poll_seconds: Option<u64>,
    pub timeout_seconds: Option<u64>,
    pub base_url: Option<String>,
    pub api_url: Option<String>,
    pub initiator: Option<String>,
    pub exclude_initiator: Option<bool>,
    pub fail_on_denial: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub tracker: String,
    pub repo: String,
    pub run_id: u64,
    pub approvers: Vec<String>,
    pub minimum_approvals: usize,
    pub disallowed_users: Vec<String>,
    pub approve_phrases: Vec<String>,
    pub deny_phrases: Vec<String>,
    pub issue_title: String,
    pub issue_body: String,
    pub poll_seconds: u64,
    pub timeout_seconds: u64,
    pub base_url: String,
    pub api_url: String,
    pub initiator: String,
    pub exclude_initiator: bool,
    pub fail_on_denial: bool,
    pub dry_run: bool,
}

impl Config {
    pub fn load(cli: &Cli) -> Result<Self> {
        let file_config = match cli.config.as_deref() {
            Some(path) => {
                let path = Path::new(path);
                if !path.exists() {
                    return Err(Error::ConfigNotFound(path.to_path_buf()));
                }
                parse_config(&std::fs::read_to_string(path)?)?
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    parse_config(&std::fs::read_to_string(path)?)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        let config = merge(file_config, cli);
        validate(&config)?;
        Ok(config)
    }

    /// Disallowed users, folding in the initiator when excluded from approving.
    pub fn effective_disallowed(&self) -> Vec<String> {
        let mut users = self.disallowed_users.clone();
        if self.exclude_initiator
            && !self.initiator.is_empty()
            && !users.contains(&self.initiator)
        {
            users.push(self.initiator.clone());
        }
        users
    }
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    Ok(toml::from_str(content)?)
}

fn validate(config: &Config) -> Result<()> {
    match config.tracker.as_str() {
        "rest" | "gh" => {}
        other => {
            return Err(Error::ConfigValidation(format!(
                "unknown tracker: {other} (expected: rest, gh)"
            )));
        }
    }
    if config.repo.is_empty() {
        return Err(Error::ConfigValidation(
            "repo is required (owner/name)".to_string(),
        ));
    }
    if config.run_id == 0 {
        return Err(Error::ConfigValidation("run_id is required".to_string()));
    }
    if config.poll_seconds == 0 {
        return Err(Error::ConfigValidation(
            "poll_seconds must be > 0".to_string(),
        ));
    }
    if config.approve_phrases.is_empty() {
        return Err(Error::ConfigValidation(
            "approve_phrases must not be empty".to_string(),
        ));
    }
    if config.deny_phrases.is_empty() {
        return Err(Error::ConfigValidation(
            "deny_phrases must not be empty".to_string(),
        ));
    }
    for phrase in &config.approve_phrases {
        if config
            .deny_phrases
            .iter()
            .any(|d| d.eq_ignore_ascii_case(phrase))
        {
            return Err(Error::ConfigValidation(format!(
                "phrase appears in both vocabularies: {phrase}"
            )));
        }
    }
    Ok(())
}

fn default_phrases(defaults: &[&str]) -> Vec<String> {
    defaults.iter().map(|w| w.to_string()).collect()
}

pub fn merge(file: ConfigFile, cli: &Cli) -> Config {
    Config {
        tracker: cli
            .tracker
            .clone()
            .or(file.tracker)
            .unwrap_or_else(|| "rest".to_string()),
        repo: cli.repo.clone().or(file.repo).unwrap_or_default(),
        run_id: cli.run_id.or(file.run_id).unwrap_or(0),
        approvers: if cli.approvers.is_empty() {
            file.approvers.unwrap_or_default()
        } else {
            cli.approvers.clone()
        },
        minimum_approvals: cli.minimum_approvals.or(file.minimum_approvals).unwrap_or(0),
        disallowed_users: if cli.disallowed_users.is_empty() {
            file.disallowed_users.unwrap_or_default()
        } else {
            cli.disallowed_users.clone()
        },
        approve_phrases: if cli.approve_phrases.is_empty() {
            file.approve_phrases
                .unwrap_or_else(|| default_phrases(DEFAULT_APPROVE_PHRASES))
        } else {
            cli.approve_phrases.clone()
        },
        deny_phrases: if cli.deny_phrases.is_empty() {
            file.deny_phrases
                .unwrap_or_else(|| default_phrases(DEFAULT_DENY_PHRASES))
        } else {
            cli.deny_phrases.clone()
        },
        issue_title: cli
            .issue_title
            .clone()
            .or(file.issue_title)
            .unwrap_or_default(),
        issue_body: cli
            .issue_body
            .clone()
            .or(file.issue_body)
            .unwrap_or_default(),
        poll_seconds: cli.poll_seconds.or(file.poll_seconds).unwrap_or(10),
        timeout_seconds: cli.timeout_seconds.or(file.timeout_seconds).unwrap_or(0),
        base_url: cli
            .base_url
            .clone()
            .or(file.base_url)
            .unwrap_or_else(|| "https://github.com".to_string()),
        api_url: cli
            .api_url
            .clone()
            .or(file.api_url)
            .unwrap_or_else(|| "https://api.github.com".to_string()),
        initiator: cli
            .initiator
            .clone()
            .or(file.initiator)
            .unwrap_or_default(),
        exclude_initiator: cli.exclude_initiator || file.exclude_initiator.unwrap_or(false),
        fail_on_denial: cli
            .fail_on_denial
            .or(file.fail_on_denial)
            .unwrap_or(true),
        dry_run: cli.dry_run,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::test_helpers::default_test_config;
    use clap::Parser;

    fn base_cli() -> Cli {
        Cli::parse_from(["turnstile", "--repo", "octo/widgets", "--run-id", "1"])
    }

    #[test]
    fn test_parse_valid_config() {
        let toml = r#"
tracker = "gh"
repo = "octo/widgets"
run_id = 42
approvers = ["alice", "bob"]
minimum_approvals = 1
poll_seconds = 5
"#;
        let config = parse_config(toml).unwrap();
        assert_eq!(config.tracker.as_deref(), Some("gh"));
        assert_eq!(config.run_id, Some(42));
        assert_eq!(
            config.approvers,
            Some(vec!["alice".to_string(), "bob".to_string()])
        );
        assert_eq!(config.poll_seconds, Some(5));
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_parse_unknown_field() {
        let toml = r#"bogus = "value""#;
        let err = parse_config(toml).unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn test_defaults_applied() {
        let config = merge(ConfigFile::default(), &base_cli());
        assert_eq!(config.tracker, "rest");
        assert_eq!(config.poll_seconds, 10);
        assert_eq!(config.timeout_seconds, 0);
        assert_eq!(config.base_url, "https://github.com");
        assert_eq!(config.api_url, "https://api.github.com");
        assert_eq!(config.approve_phrases, vec!["approve", "approved", "lgtm", "yes"]);
        assert_eq!(config.deny_phrases, vec!["deny", "denied", "no", "reject"]);
        assert!(config.fail_on_denial);
        assert!(!config.exclude_initiator);
    }

    #[test]
    fn test_cli_overrides_config() {
        let file = ConfigFile {
            tracker: Some("gh".to_string()),
            approvers: Some(vec!["from-file".to_string()]),
            poll_seconds: Some(120),
            ..Default::default()
        };
        let cli = Cli::parse_from([
            "turnstile",
            "--repo",
            "octo/widgets",
            "--run-id",
            "1",
            "--tracker",
            "rest",
            "--approvers",
            "from-cli",
        ]);
        let config = merge(file, &cli);
        assert_eq!(config.tracker, "rest"); // CLI wins
        assert_eq!(config.approvers, vec!["from-cli"]); // CLI wins
        assert_eq!(config.poll_seconds, 120); // file value kept
    }

    #[test]
    fn test_validate_unknown_tracker() {
        let config = Config {
            tracker: "jira".to_string(),
            ..default_test_config()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("unknown tracker: jira"));
    }

    #[test]
    fn test_validate_missing_repo() {
        let config = Config {
            repo: String::new(),
            ..default_test_config()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("repo is required"));
    }

    #[test]
    fn test_validate_missing_run_id() {
        let config = Config {
            run_id: 0,
            ..default_test_config()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("run_id is required"));
    }

    #[test]
    fn test_validate_zero_poll_seconds() {
        let config = Config {
            poll_seconds: 0,
            ..default_test_config()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("poll_seconds must be > 0"));
    }

    #[test]
    fn test_validate_empty_vocabulary() {
        let config = Config {
            approve_phrases: vec![],
            ..default_test_config()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("approve_phrases must not be empty"));
    }

    #[test]
    fn test_validate_overlapping_vocabularies() {
        let config = Config {
            approve_phrases: vec!["ok".to_string()],
            deny_phrases: vec!["OK".to_string()],
            ..default_test_config()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("both vocabularies: ok"));
    }

    #[test]
    fn test_effective_disallowed_without_exclusion() {
        let config = Config {
            disallowed_users: vec!["mallory".to_string()],
            initiator: "starter".to_string(),
            exclude_initiator: false,
            ..default_test_config()
        };
        assert_eq!(config.effective_disallowed(), vec!["mallory"]);
    }

    #[test]
    fn test_effective_disallowed_folds_in_initiator() {
        let config = Config {
            disallowed_users: vec!["mallory".to_string()],
            initiator: "starter".to_string(),
            exclude_initiator: true,
            ..default_test_config()
        };
        assert_eq!(config.effective_disallowed(), vec!["mallory", "starter"]);
    }

    #[test]
    fn test_effective_disallowed_no_duplicate_initiator() {
        let config = Config {
            disallowed_users: vec!["starter".to_string()],
            initiator: "starter".to_string(),
            exclude_initiator: true,
            ..default_test_config()
        };
        assert_eq!(config.effective_disallowed(), vec!["starter"]);
    }

    #[test]
    fn test_load_validates_merged_config() {
        let cli = Cli::parse_from(["turnstile", "--run-id", "1"]);
        let err = Config::load(&cli).unwrap_err();
        assert!(err.to_string().contains("repo is required"));
    }

    #[test]
    fn test_load_missing_explicit_config_file() {
        let cli = Cli::parse_from([
            "turnstile",
            "--repo",
            "octo/widgets",
            "--run-id",
            "1",
            "--config",
            "/nonexistent/turnstile.toml",
        ]);
        let err = Config::load(&cli).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}

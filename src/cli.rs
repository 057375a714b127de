use clap::Parser;

/// turnstile — manual approval gate for automated workflows
#[derive(Parser, Debug, Clone)]
#[command(name = "turnstile", version, about)]
pub struct Cli {
    /// Repository the gate issue is created in (owner/name)
    #[arg(long)]
    pub repo: Option<String>,

    /// Workflow run identifier the gate belongs to
    #[arg(long)]
    pub run_id: Option<u64>,

    /// Users allowed to approve or deny (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub approvers: Vec<String>,

    /// Distinct approvals required (0 = all named approvers)
    #[arg(long)]
    pub minimum_approvals: Option<usize>,

    /// Users whose comments are ignored (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub disallowed_users: Vec<String>,

    /// Phrases that count as approval (comma-separated, replaces defaults)
    #[arg(long, value_delimiter = ',')]
    pub approve_phrases: Vec<String>,

    /// Phrases that count as denial (comma-separated, replaces defaults)
    #[arg(long, value_delimiter = ',')]
    pub deny_phrases: Vec<String>,

    /// Title fragment for the gate issue
    #[arg(long)]
    pub issue_title: Option<String>,

    /// Extra text prepended to the gate issue body
    #[arg(long)]
    pub issue_body: Option<String>,

    /// Issue tracker backend to use (rest, gh)
    #[arg(long)]
    pub tracker: Option<String>,

    /// Seconds between comment polls
    #[arg(long = "poll-seconds", alias = "poll-interval")]
    pub poll_seconds: Option<u64>,

    /// Overall wait limit in seconds (0 = wait forever)
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Base URL for run links (GitHub Enterprise support)
    #[arg(long)]
    pub base_url: Option<String>,

    /// API endpoint for the rest tracker
    #[arg(long)]
    pub api_url: Option<String>,

    /// User who started the workflow (assigned when no approvers are named)
    #[arg(long)]
    pub initiator: Option<String>,

    /// Treat the workflow initiator as a disallowed user
    #[arg(long)]
    pub exclude_initiator: bool,

    /// Whether a denial exits nonzero (default: true)
    #[arg(long)]
    pub fail_on_denial: Option<bool>,

    /// Print the gate issue instead of creating it and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Path to config file
    #[arg(long)]
    pub config: Option<String>,
}

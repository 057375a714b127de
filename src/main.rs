use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use turnstile::cli::Cli;
use turnstile::config::Config;
use turnstile::error::Error;
use turnstile::gate::ApprovalStatus;
use turnstile::request::{GateRequest, RepoCoords};
use turnstile::tracker::AnyTracker;
use turnstile::tracker::gh::GhTracker;
use turnstile::tracker::rest::RestTracker;
use turnstile::waiter::Waiter;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    info!("turnstile starting");

    let config = match Config::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    info!(?config, "config loaded");

    let coords = match RepoCoords::parse(&config.repo) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    if config.dry_run {
        let request = GateRequest::build(&config, &coords);
        println!("Title: {}", request.title);
        println!("Assignees: {}", request.assignees.join(", "));
        println!("Body:\n{}", request.body);
        return;
    }

    let tracker = match config.tracker.as_str() {
        "gh" => AnyTracker::Gh(GhTracker::new(coords)),
        _ => match RestTracker::new(&config, coords) {
            Ok(t) => AnyTracker::Rest(t),
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        },
    };

    let waiter = match Waiter::new(tracker, config.clone()) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    match waiter.run(Some(shutdown_rx)).await {
        Ok(ApprovalStatus::Approved) => info!("approval received, continuing workflow"),
        Ok(ApprovalStatus::Denied) => {
            if config.fail_on_denial {
                eprintln!("error: approval denied");
                std::process::exit(1);
            }
            info!("approval denied, fail_on_denial disabled");
        }
        // The waiter only returns terminal statuses.
        Ok(ApprovalStatus::Pending) => {}
        Err(Error::Interrupted) => std::process::exit(130),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use iglb_fetcher::{AdminAction, LeaderboardClient};

#[derive(Debug, Parser)]
#[command(name = "iglb")]
#[command(about = "Instagram AI leaderboard fetch client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch the ranked leaderboard, falling back across sources.
    Leaderboard {
        /// Bypass intermediate caches with a cache-busting query.
        #[arg(long)]
        refresh: bool,
    },
    /// Fetch follower-history series for all tracked accounts.
    Trends {
        #[arg(long)]
        refresh: bool,
    },
    /// List the usernames currently tracked.
    Accounts,
    /// Fetch the follower history of a single account.
    History { username: String },
    /// Fetch per-account analytics (growth, changes, rolling average).
    Enrich {
        usernames: Vec<String>,
        /// Maximum enrichment requests in flight at once.
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },
    /// Submit an account for tracking approval.
    Submit {
        username: String,
        #[arg(long, default_value = "")]
        submitter: String,
    },
    /// Trigger a fresh collection run.
    Scrape,
    /// Apply a moderation decision to an account.
    Admin {
        #[arg(value_enum)]
        action: AdminActionArg,
        username: String,
    },
    /// Probe the health of the collaborating services.
    Status,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AdminActionArg {
    Approve,
    Reject,
    Remove,
}

impl From<AdminActionArg> for AdminAction {
    fn from(arg: AdminActionArg) -> Self {
        match arg {
            AdminActionArg::Approve => AdminAction::Approve,
            AdminActionArg::Reject => AdminAction::Reject,
            AdminActionArg::Remove => AdminAction::Remove,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = iglb_core::load_fetcher_config(&std::collections::HashMap::new())?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let client = LeaderboardClient::new(config)?;

    match cli.command {
        Commands::Leaderboard { refresh } => {
            let board = client.fetch_leaderboard(refresh).await;
            print_json(&board)?;
        }
        Commands::Trends { refresh } => {
            let trends = client.fetch_trends(refresh).await;
            print_json(&trends)?;
        }
        Commands::Accounts => {
            let accounts = client.fetch_accounts().await?;
            print_json(&accounts)?;
        }
        Commands::History { username } => {
            let series = client.fetch_profile_history(&username).await?;
            print_json(&series)?;
        }
        Commands::Enrich {
            usernames,
            concurrency,
        } => {
            let enriched = client.enrich_profiles(&usernames, concurrency).await;
            print_json(&enriched)?;
        }
        Commands::Submit {
            username,
            submitter,
        } => {
            let ack = client.submit_account(&username, &submitter).await?;
            print_json(&ack)?;
        }
        Commands::Scrape => {
            let ack = client.trigger_scrape().await?;
            print_json(&ack)?;
        }
        Commands::Admin { action, username } => {
            let ack = client.admin_action(action.into(), &username).await?;
            print_json(&ack)?;
        }
        Commands::Status => {
            let report = client.service_status().await;
            print_json(&report)?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

mod commands;

use alloy::primitives::U256;
use anyhow::Result;
use clap::{Parser, Subcommand};
use quest_hunt_rs::{config::Config, structs::QuestFeed};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{claim, create, list, show};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Page through a quest listing
    List {
        /// all, open, ended or recent
        #[arg(long, default_value = "all")]
        feed: QuestFeed,
        /// Stop after this many pages even if more remain
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Show one quest with its resolved hint
    Show { id: U256 },
    /// Create a quest; leave --token out to pay the reward in the native coin
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        key: String,
        #[arg(long)]
        hint: String,
        #[arg(long, default_value = "")]
        token: String,
        #[arg(long)]
        amount: String,
        #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
    },
    /// Submit an answer and claim the reward
    Claim {
        id: U256,
        #[arg(long)]
        key: String,
        #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quest_cli=info,quest_hunt_rs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::List { feed, pages } => list::run(&config, feed, pages).await,
        Commands::Show { id } => show::run(&config, id).await,
        Commands::Create {
            name,
            key,
            hint,
            token,
            amount,
            private_key,
        } => {
            let form = create::form(name, key, hint, token, amount);
            create::run(&config, form, &private_key).await
        }
        Commands::Claim {
            id,
            key,
            private_key,
        } => claim::run(&config, id, &key, &private_key).await,
    }
}

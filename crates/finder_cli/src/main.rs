use clap::{Parser, Subcommand};
use finder_cli::{
    commands::{lookup_cmd, recents_cmd, search_cmd},
    config::AppConfig,
    errors::Error,
};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// GitHub finder: search GitHub users and follow them from the terminal
#[derive(Parser)]
#[command(name = "github_finder")]
#[command(about = "Search GitHub users and follow them", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive search session (default)
    Search,

    /// Look up a single user and print the profile
    Lookup {
        /// GitHub login to look up
        username: String,
    },

    /// Show the recent searches
    Recents {
        /// Forget all recent searches
        #[arg(long)]
        clear: bool,
    },

    /// Show the CLI version
    Version,
}

async fn run(cli: Cli) -> Result<(), Error> {
    let command = cli.command.unwrap_or(Commands::Search);
    if let Commands::Version = command {
        println!(
            "github_finder version {}",
            option_env!("GITHUB_FINDER_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
        );
        return Ok(());
    }

    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    match command {
        Commands::Search => search_cmd::execute(&config).await,
        Commands::Lookup { username } => lookup_cmd::execute(&config, &username).await,
        Commands::Recents { clear } => recents_cmd::execute(&config, clear),
        Commands::Version => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so they stay out of the rendered session
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("GITHUB_FINDER_LOG"))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("Error: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

//! Retail Ops server entry point.
//!
//! ```bash
//! JWT_SECRET=... NOTION_TOKEN=... retail-server serve
//! retail-server serve --memory          # local development, no Notion
//! retail-server hash-password
//! ```

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use retail_server::cli::{Cli, Commands};
use retail_server::commands;

#[tokio::main]
async fn main() {
    // Load .env.local first so it wins over .env
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Some(Commands::Serve(args)) => commands::serve(args).await,
        Some(Commands::HashPassword { password }) => commands::hash_password(password),
        None => match Cli::default_serve() {
            Ok(args) => commands::serve(args).await,
            Err(e) => e.exit(),
        },
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Server exited with an error");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

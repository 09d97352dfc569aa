//! Command-line interface definition using clap.
//!
//! Every option can also come from the environment (or a `.env` file), which
//! is how deployments configure the server.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use retail_api::{RateLimitConfig, ServerConfig};
use retail_notion::{DatabaseIds, NotionConfig, DEFAULT_BASE_URL, DEFAULT_NOTION_VERSION};

const MAX_TTL_HOURS: u64 = 365 * 24;

/// Retail Ops backend: JSON API over a Notion workspace
#[derive(Parser, Debug)]
#[command(name = "retail-server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the API server (default)
    Serve(ServeArgs),

    /// Print an argon2 hash for provisioning a user directly in Notion
    HashPassword {
        /// Password to hash (read from stdin if omitted)
        password: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Allowed CORS origins, comma separated; `*` allows any
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',', default_value = "*")]
    pub cors_origins: Vec<String>,

    /// HMAC secret for session tokens (at least 32 bytes)
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Session token lifetime in hours (at most a year)
    #[arg(
        long,
        env = "JWT_TTL_HOURS",
        default_value_t = 24,
        value_parser = clap::value_parser!(u64).range(1..=MAX_TTL_HOURS)
    )]
    pub jwt_ttl_hours: u64,

    /// Requests per client per window
    #[arg(long, env = "RATE_LIMIT_MAX", default_value_t = 100)]
    pub rate_limit_max: u32,

    /// Rate limit window in seconds
    #[arg(long, env = "RATE_LIMIT_WINDOW_SECS", default_value_t = 60)]
    pub rate_limit_window_secs: u64,

    /// Login attempts per client per window
    #[arg(long, env = "LOGIN_RATE_LIMIT_MAX", default_value_t = 10)]
    pub login_rate_limit_max: u32,

    /// Use an in-memory store instead of Notion (development only)
    #[arg(long)]
    pub memory: bool,

    /// Admin account seeded into the in-memory store
    #[arg(long, env = "ADMIN_EMAIL", default_value = "admin@example.com")]
    pub admin_email: String,

    /// Password for the seeded admin (generated if omitted)
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    #[command(flatten)]
    pub notion: NotionArgs,
}

#[derive(Args, Debug, Clone)]
pub struct NotionArgs {
    /// Notion integration token
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    pub notion_token: Option<String>,

    /// Notion-Version header
    #[arg(long, env = "NOTION_VERSION", default_value = DEFAULT_NOTION_VERSION)]
    pub notion_version: String,

    /// Notion API root
    #[arg(long, env = "NOTION_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub notion_base_url: String,

    #[arg(long, env = "NOTION_DB_STORES", default_value = "")]
    pub db_stores: String,

    #[arg(long, env = "NOTION_DB_USERS", default_value = "")]
    pub db_users: String,

    #[arg(long, env = "NOTION_DB_TASKS", default_value = "")]
    pub db_tasks: String,

    #[arg(long, env = "NOTION_DB_COMMENTS", default_value = "")]
    pub db_comments: String,

    #[arg(long, env = "NOTION_DB_FORMS", default_value = "")]
    pub db_forms: String,

    #[arg(long, env = "NOTION_DB_FORM_SUBMISSIONS", default_value = "")]
    pub db_form_submissions: String,

    #[arg(long, env = "NOTION_DB_NOTIFICATIONS", default_value = "")]
    pub db_notifications: String,

    #[arg(long, env = "NOTION_DB_MESSAGES", default_value = "")]
    pub db_messages: String,

    #[arg(long, env = "NOTION_DB_FINANCE", default_value = "")]
    pub db_finance: String,
}

impl Cli {
    /// `serve` with every option taken from the environment, for when no
    /// subcommand is given.
    pub fn default_serve() -> Result<ServeArgs, clap::Error> {
        match Cli::try_parse_from(["retail-server", "serve"])?.command {
            Some(Commands::Serve(args)) => Ok(args),
            _ => Err(clap::Error::new(clap::error::ErrorKind::MissingSubcommand)),
        }
    }

    /// Default log filter for the verbosity level; `RUST_LOG` overrides it.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "retail_server=info,retail_api=info,retail_notion=info,retail_auth=info,tower_http=warn",
            1 => "retail_server=debug,retail_api=debug,retail_notion=debug,retail_auth=debug,tower_http=debug",
            2 => "retail_server=trace,retail_api=trace,retail_notion=trace,retail_auth=trace,tower_http=trace",
            _ => "trace",
        }
    }
}

impl ServeArgs {
    /// API configuration with the given (already resolved) secret.
    pub fn server_config(&self, jwt_secret: String) -> ServerConfig {
        ServerConfig::new(self.host.clone(), self.port)
            .with_cors_origins(
                self.cors_origins
                    .iter()
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect(),
            )
            .with_jwt_secret(jwt_secret)
            .with_token_ttl(Duration::from_secs(
                self.jwt_ttl_hours.saturating_mul(60 * 60),
            ))
            .with_rate_limit(RateLimitConfig::new(
                self.rate_limit_max,
                Duration::from_secs(self.rate_limit_window_secs),
            ))
            .with_login_rate_limit(RateLimitConfig::new(
                self.login_rate_limit_max,
                Duration::from_secs(self.rate_limit_window_secs),
            ))
    }
}

impl NotionArgs {
    pub fn notion_config(&self) -> NotionConfig {
        let databases = DatabaseIds {
            stores: self.db_stores.clone(),
            users: self.db_users.clone(),
            tasks: self.db_tasks.clone(),
            comments: self.db_comments.clone(),
            forms: self.db_forms.clone(),
            form_submissions: self.db_form_submissions.clone(),
            notifications: self.db_notifications.clone(),
            messages: self.db_messages.clone(),
            finance: self.db_finance.clone(),
        };
        NotionConfig::new(self.notion_token.clone().unwrap_or_default(), databases)
            .with_version(self.notion_version.clone())
            .with_base_url(self.notion_base_url.clone())
    }
}

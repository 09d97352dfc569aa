//! Command implementations.

use std::io::{self, BufRead};
use std::sync::Arc;

use tracing::{info, warn};

use retail_api::AppState;
use retail_auth::{hash_password as argon2_hash, MIN_PASSWORD_LEN};
use retail_models::{record, Role, User};
use retail_notion::{MemoryStore, NotionClient, RecordStore};

use crate::cli::ServeArgs;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Runs the API server until shutdown.
pub async fn serve(args: ServeArgs) -> Result<()> {
    let secret = resolve_secret(&args)?;
    let store = build_store(&args).await?;
    let state = AppState::new(args.server_config(secret), store)?;
    retail_api::serve(state).await?;
    Ok(())
}

/// Prints the PHC hash of a password given as an argument or on stdin.
pub fn hash_password(password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => {
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    println!("{}", hash_checked(&password)?);
    Ok(())
}

fn hash_checked(password: &str) -> Result<String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!("password must be at least {} characters", MIN_PASSWORD_LEN).into());
    }
    Ok(argon2_hash(password)?)
}

/// The configured JWT secret. Memory mode falls back to a per-process secret.
fn resolve_secret(args: &ServeArgs) -> Result<String> {
    match args.jwt_secret.as_deref().map(str::trim) {
        Some(secret) if !secret.is_empty() => Ok(secret.to_string()),
        _ if args.memory => {
            warn!("JWT_SECRET not set; using an ephemeral secret, tokens will not survive a restart");
            Ok(random_secret())
        }
        _ => Err("JWT_SECRET is required".into()),
    }
}

fn random_secret() -> String {
    format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
}

async fn build_store(args: &ServeArgs) -> Result<Arc<dyn RecordStore>> {
    if args.memory {
        warn!("Using the in-memory store; data is lost on exit");
        let store = MemoryStore::new();
        seed_admin(&store, args).await?;
        return Ok(Arc::new(store));
    }

    let client = NotionClient::new(args.notion.notion_config())?;
    info!("Using Notion at {}", args.notion.notion_base_url);
    Ok(Arc::new(client))
}

/// Creates the admin account so a fresh memory store can be logged into.
async fn seed_admin(store: &dyn RecordStore, args: &ServeArgs) -> Result<User> {
    let (password, generated) = match &args.admin_password {
        Some(p) => (p.clone(), false),
        None => (random_secret()[..16].to_string(), true),
    };

    let admin = User::new("Admin", &args.admin_email, Role::Admin, None)
        .with_password_hash(hash_checked(&password)?);
    let admin = record::insert(store, &admin).await?;

    if generated {
        warn!(email = %admin.email, password = %password, "Seeded admin with a generated password");
    } else {
        info!(email = %admin.email, "Seeded admin account");
    }
    Ok(admin)
}

use clap::{Parser, Subcommand};

mod admin;
mod app;
mod auth;
mod config;
mod demo;
mod error;
mod journal;
mod mailer;
mod state;
mod users;

use crate::auth::password::hash_password;
use crate::state::AppState;
use crate::users::handlers::{check_password_strength, is_valid_email};
use crate::users::repo::{User, UserType};

#[derive(Parser)]
#[command(name = "journal-api", about = "Journal-keeping web API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (the default).
    Serve,
    /// Create an admin account. Admins cannot be registered over HTTP.
    CreateAdmin { email: String, password: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "journal_api=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let cli = Cli::parse();
    let state = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&state.db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let app = app::build_app(state);
            app::serve(app).await
        }
        Command::CreateAdmin { email, password } => create_admin(state, email, password).await,
    }
}

async fn create_admin(state: AppState, email: String, password: String) -> anyhow::Result<()> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        anyhow::bail!("invalid email address: {email}");
    }
    check_password_strength(&password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let hash = hash_password(&password)?;
    let user = User::create(&state.db, &email, &hash, UserType::Admin).await?;
    println!("Created new admin user ({})", user.email);
    Ok(())
}

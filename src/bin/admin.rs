//! CLI administration tool for tourbase.
//!
//! Provides commands for managing users and performing database checks
//! without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Create a user (prompts for a password)
//! cargo run --bin admin -- user create --email ops@example.com --role admin
//!
//! # Change a user's role
//! cargo run --bin admin -- user promote ops@example.com --role lead-guide
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use tourbase::domain::entities::{NewUser, Role, UserPatch};
use tourbase::domain::repositories::{ResourceRepository, UserRepository};
use tourbase::infrastructure::persistence::PgUserRepository;
use tourbase::utils::password::hash_password;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing tourbase.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// User management subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Display name (prompted if not provided)
        #[arg(short, long)]
        name: Option<String>,

        /// Email address (prompted if not provided)
        #[arg(short, long)]
        email: Option<String>,

        /// Role for the new user
        #[arg(short, long, value_enum, default_value_t = RoleArg::User)]
        role: RoleArg,
    },

    /// Change an existing user's role
    Promote {
        /// Email of the user to change
        email: String,

        /// New role
        #[arg(short, long, value_enum)]
        role: RoleArg,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Admin,
    User,
    Guide,
    #[value(name = "lead-guide")]
    LeadGuide,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Role::Admin,
            RoleArg::User => Role::User,
            RoleArg::Guide => Role::Guide,
            RoleArg::LeadGuide => Role::LeadGuide,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches user management commands.
async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgUserRepository::new(Arc::new(pool.clone())));

    match action {
        UserAction::Create { name, email, role } => {
            create_user(repo, name, email, role.into()).await?;
        }
        UserAction::Promote { email, role, yes } => {
            promote_user(repo, &email, role.into(), yes).await?;
        }
    }

    Ok(())
}

async fn create_user(
    repo: Arc<PgUserRepository>,
    name: Option<String>,
    email: Option<String>,
    role: Role,
) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => Input::new().with_prompt("Display name").interact_text()?,
    };

    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email address").interact_text()?,
    };

    let password = Password::new()
        .with_prompt("Password (min 8 characters)")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    if password.len() < 8 {
        bail!("Password must be at least 8 characters");
    }

    let user = ResourceRepository::create(
        repo.as_ref(),
        NewUser {
            name,
            email,
            photo: None,
            role,
            password_hash: hash_password(&password),
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create user: {e}"))?;

    println!("{}", "User created".green().bold());
    println!("  id:    {}", user.id);
    println!("  email: {}", user.email.cyan());

    Ok(())
}

async fn promote_user(
    repo: Arc<PgUserRepository>,
    email: &str,
    role: Role,
    skip_confirm: bool,
) -> Result<()> {
    let user = repo
        .find_by_email(email)
        .await
        .map_err(|e| anyhow::anyhow!("Lookup failed: {e}"))?
        .with_context(|| format!("No user with email {email}"))?;

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Change role of {} ({:?} -> {:?})?",
                user.email, user.role, role
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Aborted".yellow());
            return Ok(());
        }
    }

    ResourceRepository::update(
        repo.as_ref(),
        user.id,
        UserPatch {
            role: Some(role),
            ..Default::default()
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to update role: {e}"))?;

    println!("{}", "Role updated".green().bold());

    Ok(())
}

/// Dispatches database commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            sqlx::query("SELECT 1")
                .execute(pool)
                .await
                .context("Database check failed")?;
            println!("{}", "Database connection OK".green().bold());
        }
    }

    Ok(())
}

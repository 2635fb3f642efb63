//! Bootstrap and maintenance CLI.
//!
//! Staff creation over HTTP requires an authenticated session, so the first
//! account (typically an HOD) has to come from somewhere: this tool inserts
//! it directly. Also carries the migration runner used in deployments.

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use mentor_portal::authz::RoleSet;
use mentor_portal::utils::{hash_password, utc_now};

#[derive(Parser, Debug)]
#[command(author, version, about = "mentor-portal admin tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending migrations
    MigrateRun,
    /// Insert a staff account directly (bootstrap path, no session needed)
    CreateStaff {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// e.g. HOD, CLASS_ADVISOR+PROJECT_MENTOR
        #[arg(long)]
        role: String,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        section: Option<String>,
        #[arg(long)]
        domain: Option<String>,
    },
    /// Print all staff accounts
    ListStaff,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenvy::dotenv().is_err() {
        let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(crate_env);
    }

    let cli = Cli::parse();
    let pool = connect().await?;

    match cli.command {
        Commands::MigrateRun => {
            sqlx::migrate!()
                .run(&pool)
                .await
                .context("failed to run migrations")?;
            println!("migrations applied");
        }
        Commands::CreateStaff {
            name,
            email,
            password,
            role,
            department,
            section,
            domain,
        } => {
            let roles = RoleSet::parse(&role);
            if roles.is_empty() {
                anyhow::bail!("unrecognized role: {role}");
            }

            let password_hash =
                hash_password(&password).map_err(|err| anyhow::anyhow!(err.to_string()))?;
            let id = Uuid::new_v4();
            let staff_id = format!("ST{}", &id.simple().to_string()[..8].to_uppercase());
            let now = utc_now();

            sqlx::query(
                "INSERT INTO staffs (id, staff_id, name, email, password_hash, role, department, section, domain, ie_allocated, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
            )
            .bind(id)
            .bind(&staff_id)
            .bind(&name)
            .bind(&email)
            .bind(password_hash)
            .bind(&role)
            .bind(&department)
            .bind(&section)
            .bind(&domain)
            .bind(now)
            .bind(now)
            .execute(&pool)
            .await
            .context("failed to insert staff account")?;

            println!("created {staff_id} ({email}, {role})");
        }
        Commands::ListStaff => {
            let rows = sqlx::query(
                "SELECT staff_id, name, email, role, department, section FROM staffs ORDER BY name",
            )
            .fetch_all(&pool)
            .await?;

            for row in rows {
                let staff_id: String = row.get("staff_id");
                let name: String = row.get("name");
                let email: String = row.get("email");
                let role: String = row.get("role");
                let department: Option<String> = row.get("department");
                let section: Option<String> = row.get("section");
                println!(
                    "{staff_id}\t{name}\t{email}\t{role}\t{}\t{}",
                    department.unwrap_or_default(),
                    section.unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}

async fn connect() -> anyhow::Result<SqlitePool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    SqlitePoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .context("failed to connect to database")
}

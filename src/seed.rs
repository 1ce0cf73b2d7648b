//! Seed binary for populating the fitting database with sample users.
//!
//! Usage: cargo run --bin seed
//!        cargo run --bin seed -- --file fixtures/tailors.toml
//!
//! Reads seed.toml in the project root, creates the tables if needed and
//! inserts each user along with their measurements.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fitdb::cli::ConnectionArgs;
use fitdb::records::{self, Measurements, NewUser, Saved};
use fitdb::{DbConnection, schema};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(about = "Load users and measurements from a TOML file")]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Seed file to read
    #[arg(long, default_value = "seed.toml")]
    file: PathBuf,
}

#[derive(Debug, Deserialize)]
struct SeedData {
    #[serde(default)]
    users: Vec<SeedUser>,
}

#[derive(Debug, Deserialize)]
struct SeedUser {
    #[serde(flatten)]
    user: NewUser,
    #[serde(default)]
    measurements: Option<Measurements>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    fitdb::logging::init();

    let seed_content = fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let seed_data: SeedData = toml::from_str(&seed_content)
        .with_context(|| format!("parsing {}", args.file.display()))?;

    println!("🌱 Seeding database...");
    let config = args.connection.config();
    let mut conn = DbConnection::connect(&config).await?;
    println!("📦 Connected to database: {}", config.describe());

    let outcome = seed(&mut conn, &seed_data).await;
    conn.shutdown().await;
    outcome?;

    println!("✅ Seeding complete!");

    Ok(())
}

async fn seed(conn: &mut DbConnection, seed_data: &SeedData) -> Result<()> {
    schema::apply(conn).await?;
    println!("📋 Found {} users to seed", seed_data.users.len());

    for entry in &seed_data.users {
        let email = &entry.user.email;
        let user_id = match records::find_user_id(conn, email).await? {
            Some(id) => {
                println!("  • User already exists: {} (id: {})", email, id);
                id
            }
            None => match records::create_user(conn, &entry.user).await {
                Ok(id) => {
                    println!("  ✓ Created user: {} (id: {})", email, id);
                    id
                }
                Err(e) => {
                    println!("  ✗ Failed to create user {}: {}", email, e);
                    continue;
                }
            },
        };

        let Some(measurements) = &entry.measurements else {
            continue;
        };
        match records::save_measurements(conn, user_id, measurements).await {
            Ok(Saved::Inserted) => println!("    ✓ Saved measurements"),
            Ok(Saved::Updated) => println!("    ✓ Updated measurements"),
            Err(e) => println!("    ✗ Failed to save measurements for {}: {}", email, e),
        }
    }

    Ok(())
}

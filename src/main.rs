//! Creates the users and measurements tables if they do not exist yet.
//!
//! Usage: cargo run --bin init-db
//!        cargo run --bin init-db -- --db sqlite:fit.db?mode=rwc

use anyhow::Result;
use clap::Parser;
use fitdb::cli::ConnectionArgs;
use fitdb::{DbConnection, schema};

#[derive(Parser, Debug)]
#[command(name = "init-db")]
#[command(about = "Create the fitting database tables")]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    fitdb::logging::init();

    let config = args.connection.config();
    let mut conn = DbConnection::connect(&config).await?;

    let outcome = schema::apply(&mut conn).await;
    conn.shutdown().await;
    outcome?;

    println!("Database tables created successfully");

    Ok(())
}

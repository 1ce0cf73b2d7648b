//! Clear binary for resetting the fitting database.
//!
//! Usage: cargo run --bin clear
//!
//! Deletes all rows from every table with foreign key checks suspended,
//! then prints each table again to show it is empty.

use anyhow::Result;
use clap::Parser;
use fitdb::cli::ConnectionArgs;
use fitdb::wiper::{self, VERIFIED_EMPTY};
use fitdb::DbConnection;

#[derive(Parser, Debug)]
#[command(name = "clear")]
#[command(about = "Delete all data from every table and verify")]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    fitdb::logging::init();

    let config = args.connection.config();
    println!("Connecting to database: {}", config.describe());
    let mut conn = DbConnection::connect(&config).await?;

    let outcome = wiper::wipe_all(&mut conn).await;
    conn.shutdown().await;
    let report = outcome?;

    for table in &report.cleared {
        println!("Deleted data from table: {table}");
    }

    println!("\nAll data has been deleted. Verifying...");
    for dump in &report.verification {
        println!("\n{}", dump.render(VERIFIED_EMPTY));
    }

    if !report.all_empty() {
        anyhow::bail!("some tables still contain rows after clearing");
    }

    Ok(())
}

//! Prints every row of every table in the database.
//!
//! Usage: cargo run --bin dump
//!        cargo run --bin dump -- --db sqlite:fit.db

use anyhow::Result;
use clap::Parser;
use fitdb::cli::ConnectionArgs;
use fitdb::{DbConnection, dumper};

#[derive(Parser, Debug)]
#[command(name = "dump")]
#[command(about = "Print all rows from every table")]
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

    let outcome = dumper::dump_all(&mut conn).await;
    conn.shutdown().await;

    for dump in outcome? {
        println!("\n{dump}");
    }

    Ok(())
}

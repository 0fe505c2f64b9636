use clap::{Parser, Subcommand};
use rowmq::{config::Config, db};

#[derive(Debug, Parser)]
#[command(name = "rowmq", version, about = "SQL-backed message queue and pub/sub broker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the database if needed and apply pending migrations.
    #[command(alias = "m")]
    Migrate,
    /// Run the HTTP server.
    #[command(alias = "s")]
    Server,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    rowmq::init_tracing()?;
    let config = Config::load()?;

    match cli.command {
        Command::Migrate => {
            let pool = db::connect(&config).await?;
            pool.close().await;
            tracing::info!(db_path = config.db_path(), "migrations applied");
        }
        Command::Server => rowmq::run().config(config).start().await?,
    }

    Ok(())
}

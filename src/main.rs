use clap::Parser;
use newsrag::cli::commands::{Cli, Commands};
use newsrag::config::Settings;
use newsrag::server::startup::start_server;
use newsrag::NewsRag;
use std::sync::Arc;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("newsrag=info,tower_http=info,warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    let app = match NewsRag::new(&settings) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error initializing newsrag: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(app, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(app: NewsRag, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Ingest { file } => {
            let count = app.ingest_file(&file)?;
            println!("Stored {count} embeddings in collection {}", app.collection());
        }
        Commands::Serve { addr } => {
            start_server(Arc::new(app), addr).await?;
        }
        Commands::Query { text, top_k } => {
            let result = app.retrieve(&text, top_k).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Stats => {
            let info = app.stats()?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Get { id } => {
            let record = app
                .record(&id)?
                .ok_or_else(|| format!("No record with id {id} in {}", app.collection()))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }
    Ok(())
}

//! EpiCourier
//!
//! An MCP server for recipe browsing, meal planning and nutrition insights.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use epicourier::build_info;
use epicourier::config::Config;
use epicourier::db::Database;
use epicourier::mcp::EpiCourierService;
use epicourier::recommender::RecommenderClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("epicourier=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = Config::from_env();
    eprintln!("Database path: {}", config.database_path.display());
    eprintln!("Recommender backend: {}", config.backend_url);

    eprintln!("Initializing database...");
    let database = Database::open(&config.database_path)?;

    let recommender = RecommenderClient::new(&config.backend_url, config.http_timeout)?;
    let service = EpiCourierService::new(config.database_path.clone(), database, recommender);

    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}

#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

mod config;
mod db;
mod utils;
mod web;

use config::Config;
use web::WebServer;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Arc::new(Config::load()?);
    utils::logging::init_tracing(&config.logging);

    info!("bookshelf api starting up");

    let db_manager = Arc::new(db::DatabaseManager::new(&config.database).await?);
    db_manager.ensure_schema().await?;

    let web_server = WebServer::new(config.clone(), db_manager.clone()).await?;
    web_server.start().await?;

    info!("bookshelf api shutting down");
    Ok(())
}

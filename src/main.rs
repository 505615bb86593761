mod config;
mod error;
mod model;
mod relay;
mod web;

use actix_web::{App, HttpServer, web::Data};
use anyhow::Context;
use dotenv::dotenv;
use log::info;

use config::Config;
use relay::Relay;
use web::routes;

// App state structure
pub struct AppState {
    pub relay: Relay,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Japanese chat relay");

    let config = Config::from_env().context("Failed to read configuration")?;
    let relay = Relay::new(&config);
    info!("Relay mode: {}", relay.mode());

    let app_state = Data::new(AppState { relay });

    info!("Listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?
    .run()
    .await
    .context("Server error")
}

mod config;
mod error;
mod job_controller;
mod services;
mod state;
#[cfg(test)]
mod test_support;

use crate::config::AppConfig;
use crate::state::AppState;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::load();
    let state = AppState::from_config(&config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let state = web::Data::new(state);

    // Background flush of queued registrations
    state.flusher.start();

    info!(
        "Server running at http://{}:{} (data in {})",
        config.host,
        config.port,
        config.data_dir.display()
    );

    let server_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(services::cors())
            .wrap(Logger::default())
            .app_data(server_state.clone())
            .configure(services::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    // actix has stopped accepting requests on SIGINT/SIGTERM; drain what is left
    state.flusher.shutdown().await;
    Ok(())
}

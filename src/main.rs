//! Main entry point for the backend server.
//!
//! Initializes logging, loads the game rules and location catalog, starts the
//! game server actor, and launches the HTTP server with the WebSocket endpoint.

use std::io;
use std::path::Path;

use actix::Actor;
use actix_web::{App, HttpServer, web};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use config::server::{CATALOG_ENV, bind_address};
use config::game::GameConfig;
use game::catalog::LocationCatalog;
use server::game_server::GameServer;
use server::game_session::registry::UuidRoomIds;
use server::game_session::session::Rules;

mod config;
mod game;
mod server;


fn load_catalog() -> Result<LocationCatalog, game::catalog::CatalogError> {
    match std::env::var(CATALOG_ENV) {
        Ok(path) => LocationCatalog::from_file(Path::new(&path)),
        Err(_) => LocationCatalog::bundled(),
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize logger from environment variable (default to info level).
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::from_env().map_err(io::Error::other)?;
    let catalog = load_catalog().map_err(io::Error::other)?;
    let (host, port) = bind_address().map_err(io::Error::other)?;
    info!(
        "[Main] Catalog modes: {:?}, {} rounds of {:?}",
        catalog.modes().collect::<Vec<_>>(),
        config.max_rounds,
        config.round_duration
    );

    // Start the GameServer actor (queue, rooms, round timers).
    let game_server = GameServer::new(
        Rules::new(config, catalog),
        Box::new(UuidRoomIds),
        StdRng::from_os_rng(),
    )
    .start();

    // Shared application state for WebSocket handlers.
    let state = web::Data::new(server::state::AppState::new(game_server));

    info!("[Main] Listening on {}:{}", host, port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

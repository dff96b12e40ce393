mod api;
mod blockchain;
mod config;
mod mining;
mod token;
mod wallet;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;
use std::io;

use api::AppState;
use config::Settings;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let settings =
        Settings::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let (host, port) = (settings.host.clone(), settings.port);

    info!("🔥 Starting proof-of-burn API at http://{host}:{port}");
    info!(
        "CONFIG - {} blocks per window, retarget every {} windows, halving every {} claims",
        settings.contract.block_creation_rate,
        settings.contract.difficulty_adjustment_period,
        settings.contract.reward_adjustment_period
    );

    let state = web::Data::new(AppState::new(&settings));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

mod balance;
mod chain;
mod health;
mod mining;
pub mod models;
mod state;
mod transmute;
mod wallet;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::validate_chain)
            .service(chain::advance_chain)
            .service(mining::post_mine)
            .service(mining::post_claim)
            .service(mining::get_winning)
            .service(state::get_state)
            .service(state::get_block)
            .service(state::get_attempt)
            .service(state::get_events)
            .service(balance::get_balance)
            .service(balance::post_transfer)
            .service(transmute::post_transmute)
            .service(wallet::create_wallet)
            .service(wallet::sign_payload),
    );
}

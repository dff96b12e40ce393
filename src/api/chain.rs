use actix_web::{HttpResponse, Responder, get, post, web};
use log::info;

use super::models::{AdvanceRequest, AdvanceResponse, AppState, HeadResponse, ValidateResponse};

/// Largest single advance accepted by the dev endpoint.
const MAX_ADVANCE: u64 = 10_000;

/// Current head of the host chain.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let chain = state.chain.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(HeadResponse {
        height: chain.height(),
        length: chain.len(),
        head: chain.last_block(),
    })
}

/// Validate the whole host chain.
#[get("/chain/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let chain = state.chain.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(ValidateResponse {
        valid: chain.is_valid_chain(),
        length: chain.len(),
    })
}

/// Append blocks to the host chain (dev only).
#[post("/chain/advance/")]
pub async fn advance_chain(
    state: web::Data<AppState>,
    body: web::Json<AdvanceRequest>,
) -> impl Responder {
    if body.blocks == 0 || body.blocks > MAX_ADVANCE {
        return HttpResponse::BadRequest()
            .body(format!("blocks must be between 1 and {MAX_ADVANCE}"));
    }
    let mut chain = state.chain.lock().expect("mutex poisoned");
    let height = chain.advance(body.blocks);
    let window = {
        let contract = state.contract.lock().expect("mutex poisoned");
        contract.indexer().window_of(height)
    };
    info!("CHAIN - advanced {} blocks to height {height} (window {window})", body.blocks);
    HttpResponse::Ok().json(AdvanceResponse { height, window })
}

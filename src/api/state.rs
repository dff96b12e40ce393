use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, AttemptResponse, BlockResponse, EventsQuery, EventsResponse};
use crate::wallet::Address;

/// Contract-wide snapshot at the current host height.
#[get("/state/")]
pub async fn get_state(state: web::Data<AppState>) -> impl Responder {
    let chain = state.chain.lock().expect("mutex poisoned");
    let contract = state.contract.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(contract.contract_state(&*chain))
}

#[get("/blocks/{window}/")]
pub async fn get_block(state: web::Data<AppState>, path: web::Path<(u64,)>) -> impl Responder {
    let window = path.into_inner().0;
    let chain = state.chain.lock().expect("mutex poisoned");
    let contract = state.contract.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(BlockResponse {
        data: contract.block_data(window),
        phase: contract.window_phase(&*chain, window),
    })
}

#[get("/attempts/{window}/{address}/")]
pub async fn get_attempt(
    state: web::Data<AppState>,
    path: web::Path<(u64, String)>,
) -> impl Responder {
    let (window, address) = path.into_inner();
    let address = Address::new(address);
    let contract = state.contract.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(AttemptResponse {
        window,
        attempt: contract.mining_attempt(window, &address),
        slice: contract.attempt_slice(window, &address).ok(),
        address,
    })
}

/// Contract event log, from sequence number `from` onwards.
#[get("/events/")]
pub async fn get_events(
    state: web::Data<AppState>,
    query: web::Query<EventsQuery>,
) -> impl Responder {
    let contract = state.contract.lock().expect("mutex poisoned");
    let log = contract.events();
    HttpResponse::Ok().json(EventsResponse {
        total: log.len(),
        events: log.since(query.from),
    })
}

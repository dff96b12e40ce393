use actix_web::{HttpResponse, Responder, get, post, web};
use log::debug;
use serde_json::Value;

use super::models::{
    AppState, ClaimPayload, MinePayload, Signed, WinningResponse, contract_error,
};
use crate::wallet::Address;

/// Burn wei for a slice of the current window.
#[post("/mine/")]
pub async fn post_mine(
    state: web::Data<AppState>,
    req: web::Json<Signed<Value>>,
) -> impl Responder {
    let (caller, payload) = match req.into_inner().open::<MinePayload>() {
        Ok(opened) => opened,
        Err(resp) => return resp,
    };
    debug!(
        "POST /mine/ - {} offers {} wei for window {}",
        caller, payload.value, payload.window
    );

    let chain = state.chain.lock().expect("mutex poisoned");
    let mut contract = state.contract.lock().expect("mutex poisoned");
    match contract.mine(&*chain, &caller, payload.window, payload.value) {
        Ok(receipt) => HttpResponse::Ok().json(receipt),
        Err(err) => contract_error(err),
    }
}

/// Redeem a won window for the signer or a beneficiary.
#[post("/claim/")]
pub async fn post_claim(
    state: web::Data<AppState>,
    req: web::Json<Signed<Value>>,
) -> impl Responder {
    let (caller, payload) = match req.into_inner().open::<ClaimPayload>() {
        Ok(opened) => opened,
        Err(resp) => return resp,
    };
    let credit_to = payload.credit_to.unwrap_or_else(|| caller.clone());

    let chain = state.chain.lock().expect("mutex poisoned");
    let mut contract = state.contract.lock().expect("mutex poisoned");
    match contract.claim(&*chain, &caller, payload.window, &credit_to) {
        Ok(receipt) => HttpResponse::Ok().json(receipt),
        Err(err) => contract_error(err),
    }
}

#[get("/winning/{window}/{address}/")]
pub async fn get_winning(
    state: web::Data<AppState>,
    path: web::Path<(u64, String)>,
) -> impl Responder {
    let (window, address) = path.into_inner();
    let address = Address::new(address);

    let chain = state.chain.lock().expect("mutex poisoned");
    let contract = state.contract.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(WinningResponse {
        window,
        winning: contract.check_winning(&*chain, window, &address),
        address,
    })
}

use actix_web::{HttpResponse, Responder, post, web};
use log::debug;
use serde_json::Value;

use super::models::{
    AppState, Signed, TransmutePayload, TransmuteResponse, bump_nonce, contract_error,
    expect_nonce,
};
use crate::mining::ContractError;

/// Burn the signer's tokens and credit them in a hosted target contract.
#[post("/transmute/")]
pub async fn post_transmute(
    state: web::Data<AppState>,
    req: web::Json<Signed<Value>>,
) -> impl Responder {
    let (caller, payload) = match req.into_inner().open::<TransmutePayload>() {
        Ok(opened) => opened,
        Err(resp) => return resp,
    };
    debug!(
        "POST /transmute/ - {} -> {} ({} units)",
        caller, payload.target, payload.amount
    );

    let chain = state.chain.lock().expect("mutex poisoned");
    let mut contract = state.contract.lock().expect("mutex poisoned");
    let mut targets = state.targets.lock().expect("mutex poisoned");
    let mut nonces = state.nonces.lock().expect("mutex poisoned");
    if let Err(resp) = expect_nonce(&nonces, &caller, payload.nonce) {
        return resp;
    }
    let Some(target) = targets.get_mut(&payload.target) else {
        return contract_error(ContractError::UnsupportedCapability(payload.target.clone()));
    };

    match contract.transmute(
        &*chain,
        &caller,
        &payload.target,
        target.as_mut(),
        payload.amount,
    ) {
        Ok(dest_quantity) => {
            bump_nonce(&mut nonces, &caller);
            HttpResponse::Ok().json(TransmuteResponse {
                target: payload.target.clone(),
                source_quantity: payload.amount,
                dest_quantity,
                balance: contract.balance_of(&caller),
            })
        }
        Err(err) => contract_error(err),
    }
}

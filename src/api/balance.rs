use actix_web::{HttpResponse, Responder, get, post, web};
use serde_json::Value;

use super::models::{
    AppState, BalanceResponse, Signed, TransferPayload, TransferResponse, bump_nonce,
    contract_error, expect_nonce,
};
use crate::token::format_units;
use crate::wallet::Address;

#[get("/balance/{address}/")]
pub async fn get_balance(state: web::Data<AppState>, path: web::Path<(String,)>) -> impl Responder {
    let address = Address::new(path.into_inner().0);

    let balance = {
        let contract = state.contract.lock().expect("mutex poisoned");
        contract.balance_of(&address)
    };
    let nonce = {
        let nonces = state.nonces.lock().expect("mutex poisoned");
        nonces.get(&address).copied().unwrap_or(0)
    };

    HttpResponse::Ok().json(BalanceResponse {
        address,
        balance,
        formatted: format_units(balance),
        nonce,
    })
}

/// Move tokens from the signer to another address.
#[post("/transfer/")]
pub async fn post_transfer(
    state: web::Data<AppState>,
    req: web::Json<Signed<Value>>,
) -> impl Responder {
    let (from, payload) = match req.into_inner().open::<TransferPayload>() {
        Ok(opened) => opened,
        Err(resp) => return resp,
    };

    let chain = state.chain.lock().expect("mutex poisoned");
    let mut contract = state.contract.lock().expect("mutex poisoned");
    let mut nonces = state.nonces.lock().expect("mutex poisoned");
    if let Err(resp) = expect_nonce(&nonces, &from, payload.nonce) {
        return resp;
    }
    if let Err(err) = contract.transfer(&*chain, &from, &payload.to, payload.amount) {
        return contract_error(err);
    }
    bump_nonce(&mut nonces, &from);

    HttpResponse::Ok().json(TransferResponse {
        balance: contract.balance_of(&from),
        from,
        to: payload.to.clone(),
        amount: payload.amount,
    })
}

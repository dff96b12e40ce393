use actix_web::{HttpResponse, Responder, post, web};
use serde::{Deserialize, Serialize};

use super::models::signing_bytes;
use crate::wallet::{
    Address, digest, generate_keypair_hex, pubkey_from_secret_hex, sign_digest_hex,
};

#[derive(Serialize)]
struct NewWalletResponse {
    private_key: String,
    public_key: String,
    address: Address,
}

#[post("/wallet/new/")]
pub async fn create_wallet() -> impl Responder {
    let (sk, pk, addr) = generate_keypair_hex();
    HttpResponse::Ok().json(NewWalletResponse {
        private_key: sk,
        public_key: pk,
        address: Address::new(addr),
    })
}

#[derive(Deserialize)]
pub struct SignRequest {
    pub private_key: String,
    pub payload: serde_json::Value,
}

/// Envelope ready to post to `/mine/`, `/claim/`, `/transfer/` or `/transmute/`.
#[derive(Serialize)]
struct SignResponse {
    pubkey: String,
    signature: String,
    payload: serde_json::Value,
}

/// Sign a request payload with a local key (dev only; the key travels in clear).
#[post("/wallet/sign/")]
pub async fn sign_payload(body: web::Json<SignRequest>) -> impl Responder {
    let body = body.into_inner();
    let pubkey = match pubkey_from_secret_hex(&body.private_key) {
        Ok(pubkey) => pubkey,
        Err(msg) => return HttpResponse::BadRequest().body(msg),
    };
    let bytes = match signing_bytes(&body.payload) {
        Ok(bytes) => bytes,
        Err(_) => return HttpResponse::BadRequest().body("payload is not serializable"),
    };
    match sign_digest_hex(&body.private_key, digest(&bytes)) {
        Ok(signature) => HttpResponse::Ok().json(SignResponse {
            pubkey,
            signature,
            payload: body.payload,
        }),
        Err(msg) => HttpResponse::BadRequest().body(msg),
    }
}

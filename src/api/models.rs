use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use primitive_types::U256;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::blockchain::{Block, Blockchain};
use crate::config::Settings;
use crate::mining::{AttemptData, BlockData, BurnContract, ContractError, LoggedEvent, WindowPhase};
use crate::token::{Reserve, TransmuteTarget};
use crate::wallet::{Address, digest, pubkey_to_address, verify_signature_hex};

/// Transmute targets hosted by the service, by address.
pub type TargetRegistry = HashMap<Address, Box<dyn TransmuteTarget + Send>>;

/// Shared application state. Locks are always taken in the order
/// `chain` -> `contract` -> `targets` -> `nonces`.
pub struct AppState {
    pub chain: Mutex<Blockchain>,
    pub contract: Mutex<BurnContract>,
    pub targets: Mutex<TargetRegistry>,
    pub nonces: Mutex<HashMap<Address, u64>>,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        let chain = Blockchain::new();
        let contract = BurnContract::deploy(settings.contract.clone(), &chain);
        let mut targets: TargetRegistry = HashMap::new();
        targets.insert(
            settings.reserve.address.clone(),
            Box::new(Reserve::new(settings.reserve.rate)),
        );
        Self {
            chain: Mutex::new(chain),
            contract: Mutex::new(contract),
            targets: Mutex::new(targets),
            nonces: Mutex::new(HashMap::new()),
        }
    }
}

/* ---------- Signed requests ---------- */

/// State-changing request: `signature` is hex DER ECDSA by `pubkey` over
/// `sha256(signing_bytes(payload))`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Signed<T> {
    pub pubkey: String,
    pub signature: String,
    pub payload: T,
}

/// Compact JSON with object keys sorted, so clients need not match field order.
pub fn signing_bytes<T: Serialize>(payload: &T) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&serde_json::to_value(payload)?)
}

impl Signed<serde_json::Value> {
    /// Verify the envelope over the payload exactly as received, then decode
    /// it. Returns the signer's address and the typed payload.
    pub fn open<T: DeserializeOwned>(self) -> Result<(Address, T), HttpResponse> {
        let body = signing_bytes(&self.payload)
            .map_err(|_| HttpResponse::BadRequest().body("payload is not serializable"))?;
        let valid = verify_signature_hex(&self.pubkey, &self.signature, digest(&body))
            .map_err(|msg| HttpResponse::BadRequest().body(msg))?;
        if !valid {
            return Err(HttpResponse::Forbidden().body("invalid signature"));
        }
        let signer =
            pubkey_to_address(&self.pubkey).map_err(|msg| HttpResponse::BadRequest().body(msg))?;
        let payload = serde_json::from_value(self.payload)
            .map_err(|e| HttpResponse::BadRequest().body(format!("invalid payload: {e}")))?;
        Ok((signer, payload))
    }
}

/* ---------- Error mapping ---------- */

#[derive(Serialize)]
pub struct ErrorResponse {
    pub kind: &'static str,
    pub error: String,
}

pub fn status_of(err: &ContractError) -> StatusCode {
    match err {
        ContractError::NoSuchWindow(_) | ContractError::NoSuchAttempt { .. } => {
            StatusCode::NOT_FOUND
        }
        ContractError::Unauthorized { .. } | ContractError::NotWinner { .. } => {
            StatusCode::FORBIDDEN
        }
        ContractError::DuplicateAttempt { .. }
        | ContractError::AlreadyClaimed(_)
        | ContractError::StaleWindow { .. } => StatusCode::CONFLICT,
        ContractError::RedemptionExpired { .. } => StatusCode::GONE,
        // 425 Too Early
        ContractError::NotMatured { .. } => {
            StatusCode::from_u16(425).unwrap_or(StatusCode::BAD_REQUEST)
        }
        _ => StatusCode::BAD_REQUEST,
    }
}

pub fn contract_error(err: ContractError) -> HttpResponse {
    HttpResponse::build(status_of(&err)).json(ErrorResponse {
        kind: err.kind(),
        error: err.to_string(),
    })
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct HeadResponse<'a> {
    pub height: u64,
    pub length: usize,
    pub head: &'a Block,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
}

#[derive(Deserialize)]
pub struct AdvanceRequest {
    pub blocks: u64,
}

#[derive(Serialize)]
pub struct AdvanceResponse {
    pub height: u64,
    pub window: u64,
}

/* ---------- Mining API Models ---------- */

#[derive(Debug, Serialize, Deserialize)]
pub struct MinePayload {
    pub window: u64,
    pub value: U256,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimPayload {
    pub window: u64,
    /// Beneficiary; the signer when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_to: Option<Address>,
}

#[derive(Serialize)]
pub struct WinningResponse {
    pub window: u64,
    pub address: Address,
    pub winning: bool,
}

#[derive(Serialize)]
pub struct BlockResponse {
    #[serde(flatten)]
    pub data: BlockData,
    /// `None` for windows the host chain has not reached.
    pub phase: Option<WindowPhase>,
}

#[derive(Serialize)]
pub struct AttemptResponse {
    pub window: u64,
    pub address: Address,
    #[serde(flatten)]
    pub attempt: AttemptData,
    /// Settled `[start, end)` keyspace slice.
    pub slice: Option<(U256, U256)>,
}

/* ---------- Token API Models ---------- */

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferPayload {
    pub to: Address,
    pub amount: u64,
    pub nonce: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransmutePayload {
    pub target: Address,
    pub amount: u64,
    pub nonce: u64,
}

#[derive(Serialize)]
pub struct TransferResponse {
    pub from: Address,
    pub to: Address,
    pub amount: u64,
    pub balance: u64,
}

#[derive(Serialize)]
pub struct TransmuteResponse {
    pub target: Address,
    pub source_quantity: u64,
    pub dest_quantity: u64,
    pub balance: u64,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub address: Address,
    pub balance: u64,
    pub formatted: String,
    pub nonce: u64,
}

/* ---------- Event API Models ---------- */

#[derive(Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub from: u64,
}

#[derive(Serialize)]
pub struct EventsResponse<'a> {
    pub total: usize,
    pub events: &'a [LoggedEvent],
}

/* ---------- Replay protection ---------- */

/// Reject `nonce` unless it is `address`'s next expected value.
pub fn expect_nonce(
    nonces: &HashMap<Address, u64>,
    address: &Address,
    nonce: u64,
) -> Result<(), HttpResponse> {
    let expected = nonces.get(address).copied().unwrap_or(0);
    if nonce != expected {
        return Err(HttpResponse::Conflict().json(ErrorResponse {
            kind: "stale_nonce",
            error: format!("nonce {nonce} does not match expected {expected}"),
        }));
    }
    Ok(())
}

pub fn bump_nonce(nonces: &mut HashMap<Address, u64>, address: &Address) {
    *nonces.entry(address.clone()).or_insert(0) += 1;
}

use primitive_types::U256;
use thiserror::Error;

use crate::wallet::Address;

/// Every way a contract call can abort. A returned error means the call had
/// no effect on contract state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("attempt of {value} wei is below the mining minimum of {minimum} wei")]
    InsufficientValue { value: U256, minimum: U256 },

    #[error("attempt of {value} wei exceeds the mining maximum of {maximum} wei")]
    ExcessiveValue { value: U256, maximum: U256 },

    #[error("window {requested} is not the current mining window ({current})")]
    StaleWindow { requested: u64, current: u64 },

    #[error("{address} already attempted window {window}")]
    DuplicateAttempt { window: u64, address: Address },

    #[error("mining is closed: maximum supply reached")]
    SupplyExhausted,

    #[error("window {0} has no mining attempts")]
    NoSuchWindow(u64),

    #[error("window {window} matures at external block {maturity}")]
    NotMatured { window: u64, maturity: u64 },

    #[error("window {window} could only be redeemed until external block {deadline}")]
    RedemptionExpired { window: u64, deadline: u64 },

    #[error("{address} did not win window {window}")]
    NotWinner { window: u64, address: Address },

    #[error("{address} has no attempt in window {window}")]
    NoSuchAttempt { window: u64, address: Address },

    #[error("window {0} was already claimed")]
    AlreadyClaimed(u64),

    #[error("{address} did not mine window {window} and cannot claim it")]
    Unauthorized { window: u64, address: Address },

    #[error("hash of external block {0} is not available")]
    DrawUnavailable(u64),

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("effective difficulty is zero")]
    DivideByZero,

    #[error("proportional reward needs total {total} >= target {target} > 0")]
    InvalidProportion { target: U256, total: U256 },

    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("{0} does not support the transmutable interface")]
    UnsupportedCapability(Address),

    #[error("transmute rejected by {target}: {reason}")]
    TransmuteRejected { target: Address, reason: String },
}

impl ContractError {
    /// Stable machine-readable identifier.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientValue { .. } => "insufficient_value",
            Self::ExcessiveValue { .. } => "excessive_value",
            Self::StaleWindow { .. } => "stale_window",
            Self::DuplicateAttempt { .. } => "duplicate_attempt",
            Self::SupplyExhausted => "supply_exhausted",
            Self::NoSuchWindow(_) => "no_such_window",
            Self::NotMatured { .. } => "not_matured",
            Self::RedemptionExpired { .. } => "redemption_expired",
            Self::NotWinner { .. } => "not_winner",
            Self::NoSuchAttempt { .. } => "no_such_attempt",
            Self::AlreadyClaimed(_) => "already_claimed",
            Self::Unauthorized { .. } => "unauthorized",
            Self::DrawUnavailable(_) => "draw_unavailable",
            Self::ArithmeticOverflow => "arithmetic_overflow",
            Self::DivideByZero => "divide_by_zero",
            Self::InvalidProportion { .. } => "invalid_proportion",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::ZeroAmount => "zero_amount",
            Self::UnsupportedCapability(_) => "unsupported_capability",
            Self::TransmuteRejected { .. } => "transmute_rejected",
        }
    }
}

pub type ContractResult<T> = Result<T, ContractError>;

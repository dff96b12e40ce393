pub mod contract;
pub mod error;
pub mod events;
pub mod keyspace;
pub mod retarget;
pub mod reward;
pub mod state;
pub mod window;

pub use contract::BurnContract;
pub use error::{ContractError, ContractResult};
pub use events::{ContractEvent, LoggedEvent};
pub use state::{AttemptData, AttemptReceipt, BlockData, ClaimReceipt, ContractState, WindowPhase};

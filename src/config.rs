//! Runtime configuration loaded from the environment (and `.env` via dotenvy).

use primitive_types::U256;
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::wallet::Address;

/// One szabo in wei.
pub const SZABO: u64 = 1_000_000_000_000;

/// One ether in wei.
pub const ETHER: u64 = 1_000_000_000_000_000_000;

/// Token base units per whole token (8 decimal places).
pub const TOKEN_UNIT: u64 = 100_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },

    #[error("MAXIMUM_MINING_WEI must not be below MINIMUM_MINING_WEI")]
    MiningBounds,
}

/// Contract parameters. Defaults mirror the reference deployment.
#[derive(Debug, Clone)]
pub struct ContractConfig {
    pub block_creation_rate: u64,
    pub difficulty_adjustment_period: u64,
    pub reward_adjustment_period: u64,
    pub minimum_difficulty_wei: U256,
    pub difficulty_scale_limit: u64,
    pub initial_reward: u64,
    pub maximum_supply: u64,
    pub minimum_mining_wei: U256,
    pub maximum_mining_wei: U256,
    /// Blocks after maturity during which the draw can still be reconstructed.
    pub redemption_lookback: u64,
    pub contract_address: Address,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            block_creation_rate: 50,
            difficulty_adjustment_period: 2016,
            reward_adjustment_period: 210_000,
            minimum_difficulty_wei: U256::from(100 * SZABO),
            difficulty_scale_limit: 4,
            initial_reward: 100 * TOKEN_UNIT,
            maximum_supply: 21_000_000 * TOKEN_UNIT,
            minimum_mining_wei: U256::from(SZABO),
            maximum_mining_wei: U256::from(ETHER) * U256::from(1_000_000u64),
            redemption_lookback: 255,
            contract_address: Address::from("0xb0a7b0a7b0a7b0a7b0a7b0a7b0a7b0a7b0a7b0a7"),
        }
    }
}

/// Cooperating transmute target hosted by the service.
#[derive(Debug, Clone)]
pub struct ReserveConfig {
    pub address: Address,
    /// Destination units credited per source unit.
    pub rate: u64,
}

impl Default for ReserveConfig {
    fn default() -> Self {
        Self {
            address: Address::from("0x5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e"),
            rate: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub contract: ContractConfig,
    pub reserve: ReserveConfig,
}

impl Settings {
    /// Read settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup; unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ContractConfig::default();
        let reserve_defaults = ReserveConfig::default();

        let contract = ContractConfig {
            block_creation_rate: parse_or(&lookup, "BLOCK_CREATION_RATE", defaults.block_creation_rate)?,
            difficulty_adjustment_period: parse_or(
                &lookup,
                "DIFFICULTY_ADJUSTMENT_PERIOD",
                defaults.difficulty_adjustment_period,
            )?,
            reward_adjustment_period: parse_or(
                &lookup,
                "REWARD_ADJUSTMENT_PERIOD",
                defaults.reward_adjustment_period,
            )?,
            minimum_difficulty_wei: parse_wei_or(
                &lookup,
                "MINIMUM_DIFFICULTY_WEI",
                defaults.minimum_difficulty_wei,
            )?,
            difficulty_scale_limit: parse_or(
                &lookup,
                "DIFFICULTY_SCALE_LIMIT",
                defaults.difficulty_scale_limit,
            )?,
            initial_reward: parse_or(&lookup, "INITIAL_REWARD", defaults.initial_reward)?,
            maximum_supply: parse_or(&lookup, "MAXIMUM_SUPPLY", defaults.maximum_supply)?,
            minimum_mining_wei: parse_wei_or(&lookup, "MINIMUM_MINING_WEI", defaults.minimum_mining_wei)?,
            maximum_mining_wei: parse_wei_or(&lookup, "MAXIMUM_MINING_WEI", defaults.maximum_mining_wei)?,
            redemption_lookback: parse_or(&lookup, "REDEMPTION_LOOKBACK", defaults.redemption_lookback)?,
            contract_address: lookup("CONTRACT_ADDRESS")
                .map(Address::new)
                .unwrap_or(defaults.contract_address),
        };
        contract.validate()?;

        let reserve = ReserveConfig {
            address: lookup("RESERVE_ADDRESS")
                .map(Address::new)
                .unwrap_or(reserve_defaults.address),
            rate: parse_or(&lookup, "RESERVE_RATE", reserve_defaults.rate)?,
        };
        if reserve.rate == 0 {
            return Err(ConfigError::Zero { key: "RESERVE_RATE" });
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            contract,
            reserve,
        })
    }
}

impl ContractConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("BLOCK_CREATION_RATE", self.block_creation_rate),
            ("DIFFICULTY_ADJUSTMENT_PERIOD", self.difficulty_adjustment_period),
            ("REWARD_ADJUSTMENT_PERIOD", self.reward_adjustment_period),
            ("DIFFICULTY_SCALE_LIMIT", self.difficulty_scale_limit),
        ];
        for (key, value) in non_zero {
            if value == 0 {
                return Err(ConfigError::Zero { key });
            }
        }
        if self.minimum_difficulty_wei.is_zero() {
            return Err(ConfigError::Zero {
                key: "MINIMUM_DIFFICULTY_WEI",
            });
        }
        if self.maximum_mining_wei < self.minimum_mining_wei {
            return Err(ConfigError::MiningBounds);
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

/// Wei amounts accept decimal or `0x`-prefixed hex.
fn parse_wei_or<F>(lookup: &F, key: &'static str, default: U256) -> Result<U256, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let trimmed = raw.trim();
    let parsed = match trimmed.strip_prefix("0x") {
        Some(hex_digits) => U256::from_str_radix(hex_digits, 16).ok(),
        None => U256::from_dec_str(trimmed).ok(),
    };
    parsed.ok_or(ConfigError::Invalid { key, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_match_reference_deployment() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.port, 8080);
        assert_eq!(s.contract.block_creation_rate, 50);
        assert_eq!(s.contract.difficulty_adjustment_period, 2016);
        assert_eq!(s.contract.reward_adjustment_period, 210_000);
        assert_eq!(s.contract.difficulty_scale_limit, 4);
        assert_eq!(s.contract.initial_reward, 100 * TOKEN_UNIT);
        assert_eq!(s.contract.maximum_supply, 21_000_000 * TOKEN_UNIT);
        assert_eq!(s.contract.minimum_difficulty_wei, U256::from(100 * SZABO));
        assert_eq!(s.contract.redemption_lookback, 255);
    }

    #[test]
    fn overrides_are_parsed() {
        let s = settings(&[
            ("PORT", "9000"),
            ("BLOCK_CREATION_RATE", "10"),
            ("MINIMUM_DIFFICULTY_WEI", "0x64"),
            ("MAXIMUM_MINING_WEI", "1000000"),
            ("MINIMUM_MINING_WEI", "1"),
        ])
        .unwrap();
        assert_eq!(s.port, 9000);
        assert_eq!(s.contract.block_creation_rate, 10);
        assert_eq!(s.contract.minimum_difficulty_wei, U256::from(100));
        assert_eq!(s.contract.maximum_mining_wei, U256::from(1_000_000));
    }

    #[test]
    fn rejects_zero_rate_and_garbage() {
        assert_eq!(
            settings(&[("BLOCK_CREATION_RATE", "0")]).unwrap_err(),
            ConfigError::Zero {
                key: "BLOCK_CREATION_RATE"
            }
        );
        assert!(matches!(
            settings(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
        assert!(matches!(
            settings(&[("MINIMUM_DIFFICULTY_WEI", "0")]),
            Err(ConfigError::Zero { .. })
        ));
    }

    #[test]
    fn rejects_inverted_mining_bounds() {
        assert_eq!(
            settings(&[("MINIMUM_MINING_WEI", "10"), ("MAXIMUM_MINING_WEI", "5")]).unwrap_err(),
            ConfigError::MiningBounds
        );
    }
}

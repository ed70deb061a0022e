//! Stock configuration.
//!
//! Defaults match the reference fleet (threshold 3, new machines stocked with
//! 10). Each value can be overridden through the environment:
//!
//! - `VENDNET_STOCK_THRESHOLD`
//! - `VENDNET_INITIAL_STOCK`
//! - `VENDNET_MISSING_MACHINE` (`reject` | `ignore`)

use core::str::FromStr;

use vendnet_core::{DomainError, DomainResult};

pub const THRESHOLD_VAR: &str = "VENDNET_STOCK_THRESHOLD";
pub const INITIAL_STOCK_VAR: &str = "VENDNET_INITIAL_STOCK";
pub const MISSING_MACHINE_VAR: &str = "VENDNET_MISSING_MACHINE";

pub const DEFAULT_THRESHOLD: u32 = 3;
pub const DEFAULT_INITIAL_STOCK: u32 = 10;

/// What a sale or refill does when its machine is not in the repository.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum MissingMachinePolicy {
    /// Fail the handler with `DomainError::NotFound`, aborting the publish.
    #[default]
    Reject,
    /// Log a warning and leave everything unchanged.
    Ignore,
}

impl FromStr for MissingMachinePolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "ignore" => Ok(Self::Ignore),
            other => Err(DomainError::validation(format!(
                "{MISSING_MACHINE_VAR}: expected `reject` or `ignore`, got `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockConfig {
    /// Stock strictly below this level is "low".
    pub threshold: u32,
    /// Stock assigned to a newly provisioned machine.
    pub initial_stock: u32,
    pub missing_machine: MissingMachinePolicy,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            initial_stock: DEFAULT_INITIAL_STOCK,
            missing_machine: MissingMachinePolicy::default(),
        }
    }
}

impl StockConfig {
    /// Defaults, overridden by any `VENDNET_*` variables that are set.
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`StockConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DomainResult<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup(THRESHOLD_VAR) {
            config.threshold = parse_level(THRESHOLD_VAR, &raw)?;
        }
        if let Some(raw) = lookup(INITIAL_STOCK_VAR) {
            config.initial_stock = parse_level(INITIAL_STOCK_VAR, &raw)?;
        }
        if let Some(raw) = lookup(MISSING_MACHINE_VAR) {
            config.missing_machine = raw.parse()?;
        }
        Ok(config)
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_initial_stock(mut self, initial_stock: u32) -> Self {
        self.initial_stock = initial_stock;
        self
    }

    pub fn with_missing_machine(mut self, policy: MissingMachinePolicy) -> Self {
        self.missing_machine = policy;
        self
    }
}

fn parse_level(var: &str, raw: &str) -> DomainResult<u32> {
    raw.trim()
        .parse()
        .map_err(|e| DomainError::validation(format!("{var}: `{raw}` is not a stock level ({e})")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = StockConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StockConfig::default());
        assert_eq!(config.threshold, 3);
        assert_eq!(config.initial_stock, 10);
        assert_eq!(config.missing_machine, MissingMachinePolicy::Reject);
    }

    #[test]
    fn overrides_are_applied() {
        let config = StockConfig::from_lookup(lookup(&[
            (THRESHOLD_VAR, "5"),
            (INITIAL_STOCK_VAR, " 20 "),
            (MISSING_MACHINE_VAR, "Ignore"),
        ]))
        .unwrap();

        assert_eq!(
            config,
            StockConfig::default()
                .with_threshold(5)
                .with_initial_stock(20)
                .with_missing_machine(MissingMachinePolicy::Ignore)
        );
    }

    #[test]
    fn malformed_values_are_validation_errors() {
        let err = StockConfig::from_lookup(lookup(&[(THRESHOLD_VAR, "-1")])).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = StockConfig::from_lookup(lookup(&[(MISSING_MACHINE_VAR, "shrug")])).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}

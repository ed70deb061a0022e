//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a vending machine.
///
/// Machine ids are opaque operator-assigned strings (e.g. `"001"`). They are
/// immutable once assigned; cloning is the only way to share one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineId(String);

impl MachineId {
    /// Create an identifier, rejecting blank input.
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::invalid_id("MachineId: cannot be blank"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for MachineId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MachineId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_operator_assigned_ids() {
        let id: MachineId = "001".parse().unwrap();
        assert_eq!(id.as_str(), "001");
        assert_eq!(id.to_string(), "001");
    }

    #[test]
    fn rejects_blank_ids() {
        assert!(matches!(MachineId::new("   "), Err(DomainError::InvalidId(_))));
        assert!("".parse::<MachineId>().is_err());
    }
}

use serde::{Deserialize, Serialize};

use crate::allocation::DEFAULT_EXCESS_LABEL;
use crate::errors::{LedgerError, Result};
use crate::timeline::DEFAULT_MAX_PERIODS;

/// ledger configuration
///
/// Allocation priority is deliberately absent: periods oldest first, then
/// one-off items, then excess, always.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// upper bound on generated billing periods per student
    pub max_periods: usize,
    /// description of the surplus line on a payment breakdown
    pub excess_credit_label: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl LedgerConfig {
    /// standard configuration: 500 period cap, "Excess / Advance Credit"
    pub fn standard() -> Self {
        Self {
            max_periods: DEFAULT_MAX_PERIODS,
            excess_credit_label: DEFAULT_EXCESS_LABEL.to_string(),
        }
    }

    /// parse and validate a JSON document, missing keys take standard values
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LedgerConfig =
            serde_json::from_str(json).map_err(|e| LedgerError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_periods == 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: "max_periods must be at least 1".to_string(),
            });
        }
        if self.excess_credit_label.trim().is_empty() {
            return Err(LedgerError::InvalidConfiguration {
                message: "excess_credit_label must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

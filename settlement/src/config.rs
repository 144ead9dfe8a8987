//! Configuration for the settlement engine

use crate::{money::ChipRate, money::MoneyScale, poker::PokerConfig, solver::SolverConfig};
use serde::{Deserialize, Serialize};

/// Settlement engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Solver limits
    pub solver: SolverConfig,

    /// Poker table settlement
    pub poker: PokerConfig,

    /// Food expense settlement
    pub food: FoodConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "bonanza-settlement".to_string(),
            solver: SolverConfig::default(),
            poker: PokerConfig::default(),
            food: FoodConfig::default(),
        }
    }
}

/// Food expense configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodConfig {
    /// Currency scale used for expense amounts
    pub scale: MoneyScale,
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(max) = std::env::var("SETTLEMENT_MAX_PARTICIPANTS") {
            config.solver.max_participants = parse_var("SETTLEMENT_MAX_PARTICIPANTS", &max)?;
        }

        if let Ok(budget) = std::env::var("SETTLEMENT_NODE_BUDGET") {
            config.solver.node_budget = match budget.as_str() {
                "" | "none" | "unbounded" => None,
                value => Some(parse_var("SETTLEMENT_NODE_BUDGET", value)?),
            };
        }

        if let Ok(chips) = std::env::var("SETTLEMENT_CHIPS_PER_BUY_IN") {
            config.poker.chips_per_buy_in = parse_var("SETTLEMENT_CHIPS_PER_BUY_IN", &chips)?;
        }

        if let Ok(rate) = std::env::var("SETTLEMENT_CHIPS_PER_CURRENCY_UNIT") {
            config.poker.chip_rate =
                ChipRate::new(parse_var("SETTLEMENT_CHIPS_PER_CURRENCY_UNIT", &rate)?)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency
    pub fn validate(&self) -> crate::Result<()> {
        if self.solver.max_participants < 2 {
            return Err(crate::Error::Config(
                "solver.max_participants must be at least 2".to_string(),
            ));
        }

        if self.solver.node_budget == Some(0) {
            return Err(crate::Error::Config(
                "solver.node_budget must be positive".to_string(),
            ));
        }

        if self.poker.chips_per_buy_in <= 0 {
            return Err(crate::Error::Config(
                "poker.chips_per_buy_in must be positive".to_string(),
            ));
        }

        if self.poker.chip_rate.chips_per_currency_unit == 0 {
            return Err(crate::Error::Config(
                "poker.chip_rate.chips_per_currency_unit must be positive".to_string(),
            ));
        }

        if self.poker.leftover.denomination <= 0 {
            return Err(crate::Error::Config(
                "poker.leftover.denomination must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> crate::Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| crate::Error::Config(format!("Invalid value for {}: {:?}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
service_name = "table-7"

[solver]
max_participants = 12
node_budget = 1000

[poker]
chips_per_buy_in = 50

[poker.chip_rate]
chips_per_currency_unit = 2

[poker.leftover]
denomination = 25
min_contribution = 5
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.service_name, "table-7");
        assert_eq!(config.solver.max_participants, 12);
        assert_eq!(config.solver.node_budget, Some(1000));
        assert_eq!(config.poker.chips_per_buy_in, 50);
        assert_eq!(config.poker.chip_rate.chips_per_currency_unit, 2);
        assert_eq!(config.poker.leftover.denomination, 25);
        assert_eq!(config.food, FoodConfig::default());
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[poker]\nchips_per_buy_in = 0").unwrap();

        assert!(matches!(
            Config::from_file(file.path()),
            Err(crate::Error::Config(_))
        ));
    }

    #[test]
    fn test_from_file_rejects_oversized_scale() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[food.scale]\nminor_units = 40").unwrap();

        assert!(matches!(
            Config::from_file(file.path()),
            Err(crate::Error::Config(_))
        ));
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(parse_var::<usize>("X", " 15 ").unwrap(), 15);
        assert!(parse_var::<usize>("X", "many").is_err());
    }
}

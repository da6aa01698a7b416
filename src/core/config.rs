//! Match configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Match configuration parameters.
///
/// Missing fields fall back to `Default`, so a partial JSON/TOML config
/// deserializes cleanly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Seed for every random choice in the match.
    /// Same seed produces the same computer placement and search order.
    pub seed: u64,

    /// Delay before the scripted opponent answers a human miss (ms).
    pub opponent_delay_ms: u64,

    /// Delay between consecutive scripted moves after a hit (ms).
    pub opponent_chain_delay_ms: u64,

    /// Display name of the scripted opponent.
    pub computer_name: String,

    /// Default names for sides A and B when none are entered.
    pub default_names: [String; 2],
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            opponent_delay_ms: 900,
            opponent_chain_delay_ms: 700,
            computer_name: "Computer".to_string(),
            default_names: ["Player 1".to_string(), "Player 2".to_string()],
        }
    }
}

impl MatchConfig {
    /// Create a new config with custom seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Create a new config with custom opponent delays.
    #[must_use]
    pub fn with_delays(mut self, first: Duration, chained: Duration) -> Self {
        self.opponent_delay_ms = first.as_millis() as u64;
        self.opponent_chain_delay_ms = chained.as_millis() as u64;
        self
    }

    /// Create a new config with a custom computer name.
    #[must_use]
    pub fn with_computer_name(mut self, name: impl Into<String>) -> Self {
        self.computer_name = name.into();
        self
    }

    #[must_use]
    pub fn opponent_delay(&self) -> Duration {
        Duration::from_millis(self.opponent_delay_ms)
    }

    #[must_use]
    pub fn opponent_chain_delay(&self) -> Duration {
        Duration::from_millis(self.opponent_chain_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MatchConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.opponent_delay(), Duration::from_millis(900));
        assert_eq!(config.computer_name, "Computer");
    }

    #[test]
    fn test_builder_pattern() {
        let config = MatchConfig::default()
            .with_seed(7)
            .with_delays(Duration::from_millis(10), Duration::from_millis(5))
            .with_computer_name("Bot");

        assert_eq!(config.seed, 7);
        assert_eq!(config.opponent_delay_ms, 10);
        assert_eq!(config.opponent_chain_delay(), Duration::from_millis(5));
        assert_eq!(config.computer_name, "Bot");
    }

    #[test]
    fn test_partial_deserialization() {
        let config: MatchConfig = serde_json::from_str(r#"{"seed": 5}"#).unwrap();
        assert_eq!(config.seed, 5);
        assert_eq!(config.opponent_chain_delay_ms, 700);
    }
}

//! Session Configuration
//!
//! Fixed when a session is built; nothing here is reread at runtime.
//! Values come from the environment (optionally via a `.env` file loaded by
//! the binary) and fall back to the defaults for anything missing or
//! unparsable.

use std::env;
use std::time::Duration;

use crate::{MATCH_DURATION_TICKS, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Default tick period (~60 Hz).
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_micros(16_700);

/// Everything a session needs to know before it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Map width.
    pub screen_width: i32,
    /// Map height.
    pub screen_height: i32,
    /// Wall-clock time between ticks.
    pub tick_interval: Duration,
    /// Ticks before the match ends.
    pub match_duration_ticks: u32,
    /// Fixed seed; derived from the session id when absent.
    pub seed: Option<u64>,
    /// Restrict the roster to these strategy names.
    pub strategies: Option<Vec<String>>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            tick_interval: DEFAULT_TICK_INTERVAL,
            match_duration_ticks: MATCH_DURATION_TICKS,
            seed: None,
            strategies: None,
        }
    }
}

impl SessionConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create config from any key → value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|value| value.trim().parse::<u64>().ok());

        let positive_i32 = |key: &str, fallback: i32| {
            parsed(key)
                .and_then(|value| i32::try_from(value).ok())
                .filter(|value| *value > 0)
                .unwrap_or(fallback)
        };

        let tick_interval = parsed("ARENA_TICK_INTERVAL_MS")
            .filter(|millis| *millis > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.tick_interval);

        let match_duration_ticks = parsed("ARENA_MATCH_TICKS")
            .and_then(|ticks| u32::try_from(ticks).ok())
            .filter(|ticks| *ticks > 0)
            .unwrap_or(defaults.match_duration_ticks);

        let strategies = lookup("ARENA_STRATEGIES").and_then(|value| {
            let names: Vec<String> = value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect();
            (!names.is_empty()).then_some(names)
        });

        Self {
            screen_width: positive_i32("ARENA_SCREEN_WIDTH", defaults.screen_width),
            screen_height: positive_i32("ARENA_SCREEN_HEIGHT", defaults.screen_height),
            tick_interval,
            match_duration_ticks,
            seed: parsed("ARENA_SEED"),
            strategies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: BTreeMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SessionConfig::from_lookup(lookup(&[]));
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.screen_width, 500);
        assert_eq!(config.screen_height, 400);
        assert_eq!(config.match_duration_ticks, 18_000);
        assert_eq!(config.tick_interval, Duration::from_micros(16_700));
    }

    #[test]
    fn test_reads_every_key() {
        let config = SessionConfig::from_lookup(lookup(&[
            ("ARENA_SCREEN_WIDTH", "640"),
            ("ARENA_SCREEN_HEIGHT", "480"),
            ("ARENA_TICK_INTERVAL_MS", "5"),
            ("ARENA_MATCH_TICKS", "600"),
            ("ARENA_SEED", "42"),
            ("ARENA_STRATEGIES", "hunter, drifter,,"),
        ]));

        assert_eq!(config.screen_width, 640);
        assert_eq!(config.screen_height, 480);
        assert_eq!(config.tick_interval, Duration::from_millis(5));
        assert_eq!(config.match_duration_ticks, 600);
        assert_eq!(config.seed, Some(42));
        assert_eq!(
            config.strategies,
            Some(vec!["hunter".to_owned(), "drifter".to_owned()])
        );
    }

    #[test]
    fn test_garbage_falls_back() {
        let config = SessionConfig::from_lookup(lookup(&[
            ("ARENA_SCREEN_WIDTH", "wide"),
            ("ARENA_SCREEN_HEIGHT", "0"),
            ("ARENA_TICK_INTERVAL_MS", "-3"),
            ("ARENA_SEED", "nope"),
            ("ARENA_STRATEGIES", " , "),
        ]));

        assert_eq!(config, SessionConfig::default());
    }
}

//! Runtime configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

const DEFAULT_CATEGORIES: &[&str] = &[
    "Name",
    "Color",
    "Food",
    "Restaurant",
    "Country",
    "Famous Person",
    "Movie",
];

#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Port the HTTP/WebSocket server listens on
    pub port: u16,
    /// The game ends after this many rounds have been scored
    pub max_rounds: u32,
    /// Length of the basta countdown in ticks
    pub countdown_seconds: u32,
    /// Interval between countdown ticks
    pub countdown_tick: Duration,
    /// Pause between countdown 0 and the reveal, so forced submissions can land
    pub reveal_grace: Duration,
    /// Delay before the first round and between rounds
    pub round_delay: Duration,
    /// How long an offline player is kept before being purged
    pub offline_purge: Duration,
    /// Categories the session starts with
    pub categories: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            max_rounds: 5,
            countdown_seconds: 10,
            countdown_tick: Duration::from_secs(1),
            reveal_grace: Duration::from_millis(500),
            round_delay: Duration::from_secs(2),
            offline_purge: Duration::from_secs(30),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl GameConfig {
    /// Load config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_rounds = match parse_var("BASTA_MAX_ROUNDS", defaults.max_rounds) {
            0 => {
                tracing::warn!("BASTA_MAX_ROUNDS must be at least 1, using 1");
                1
            }
            n => n,
        };

        let categories = std::env::var("BASTA_CATEGORIES")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.categories);

        let config = Self {
            port: parse_var("PORT", defaults.port),
            max_rounds,
            countdown_seconds: parse_var("BASTA_COUNTDOWN_SECONDS", defaults.countdown_seconds),
            countdown_tick: parse_millis("BASTA_COUNTDOWN_TICK_MS", defaults.countdown_tick),
            reveal_grace: parse_millis("BASTA_REVEAL_GRACE_MS", defaults.reveal_grace),
            round_delay: parse_millis("BASTA_ROUND_DELAY_MS", defaults.round_delay),
            offline_purge: Duration::from_secs(parse_var(
                "BASTA_OFFLINE_PURGE_SECONDS",
                defaults.offline_purge.as_secs(),
            )),
            categories,
        };

        tracing::info!(
            "Game config: {} rounds, {}s countdown, {} categories",
            config.max_rounds,
            config.countdown_seconds,
            config.categories.len()
        );

        config
    }
}

/// Read and parse an env var, warning and falling back on garbage
fn parse_var<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Invalid value {:?} for {}, using {}", raw, name, default);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_millis(name: &str, default: Duration) -> Duration {
    Duration::from_millis(parse_var(name, default.as_millis() as u64))
}

//! Environment configuration shared by the binaries.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `WCST_SCHEDULE` | `standard` |
//! | `WCST_TRIALS_PER_RULE` | 10 |
//! | `WCST_TRANSITION_TRIALS` | 3 |
//! | `WCST_MAX_COUNTED_TRIALS` | 60 |
//! | `WCST_STREAK_TO_ADVANCE` | 3 |
//! | `WCST_SEED` | unset (OS entropy) |
//! | `WCST_PORT` | 9000 |
//! | `WCST_MAX_SESSIONS` | 1024 |
//! | `RAYON_NUM_THREADS` | 8 |

use crate::constants::{DEFAULT_MAX_SESSIONS, DEFAULT_PORT};
use crate::error::ConfigError;
use crate::types::{ExperimentConfig, RuleSchedule};

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Build an [`ExperimentConfig`] from `WCST_*` variables over the defaults.
///
/// Unparseable numbers fall back to the default; an unknown schedule name or
/// an invalid combination is an error.
pub fn experiment_config() -> Result<ExperimentConfig, ConfigError> {
    let mut cfg = ExperimentConfig::default();
    if let Ok(name) = std::env::var("WCST_SCHEDULE") {
        cfg.schedule = name.parse::<RuleSchedule>()?;
    }
    if let Some(v) = env_parse("WCST_TRIALS_PER_RULE") {
        cfg.trials_per_rule = v;
    }
    if let Some(v) = env_parse("WCST_TRANSITION_TRIALS") {
        cfg.transition_trials = v;
    }
    if let Some(v) = env_parse("WCST_MAX_COUNTED_TRIALS") {
        cfg.max_counted_trials = v;
    }
    if let Some(v) = env_parse("WCST_STREAK_TO_ADVANCE") {
        cfg.streak_to_advance = v;
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Read `WCST_SEED`, if set.
pub fn seed() -> Option<u64> {
    env_parse("WCST_SEED")
}

/// Read `WCST_PORT` (default 9000).
pub fn server_port() -> u16 {
    env_parse("WCST_PORT").unwrap_or(DEFAULT_PORT)
}

/// Read `WCST_MAX_SESSIONS` (default 1024, at least 1).
pub fn max_sessions() -> usize {
    env_parse("WCST_MAX_SESSIONS")
        .unwrap_or(DEFAULT_MAX_SESSIONS)
        .max(1)
}

/// Read `RAYON_NUM_THREADS` (default 8) and build the global pool.
/// Tolerates an already-initialized pool. Returns thread count.
pub fn init_rayon_threads() -> usize {
    let num_threads = env_parse("RAYON_NUM_THREADS").unwrap_or(8);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .ok();
    num_threads
}

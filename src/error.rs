//! Error types for card generation, configuration and session handling.

use thiserror::Error;

/// An exact-match card construction that cannot be satisfied.
///
/// These are contract violations inside the generator. The enumerated rule
/// tables never produce them for valid stage configurations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("must_match and must_differ overlap on positions {0:?}")]
    Overlap(Vec<usize>),
    #[error("position {position} is not active (active positions {active:?})")]
    PositionNotActive { position: usize, active: Vec<usize> },
    #[error(
        "cannot achieve {n_match} matches with must_match={must_match:?}, \
         must_differ={must_differ:?}, free={free:?}"
    )]
    Infeasible {
        n_match: usize,
        must_match: Vec<usize>,
        must_differ: Vec<usize>,
        free: Vec<usize>,
    },
    #[error(
        "cannot build {n_match} matches without both rule features \
         {rule_features:?} on {active:?}"
    )]
    InfeasibleNotRule {
        n_match: usize,
        rule_features: Vec<usize>,
        active: Vec<usize>,
    },
    #[error("{rules} rules x {trials_per_rule} trials exceeds the trial buffer limit")]
    BufferTooLarge { rules: usize, trials_per_rule: usize },
}

/// Rejected experiment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("trials_per_rule must be at least 1")]
    NoTrialsPerRule,
    #[error("trials_per_rule ({value}) exceeds the maximum of {max}")]
    TooManyTrialsPerRule { value: usize, max: usize },
    #[error("transition_trials ({transition}) exceeds trials_per_rule ({per_rule})")]
    TooManyTransitionTrials { transition: usize, per_rule: usize },
    #[error("streak_to_advance must be at least 1")]
    ZeroStreak,
    #[error("max_counted_trials must be at least 1")]
    ZeroCountedTrials,
    #[error("max_counted_trials ({value}) exceeds the maximum of {max}")]
    TooManyCountedTrials { value: usize, max: usize },
    #[error("unknown rule schedule '{0}' (expected 'standard' or 'reduced')")]
    UnknownSchedule(String),
}

/// Errors raised while driving a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("selected index {index} is out of range (0..{options})")]
    SelectionOutOfRange { index: usize, options: usize },
    #[error("session is finished")]
    Finished,
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

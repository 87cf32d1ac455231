//! Session simulation: one participant per session, many sessions in parallel.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::SessionError;
use crate::session::{Session, SessionCounters};
use crate::types::ExperimentConfig;

use super::participant::{Participant, ParticipantKind};

/// Final counters of one simulated session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub counters: SessionCounters,
    /// True when the buffer ran out before the counted-trial limit.
    pub exhausted_buffer: bool,
}

/// Play one full session. The trial buffer is seeded from `rng`.
pub fn simulate_session(
    config: &ExperimentConfig,
    participant: &mut dyn Participant,
    rng: &mut SmallRng,
) -> Result<SessionSummary, SessionError> {
    let mut session = Session::new(config.clone(), Some(rng.random()))?;

    while let Some(trial) = session.current_trial() {
        let trial = trial.clone();
        let selected = participant.choose(&trial, rng);
        let outcome = session.submit(selected)?;
        participant.observe(&trial, selected, outcome.feedback, rng);
    }

    let counters = *session.counters();
    Ok(SessionSummary {
        counters,
        exhausted_buffer: counters.counted_trials < config.max_counted_trials,
    })
}

/// Simulate `num_sessions` sessions in parallel; session `i` uses seed `seed + i`.
pub fn simulate_batch(
    config: &ExperimentConfig,
    kind: ParticipantKind,
    num_sessions: usize,
    seed: u64,
) -> Result<Vec<SessionSummary>, SessionError> {
    (0..num_sessions)
        .into_par_iter()
        .map(|i| {
            let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(i as u64));
            let mut participant = kind.build();
            simulate_session(config, participant.as_mut(), &mut rng)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::participant::{Oracle, RandomResponder};
    use crate::types::RuleSchedule;

    #[test]
    fn test_oracle_finds_every_rule_it_reaches() {
        let cfg = ExperimentConfig::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let summary = simulate_session(&cfg, &mut Oracle, &mut rng).unwrap();
        let c = summary.counters;
        // 3 answers per rule, 19 rules = 57 < 60 counted trials.
        assert_eq!(c.counted_trials, 57);
        assert_eq!(c.rules_found, 19);
        assert_eq!(c.score, 38);
        assert_eq!(c.perseverative_errors + c.non_perseverative_errors, 0);
        assert!(summary.exhausted_buffer);
    }

    #[test]
    fn test_reduced_oracle() {
        let cfg = ExperimentConfig {
            schedule: RuleSchedule::Reduced,
            ..Default::default()
        };
        let mut rng = SmallRng::seed_from_u64(1);
        let summary = simulate_session(&cfg, &mut Oracle, &mut rng).unwrap();
        assert_eq!(summary.counters.rules_found, 6);
        assert_eq!(summary.counters.counted_trials, 18);
    }

    #[test]
    fn test_random_responder_hits_limit() {
        let cfg = ExperimentConfig::default();
        let mut rng = SmallRng::seed_from_u64(9);
        let summary = simulate_session(&cfg, &mut RandomResponder, &mut rng).unwrap();
        assert_eq!(summary.counters.counted_trials, 60);
        assert!(!summary.exhausted_buffer);
    }

    #[test]
    fn test_batch_deterministic() {
        let cfg = ExperimentConfig::default();
        let kind = ParticipantKind::HypothesisTester { stickiness: 0.3 };
        let a = simulate_batch(&cfg, kind, 16, 100).unwrap();
        let b = simulate_batch(&cfg, kind, 16, 100).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }
}

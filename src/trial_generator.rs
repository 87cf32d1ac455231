//! Trial assembly and full trial-buffer generation.
//!
//! Generation runs in two passes:
//!
//! 1. [`assign_feature_pairs`]: one feature pair per rule, drawn uniformly
//!    from the rule's stage pool and never equal to the previous rule's pair
//!    when that pair is in the pool.
//! 2. For each rule in order, `trials_per_rule` trials built by
//!    [`generate_trial`]. The first `transition_trials` trials of every rule
//!    but the first replace their last wrong card with a transition card.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::card_generator::generate_random_card;
use crate::constants::*;
use crate::error::GenerationError;
use crate::rule_specs::{build_correct_card, build_transition_card, build_wrong_cards, RuleSpec};
use crate::types::{Card, ExperimentConfig, FeaturePair, RuleSchedule, Trial};

/// Owns the random source for one trial buffer (and its regenerations).
pub struct TrialGenerator {
    rng: SmallRng,
}

impl TrialGenerator {
    /// Seeded generator, or one seeded from OS entropy when `seed` is `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_os_rng(),
        };
        Self { rng }
    }

    pub fn rng_mut(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    /// Full ordered buffer for `config`.
    pub fn generate(&mut self, config: &ExperimentConfig) -> Result<Vec<Trial>, GenerationError> {
        generate_trials_with_rng(
            &mut self.rng,
            config.schedule,
            config.trials_per_rule,
            config.transition_trials,
        )
    }
}

/// Full ordered trial buffer. Deterministic for a given `seed`.
pub fn generate_all_trials(
    schedule: RuleSchedule,
    trials_per_rule: usize,
    transition_trials: usize,
    seed: Option<u64>,
) -> Result<Vec<Trial>, GenerationError> {
    let mut generator = TrialGenerator::new(seed);
    generate_trials_with_rng(
        generator.rng_mut(),
        schedule,
        trials_per_rule,
        transition_trials,
    )
}

/// Core of [`generate_all_trials`] against a caller-owned RNG.
pub fn generate_trials_with_rng(
    rng: &mut impl Rng,
    schedule: RuleSchedule,
    trials_per_rule: usize,
    transition_trials: usize,
) -> Result<Vec<Trial>, GenerationError> {
    let rules = schedule.rules();
    let too_large = || GenerationError::BufferTooLarge {
        rules: rules.len(),
        trials_per_rule,
    };
    if trials_per_rule > MAX_TRIALS_PER_RULE {
        return Err(too_large());
    }
    let capacity = rules.len().checked_mul(trials_per_rule).ok_or_else(too_large)?;
    let pairs = assign_feature_pairs(rng, rules);

    let mut trials = Vec::with_capacity(capacity);
    for (i, spec) in rules.iter().enumerate() {
        let features = pairs[i];
        let previous = if i > 0 { Some(pairs[i - 1]) } else { None };
        for index_in_rule in 0..trials_per_rule {
            let transition = if index_in_rule < transition_trials {
                previous
            } else {
                None
            };
            trials.push(generate_trial(rng, spec, features, transition, index_in_rule)?);
        }
    }
    Ok(trials)
}

/// One feature pair per rule, in rule order.
pub fn assign_feature_pairs(rng: &mut impl Rng, rules: &[RuleSpec]) -> Vec<FeaturePair> {
    let mut assigned: Vec<FeaturePair> = Vec::with_capacity(rules.len());
    for spec in rules {
        let pool = spec.stage.feature_pairs();
        let candidates: Vec<FeaturePair> = match assigned.last() {
            Some(prev) if pool.contains(prev) => {
                pool.iter().copied().filter(|p| p != prev).collect()
            }
            _ => pool,
        };
        let pair = candidates[rng.random_range(0..candidates.len())];
        debug!(rule = spec.number, features = %pair, "assigned rule features");
        assigned.push(pair);
    }
    assigned
}

/// Build one trial for `spec`.
///
/// `transition_from` carries the previous rule's pair on transition trials;
/// the last wrong card is then replaced by a card matching that pair.
pub fn generate_trial(
    rng: &mut impl Rng,
    spec: &RuleSpec,
    features: FeaturePair,
    transition_from: Option<FeaturePair>,
    index_in_rule: usize,
) -> Result<Trial, GenerationError> {
    let active = spec.stage.active_positions();

    let main = generate_random_card(rng, active);
    let correct = build_correct_card(rng, &main, active, features, spec.correct)?;
    let mut wrong = build_wrong_cards(rng, &main, active, features, spec)?;

    if let Some(previous) = transition_from {
        wrong[NUM_WRONG_CARDS - 1] = build_transition_card(rng, &main, active, previous)?;
    }

    let (options, correct_index) = shuffle_options(rng, correct, wrong);

    Ok(Trial {
        main,
        options,
        correct_index,
        rule: spec.number,
        rule_features: features,
        previous_features: transition_from,
        stage: spec.stage,
        is_transition: transition_from.is_some(),
        index_in_rule,
    })
}

/// Lay out `[correct, wrong...]` under a uniform permutation.
/// Returns the display order and the display index of the correct card.
pub fn shuffle_options(
    rng: &mut impl Rng,
    correct: Card,
    wrong: [Card; NUM_WRONG_CARDS],
) -> ([Card; NUM_OPTIONS], usize) {
    let mut source = [Card::blank(); NUM_OPTIONS];
    source[0] = correct;
    source[1..].copy_from_slice(&wrong);

    let mut perm: [usize; NUM_OPTIONS] = std::array::from_fn(|i| i);
    perm.shuffle(rng);

    let mut options = [Card::blank(); NUM_OPTIONS];
    let mut correct_index = 0;
    for (slot, &src) in perm.iter().enumerate() {
        options[slot] = source[src];
        if src == 0 {
            correct_index = slot;
        }
    }
    (options, correct_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card_mechanics::{count_matches, matches_all};
    use crate::types::Stage;

    fn standard(seed: u64) -> Vec<Trial> {
        generate_all_trials(
            RuleSchedule::Standard,
            DEFAULT_TRIALS_PER_RULE,
            DEFAULT_TRANSITION_TRIALS,
            Some(seed),
        )
        .unwrap()
    }

    #[test]
    fn test_buffer_layout() {
        let trials = standard(42);
        assert_eq!(trials.len(), STANDARD_RULE_COUNT * DEFAULT_TRIALS_PER_RULE);
        for (i, t) in trials.iter().enumerate() {
            assert_eq!(t.rule as usize, i / DEFAULT_TRIALS_PER_RULE + 1);
            assert_eq!(t.index_in_rule, i % DEFAULT_TRIALS_PER_RULE);
            let expected_stage = if t.rule <= 2 {
                Stage::ThreeSymbol
            } else {
                Stage::FourSymbol
            };
            assert_eq!(t.stage, expected_stage);
        }
    }

    #[test]
    fn test_transition_flags() {
        let trials = standard(7);
        for t in &trials {
            let expect = t.rule > 1 && t.index_in_rule < DEFAULT_TRANSITION_TRIALS;
            assert_eq!(t.is_transition, expect, "rule {} idx {}", t.rule, t.index_in_rule);
            assert_eq!(t.previous_features.is_some(), expect);
        }
    }

    #[test]
    fn test_previous_features_point_at_previous_rule() {
        let trials = standard(9);
        for t in trials.iter().filter(|t| t.is_transition) {
            let prev_block = (t.rule as usize - 2) * DEFAULT_TRIALS_PER_RULE;
            assert_eq!(t.previous_features, Some(trials[prev_block].rule_features));
        }
    }

    #[test]
    fn test_consecutive_pairs_differ() {
        for seed in 0..50 {
            let trials = standard(seed);
            for w in trials.windows(2) {
                if w[0].rule != w[1].rule {
                    assert_ne!(w[0].rule_features, w[1].rule_features, "seed {seed}");
                }
            }
        }
    }

    #[test]
    fn test_single_rule_feature_match() {
        let trials = standard(1234);
        for t in &trials {
            let rf = t.rule_features.positions();
            let matching: Vec<usize> = (0..NUM_OPTIONS)
                .filter(|&i| matches_all(&t.main, &t.options[i], &rf))
                .collect();
            assert_eq!(matching, vec![t.correct_index]);
            let correct = &t.options[t.correct_index];
            assert_eq!(count_matches(&t.main, correct, t.active_positions()), 2);
        }
    }

    #[test]
    fn test_transition_card_present() {
        let trials = standard(77);
        for t in trials.iter().filter(|t| t.is_transition) {
            let prf = t.previous_features.unwrap().positions();
            assert!(t
                .options
                .iter()
                .any(|c| matches_all(&t.main, c, &prf)
                    && count_matches(&t.main, c, t.active_positions()) == 2));
        }
    }

    #[test]
    fn test_seed_determinism() {
        assert_eq!(standard(5), standard(5));
        assert_ne!(standard(5), standard(6));
    }

    #[test]
    fn test_generator_stream_advances() {
        let cfg = ExperimentConfig::default();
        let mut generator = TrialGenerator::new(Some(3));
        let a = generator.generate(&cfg).unwrap();
        let b = generator.generate(&cfg).unwrap();
        assert_ne!(a, b);
        let mut again = TrialGenerator::new(Some(3));
        assert_eq!(again.generate(&cfg).unwrap(), a);
    }

    #[test]
    fn test_shuffle_positions_uniform() {
        let mut rng = SmallRng::seed_from_u64(2025);
        let correct = Card([1, 1, 1, 1]);
        let wrong = [Card([2, 2, 2, 2]), Card([3, 3, 3, 3]), Card([4, 4, 4, 4])];
        let n = 8000;
        let mut counts = [0usize; NUM_OPTIONS];
        for _ in 0..n {
            let (options, idx) = shuffle_options(&mut rng, correct, wrong);
            assert_eq!(options[idx], correct);
            counts[idx] += 1;
        }
        for (slot, &c) in counts.iter().enumerate() {
            let freq = c as f64 / n as f64;
            assert!((freq - 0.25).abs() < 0.03, "slot {slot} freq={freq}");
        }
    }

    #[test]
    fn test_reduced_schedule() {
        let trials = generate_all_trials(RuleSchedule::Reduced, 10, 3, Some(11)).unwrap();
        assert_eq!(trials.len(), REDUCED_RULE_COUNT * 10);
        for t in trials.iter().filter(|t| t.rule >= 5) {
            let correct = &t.options[t.correct_index];
            let n = count_matches(&t.main, correct, t.active_positions());
            assert!(n == 2 || n == 3);
        }
    }

    #[test]
    fn test_zero_transition_trials() {
        let trials = generate_all_trials(RuleSchedule::Standard, 4, 0, Some(1)).unwrap();
        assert!(trials.iter().all(|t| !t.is_transition && t.previous_features.is_none()));
    }

    #[test]
    fn test_oversized_buffer_is_rejected() {
        for trials_per_rule in [MAX_TRIALS_PER_RULE + 1, 1 << 40, usize::MAX / 4] {
            assert_eq!(
                generate_all_trials(RuleSchedule::Standard, trials_per_rule, 0, Some(1)),
                Err(GenerationError::BufferTooLarge {
                    rules: STANDARD_RULE_COUNT,
                    trials_per_rule
                })
            );
        }
    }
}

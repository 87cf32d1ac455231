//! Per-rule option-card specifications.
//!
//! Each schedule is a static table of [`RuleSpec`] rows. Adding or removing a
//! rule means editing a row, not a branch.
//!
//! Notation used in the tables:
//!
//! | Spec | Meaning |
//! |------|---------|
//! | `2rf` | exactly the two rule-feature positions match, every other active position differs |
//! | `2rf+` | both rule features match, plus 0 or 1 bonus match among the other positions |
//! | `n` | exactly `n` matches anywhere |
//! | `n-not-rule` | exactly `n` matches, never both rule features |

use rand::Rng;

use crate::card_generator::{generate_matching_card, generate_not_both_rule_match};
use crate::card_mechanics::positions_excluding;
use crate::constants::*;
use crate::error::GenerationError;
use crate::types::{Card, FeaturePair, RuleSchedule, Stage};

/// Shape of the correct option.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorrectCardSpec {
    /// `2rf`.
    RuleFeaturesOnly,
    /// `2rf+`: up to `max_bonus` extra matches, count drawn uniformly.
    RuleFeaturesWithBonus { max_bonus: usize },
}

/// Shape of one wrong option.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrongCardSpec {
    /// Exactly this many matches.
    Matches(usize),
    /// Between `min` and `max` matches (drawn uniformly), never both rule features.
    NotBothRule { min: usize, max: usize },
}

impl WrongCardSpec {
    const fn not_rule(n: usize) -> Self {
        WrongCardSpec::NotBothRule { min: n, max: n }
    }
}

/// One row of a schedule table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleSpec {
    pub number: u32,
    pub stage: Stage,
    pub correct: CorrectCardSpec,
    pub wrong: [WrongCardSpec; NUM_WRONG_CARDS],
}

use CorrectCardSpec::*;
use WrongCardSpec::Matches;

const NR2: WrongCardSpec = WrongCardSpec::not_rule(2);

const fn rule(
    number: u32,
    correct: CorrectCardSpec,
    wrong: [WrongCardSpec; NUM_WRONG_CARDS],
) -> RuleSpec {
    let stage = if number <= LAST_STAGE_ONE_RULE {
        Stage::ThreeSymbol
    } else {
        Stage::FourSymbol
    };
    RuleSpec {
        number,
        stage,
        correct,
        wrong,
    }
}

/// Wrong cards of the late rules: three `2-not-rule`.
const LATE: [WrongCardSpec; NUM_WRONG_CARDS] = [NR2, NR2, NR2];

static STANDARD_RULES: [RuleSpec; STANDARD_RULE_COUNT] = [
    rule(1, RuleFeaturesOnly, [Matches(0), Matches(1), NR2]),
    rule(2, RuleFeaturesOnly, [Matches(1), NR2, NR2]),
    rule(3, RuleFeaturesOnly, [Matches(0), Matches(1), NR2]),
    rule(4, RuleFeaturesOnly, [Matches(1), Matches(1), NR2]),
    rule(5, RuleFeaturesOnly, [Matches(1), NR2, NR2]),
    rule(6, RuleFeaturesOnly, LATE),
    rule(7, RuleFeaturesOnly, LATE),
    rule(8, RuleFeaturesOnly, LATE),
    rule(9, RuleFeaturesOnly, LATE),
    rule(10, RuleFeaturesOnly, LATE),
    rule(11, RuleFeaturesOnly, LATE),
    rule(12, RuleFeaturesOnly, LATE),
    rule(13, RuleFeaturesOnly, LATE),
    rule(14, RuleFeaturesOnly, LATE),
    rule(15, RuleFeaturesOnly, LATE),
    rule(16, RuleFeaturesOnly, LATE),
    rule(17, RuleFeaturesOnly, LATE),
    rule(18, RuleFeaturesOnly, LATE),
    rule(19, RuleFeaturesOnly, LATE),
];

static REDUCED_RULES: [RuleSpec; REDUCED_RULE_COUNT] = [
    rule(1, RuleFeaturesOnly, [Matches(0), Matches(1), NR2]),
    rule(2, RuleFeaturesOnly, [Matches(1), NR2, NR2]),
    rule(3, RuleFeaturesOnly, [Matches(0), Matches(1), NR2]),
    rule(4, RuleFeaturesOnly, [Matches(1), Matches(1), NR2]),
    rule(
        5,
        RuleFeaturesWithBonus { max_bonus: 1 },
        [Matches(1), NR2, NR2],
    ),
    rule(
        6,
        RuleFeaturesWithBonus { max_bonus: 1 },
        [WrongCardSpec::NotBothRule { min: 2, max: 3 }, NR2, NR2],
    ),
];

impl RuleSchedule {
    /// The schedule's rule table, ordered by rule number.
    pub fn rules(&self) -> &'static [RuleSpec] {
        match self {
            RuleSchedule::Standard => &STANDARD_RULES,
            RuleSchedule::Reduced => &REDUCED_RULES,
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules().len()
    }
}

/// Build the correct option for `features` under `spec`.
pub fn build_correct_card(
    rng: &mut impl Rng,
    main: &Card,
    active_positions: &[usize],
    features: FeaturePair,
    spec: CorrectCardSpec,
) -> Result<Card, GenerationError> {
    let rf = features.positions();
    let non_rf = positions_excluding(active_positions, &rf);
    match spec {
        RuleFeaturesOnly => {
            generate_matching_card(rng, main, active_positions, RULE_FEATURE_COUNT, &rf, &non_rf)
        }
        RuleFeaturesWithBonus { max_bonus } => {
            let bonus = rng.random_range(0..=max_bonus.min(non_rf.len()));
            generate_matching_card(
                rng,
                main,
                active_positions,
                RULE_FEATURE_COUNT + bonus,
                &rf,
                &[],
            )
        }
    }
}

/// Build one wrong option for `features` under `spec`.
pub fn build_wrong_card(
    rng: &mut impl Rng,
    main: &Card,
    active_positions: &[usize],
    features: FeaturePair,
    spec: WrongCardSpec,
) -> Result<Card, GenerationError> {
    match spec {
        Matches(n) => generate_matching_card(rng, main, active_positions, n, &[], &[]),
        WrongCardSpec::NotBothRule { min, max } => {
            let n = if min >= max {
                min
            } else {
                rng.random_range(min..=max)
            };
            generate_not_both_rule_match(rng, main, active_positions, &features.positions(), n)
        }
    }
}

/// Build the three wrong options of a rule, in table order.
pub fn build_wrong_cards(
    rng: &mut impl Rng,
    main: &Card,
    active_positions: &[usize],
    features: FeaturePair,
    spec: &RuleSpec,
) -> Result<[Card; NUM_WRONG_CARDS], GenerationError> {
    let mut cards = [Card::blank(); NUM_WRONG_CARDS];
    for (slot, &wrong) in cards.iter_mut().zip(spec.wrong.iter()) {
        *slot = build_wrong_card(rng, main, active_positions, features, wrong)?;
    }
    Ok(cards)
}

/// Transition card: matches `main` exactly on the previous rule's pair, differs elsewhere.
pub fn build_transition_card(
    rng: &mut impl Rng,
    main: &Card,
    active_positions: &[usize],
    previous: FeaturePair,
) -> Result<Card, GenerationError> {
    let prf = previous.positions();
    let non_prf = positions_excluding(active_positions, &prf);
    generate_matching_card(rng, main, active_positions, RULE_FEATURE_COUNT, &prf, &non_prf)
}

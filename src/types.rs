use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{ConfigError, SessionError};

/// A stimulus card: one value per symbol slot.
///
/// Inactive slots hold [`SYMBOL_ABSENT`]; active slots hold a form in
/// [`MIN_SYMBOL`]`..=`[`MAX_SYMBOL`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Card(pub [u8; NUM_POSITIONS]);

impl Card {
    /// All slots absent.
    pub const fn blank() -> Self {
        Card([SYMBOL_ABSENT; NUM_POSITIONS])
    }

    #[inline(always)]
    pub fn get(&self, position: usize) -> u8 {
        self.0[position]
    }

    #[inline(always)]
    pub fn set(&mut self, position: usize, value: u8) {
        self.0[position] = value;
    }

    pub fn values(&self) -> &[u8; NUM_POSITIONS] {
        &self.0
    }

    /// Display identifier used for asset lookup: the four values concatenated,
    /// e.g. `[2, 4, 4, 1]` -> `"2441"`.
    pub fn code(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for v in self.0 {
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

/// The two active positions a rule matches on. Stored in ascending order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeaturePair(pub usize, pub usize);

impl FeaturePair {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            FeaturePair(a, b)
        } else {
            FeaturePair(b, a)
        }
    }

    pub fn positions(&self) -> [usize; RULE_FEATURE_COUNT] {
        [self.0, self.1]
    }

    pub fn contains(&self, position: usize) -> bool {
        self.0 == position || self.1 == position
    }
}

impl fmt::Display for FeaturePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// Card shape used by a rule block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// 3-symbol cards, slot 3 always absent.
    ThreeSymbol,
    /// 4-symbol cards.
    FourSymbol,
}

impl Stage {
    pub fn active_positions(&self) -> &'static [usize] {
        match self {
            Stage::ThreeSymbol => &STAGE_ONE_POSITIONS,
            Stage::FourSymbol => &STAGE_TWO_POSITIONS,
        }
    }

    /// All 2-combinations of the active positions, in lexicographic order.
    pub fn feature_pairs(&self) -> Vec<FeaturePair> {
        let active = self.active_positions();
        let mut pairs = Vec::with_capacity(active.len() * (active.len() - 1) / 2);
        for i in 0..active.len() {
            for j in (i + 1)..active.len() {
                pairs.push(FeaturePair(active[i], active[j]));
            }
        }
        pairs
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ThreeSymbol => "three_symbol",
            Stage::FourSymbol => "four_symbol",
        }
    }
}

/// Which rule table drives trial generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSchedule {
    /// 19 rules, exact two-feature correct cards throughout.
    #[default]
    Standard,
    /// 6 rules; rules 5-6 use the easier correct card with a possible bonus match.
    Reduced,
}

impl RuleSchedule {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSchedule::Standard => "standard",
            RuleSchedule::Reduced => "reduced",
        }
    }
}

impl FromStr for RuleSchedule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "19" => Ok(RuleSchedule::Standard),
            "reduced" | "6" => Ok(RuleSchedule::Reduced),
            other => Err(ConfigError::UnknownSchedule(other.to_string())),
        }
    }
}

/// Experiment parameters. Every field has a default so partial JSON bodies work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub schedule: RuleSchedule,
    pub trials_per_rule: usize,
    pub transition_trials: usize,
    pub max_counted_trials: usize,
    pub streak_to_advance: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            schedule: RuleSchedule::Standard,
            trials_per_rule: DEFAULT_TRIALS_PER_RULE,
            transition_trials: DEFAULT_TRANSITION_TRIALS,
            max_counted_trials: DEFAULT_MAX_COUNTED_TRIALS,
            streak_to_advance: DEFAULT_STREAK_TO_ADVANCE,
        }
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trials_per_rule == 0 {
            return Err(ConfigError::NoTrialsPerRule);
        }
        if self.trials_per_rule > MAX_TRIALS_PER_RULE {
            return Err(ConfigError::TooManyTrialsPerRule {
                value: self.trials_per_rule,
                max: MAX_TRIALS_PER_RULE,
            });
        }
        if self.transition_trials > self.trials_per_rule {
            return Err(ConfigError::TooManyTransitionTrials {
                transition: self.transition_trials,
                per_rule: self.trials_per_rule,
            });
        }
        if self.streak_to_advance == 0 {
            return Err(ConfigError::ZeroStreak);
        }
        if self.max_counted_trials == 0 {
            return Err(ConfigError::ZeroCountedTrials);
        }
        if self.max_counted_trials > MAX_COUNTED_TRIALS_LIMIT {
            return Err(ConfigError::TooManyCountedTrials {
                value: self.max_counted_trials,
                max: MAX_COUNTED_TRIALS_LIMIT,
            });
        }
        Ok(())
    }
}

/// Participant-facing result of one answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Correct,
    /// Wrong card, but it shares at least one rule-feature value with the main card.
    HalfCorrect,
    Incorrect,
}

impl Feedback {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feedback::Correct => "correct",
            Feedback::HalfCorrect => "half_correct",
            Feedback::Incorrect => "incorrect",
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Feedback::Correct)
    }
}

/// One presentation unit. Built once by the generator, never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    pub main: Card,
    /// Options in display order.
    pub options: [Card; NUM_OPTIONS],
    /// Display index of the correct option.
    pub correct_index: usize,
    /// Rule number, 1-based.
    pub rule: u32,
    pub rule_features: FeaturePair,
    /// Set only on transition trials of a non-first rule.
    pub previous_features: Option<FeaturePair>,
    pub stage: Stage,
    pub is_transition: bool,
    /// Ordinal within the rule's block, 0-based.
    pub index_in_rule: usize,
}

impl Trial {
    /// Option at display index `index`, or a selection error.
    pub fn option(&self, index: usize) -> Result<&Card, SessionError> {
        self.options
            .get(index)
            .ok_or(SessionError::SelectionOutOfRange {
                index,
                options: NUM_OPTIONS,
            })
    }

    pub fn active_positions(&self) -> &'static [usize] {
        self.stage.active_positions()
    }

    pub fn is_first_of_rule(&self) -> bool {
        self.index_in_rule == 0
    }

    pub fn main_code(&self) -> String {
        self.main.code()
    }

    pub fn option_codes(&self) -> Vec<String> {
        self.options.iter().map(Card::code).collect()
    }
}

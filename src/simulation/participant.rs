//! Response strategies for simulated participants.

use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::card_mechanics::matches_all;
use crate::constants::NUM_OPTIONS;
use crate::types::{FeaturePair, Feedback, Trial};

/// Something that answers trials and learns from feedback.
pub trait Participant: Send {
    /// Display index of the chosen option.
    fn choose(&mut self, trial: &Trial, rng: &mut SmallRng) -> usize;

    /// Feedback for the answer just given.
    fn observe(
        &mut self,
        _trial: &Trial,
        _selected: usize,
        _feedback: Feedback,
        _rng: &mut SmallRng,
    ) {
    }
}

/// Always picks the correct option.
pub struct Oracle;

impl Participant for Oracle {
    fn choose(&mut self, trial: &Trial, _rng: &mut SmallRng) -> usize {
        trial.correct_index
    }
}

/// Uniform random choice, ignores feedback.
pub struct RandomResponder;

impl Participant for RandomResponder {
    fn choose(&mut self, _trial: &Trial, rng: &mut SmallRng) -> usize {
        rng.random_range(0..NUM_OPTIONS)
    }
}

/// Sorts by a hypothesized feature pair and revises it after negative feedback.
///
/// After a wrong answer the hypothesis is kept with probability `stickiness`
/// (perseveration) and otherwise replaced by a different pair of the stage.
pub struct HypothesisTester {
    stickiness: f64,
    hypothesis: Option<FeaturePair>,
}

impl HypothesisTester {
    pub fn new(stickiness: f64) -> Self {
        Self {
            stickiness: stickiness.clamp(0.0, 1.0),
            hypothesis: None,
        }
    }

    pub fn hypothesis(&self) -> Option<FeaturePair> {
        self.hypothesis
    }

    fn draw_pair(trial: &Trial, exclude: Option<FeaturePair>, rng: &mut SmallRng) -> FeaturePair {
        let pool: Vec<FeaturePair> = trial
            .stage
            .feature_pairs()
            .into_iter()
            .filter(|p| Some(*p) != exclude)
            .collect();
        pool[rng.random_range(0..pool.len())]
    }
}

impl Participant for HypothesisTester {
    fn choose(&mut self, trial: &Trial, rng: &mut SmallRng) -> usize {
        let pool = trial.stage.feature_pairs();
        let hypothesis = match self.hypothesis {
            Some(h) if pool.contains(&h) => h,
            _ => Self::draw_pair(trial, None, rng),
        };
        self.hypothesis = Some(hypothesis);

        let fitting: Vec<usize> = (0..NUM_OPTIONS)
            .filter(|&i| matches_all(&trial.main, &trial.options[i], &hypothesis.positions()))
            .collect();
        if fitting.is_empty() {
            rng.random_range(0..NUM_OPTIONS)
        } else {
            fitting[rng.random_range(0..fitting.len())]
        }
    }

    fn observe(&mut self, trial: &Trial, _selected: usize, feedback: Feedback, rng: &mut SmallRng) {
        if feedback.is_correct() || rng.random_bool(self.stickiness) {
            return;
        }
        self.hypothesis = Some(Self::draw_pair(trial, self.hypothesis, rng));
    }
}

/// Named participant configuration, buildable per simulated session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    Oracle,
    Random,
    HypothesisTester { stickiness: f64 },
}

impl ParticipantKind {
    pub fn build(&self) -> Box<dyn Participant> {
        match *self {
            ParticipantKind::Oracle => Box::new(Oracle),
            ParticipantKind::Random => Box::new(RandomResponder),
            ParticipantKind::HypothesisTester { stickiness } => {
                Box::new(HypothesisTester::new(stickiness))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParticipantKind::Oracle => "oracle",
            ParticipantKind::Random => "random",
            ParticipantKind::HypothesisTester { .. } => "hypothesis",
        }
    }
}

impl FromStr for ParticipantKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oracle" => Ok(ParticipantKind::Oracle),
            "random" => Ok(ParticipantKind::Random),
            "hypothesis" => Ok(ParticipantKind::HypothesisTester { stickiness: 0.0 }),
            other => Err(format!(
                "unknown participant '{}' (expected oracle, random, hypothesis)",
                other
            )),
        }
    }
}

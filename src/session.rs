//! Session state machine over a generated trial buffer.
//!
//! Per answer:
//!
//! 1. `counted_trials += 1`.
//! 2. Streak: correct -> `streak += 1`, anything else -> `streak = 0`.
//! 3. Unless the trial is the first of its rule: correct -> `score += 1`,
//!    otherwise one of the two error counters per [`is_perseverative`].
//! 4. Cursor: `streak == streak_to_advance` jumps to the next rule's first
//!    trial (`rules_found += 1`); else the last trial of a block moves to the
//!    next rule; else the next trial. Both rule moves reset the streak.
//!
//! The session is finished once `counted_trials >= max_counted_trials` or the
//! cursor has run past the buffer.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SessionError;
use crate::scoring::{evaluate, is_perseverative};
use crate::trial_generator::TrialGenerator;
use crate::types::{ExperimentConfig, Feedback, Trial};

/// Counters shown to the participant / experimenter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounters {
    pub counted_trials: usize,
    pub score: usize,
    pub rules_found: usize,
    pub perseverative_errors: usize,
    pub non_perseverative_errors: usize,
}

/// Kind of a scored wrong answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Perseverative,
    NonPerseverative,
}

/// Where the cursor went after an answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorMove {
    /// Next trial of the same rule.
    Next,
    /// First trial of the next rule (streak reached or block exhausted).
    NextRule,
    /// Terminal state.
    Finished,
}

/// Result of one [`Session::submit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub feedback: Feedback,
    /// Error classification, only for scored wrong answers.
    pub error_kind: Option<ErrorKind>,
    /// False on the first trial of a rule.
    pub scored: bool,
    pub rule_found: bool,
    pub cursor_move: CursorMove,
}

pub struct Session {
    config: ExperimentConfig,
    generator: TrialGenerator,
    trials: Vec<Trial>,
    cursor: usize,
    counters: SessionCounters,
    streak: usize,
    last_outcome: Option<AnswerOutcome>,
}

impl Session {
    /// Validate `config` and generate a fresh trial buffer.
    pub fn new(config: ExperimentConfig, seed: Option<u64>) -> Result<Self, SessionError> {
        config.validate()?;
        let mut generator = TrialGenerator::new(seed);
        let trials = generator.generate(&config)?;
        info!(
            schedule = config.schedule.as_str(),
            trials = trials.len(),
            seeded = seed.is_some(),
            "session created"
        );
        Ok(Self::from_parts(config, generator, trials))
    }

    /// Session over a caller-provided buffer (ordered by rule, blocks contiguous).
    pub fn with_trials(config: ExperimentConfig, trials: Vec<Trial>) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self::from_parts(config, TrialGenerator::new(None), trials))
    }

    fn from_parts(config: ExperimentConfig, generator: TrialGenerator, trials: Vec<Trial>) -> Self {
        Self {
            config,
            generator,
            trials,
            cursor: 0,
            counters: SessionCounters::default(),
            streak: 0,
            last_outcome: None,
        }
    }

    /// Regenerate the buffer from this session's random stream and zero all state.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.trials = self.generator.generate(&self.config)?;
        self.cursor = 0;
        self.counters = SessionCounters::default();
        self.streak = 0;
        self.last_outcome = None;
        info!(trials = self.trials.len(), "session reset");
        Ok(())
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn streak(&self) -> usize {
        self.streak
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    /// Feedback of the most recent answer, cleared on reset.
    pub fn last_outcome(&self) -> Option<&AnswerOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.counters.counted_trials >= self.config.max_counted_trials
            || self.cursor >= self.trials.len()
    }

    /// The trial awaiting an answer, `None` once finished.
    pub fn current_trial(&self) -> Option<&Trial> {
        if self.is_finished() {
            None
        } else {
            self.trials.get(self.cursor)
        }
    }

    /// Apply one answer to the current trial.
    pub fn submit(&mut self, selected_index: usize) -> Result<AnswerOutcome, SessionError> {
        let trial = self.current_trial().ok_or(SessionError::Finished)?;
        let feedback = evaluate(trial, selected_index)?;
        let perseverative = is_perseverative(trial, selected_index)?;
        let scored = !trial.is_first_of_rule();
        let rule = trial.rule;
        let last_in_block = self.is_last_in_block(self.cursor);

        self.counters.counted_trials += 1;

        let mut error_kind = None;
        if feedback.is_correct() {
            self.streak += 1;
            if scored {
                self.counters.score += 1;
            }
        } else {
            self.streak = 0;
            if scored {
                let kind = if perseverative {
                    self.counters.perseverative_errors += 1;
                    ErrorKind::Perseverative
                } else {
                    self.counters.non_perseverative_errors += 1;
                    ErrorKind::NonPerseverative
                };
                error_kind = Some(kind);
            }
        }

        let rule_found = self.streak >= self.config.streak_to_advance;
        let mut cursor_move = if rule_found {
            self.counters.rules_found += 1;
            debug!(rule, rules_found = self.counters.rules_found, "rule found");
            self.jump_to_next_rule();
            CursorMove::NextRule
        } else if last_in_block {
            debug!(rule, "rule block exhausted");
            self.jump_to_next_rule();
            CursorMove::NextRule
        } else {
            self.cursor += 1;
            CursorMove::Next
        };

        if self.is_finished() {
            cursor_move = CursorMove::Finished;
            info!(
                counted_trials = self.counters.counted_trials,
                score = self.counters.score,
                rules_found = self.counters.rules_found,
                "session finished"
            );
        }

        let outcome = AnswerOutcome {
            feedback,
            error_kind,
            scored,
            rule_found,
            cursor_move,
        };
        self.last_outcome = Some(outcome);
        Ok(outcome)
    }

    fn is_last_in_block(&self, index: usize) -> bool {
        match (self.trials.get(index), self.trials.get(index + 1)) {
            (Some(t), Some(next)) => next.rule != t.rule,
            _ => true,
        }
    }

    /// Move to the first trial after the current rule's block, or past the end.
    fn jump_to_next_rule(&mut self) {
        let rule = self.trials[self.cursor].rule;
        let mut next = self.cursor + 1;
        while next < self.trials.len() && self.trials[next].rule == rule {
            next += 1;
        }
        self.cursor = next;
        self.streak = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RuleSchedule;

    fn session(seed: u64) -> Session {
        Session::new(ExperimentConfig::default(), Some(seed)).unwrap()
    }

    /// Index of any wrong option.
    fn wrong_index(trial: &Trial) -> usize {
        (trial.correct_index + 1) % trial.options.len()
    }

    #[test]
    fn test_new_session_state() {
        let s = session(1);
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.streak(), 0);
        assert_eq!(*s.counters(), SessionCounters::default());
        assert!(!s.is_finished());
        assert!(s.last_outcome().is_none());
        assert_eq!(s.current_trial().unwrap().rule, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = ExperimentConfig {
            trials_per_rule: 0,
            ..Default::default()
        };
        assert!(matches!(
            Session::new(cfg, Some(1)),
            Err(SessionError::Config(_))
        ));
    }

    #[test]
    fn test_streak_jumps_to_next_rule() {
        let mut s = session(2);
        for expected_streak in 1..=2 {
            let idx = s.current_trial().unwrap().correct_index;
            let out = s.submit(idx).unwrap();
            assert_eq!(out.cursor_move, CursorMove::Next);
            assert_eq!(s.streak(), expected_streak);
        }
        let idx = s.current_trial().unwrap().correct_index;
        let out = s.submit(idx).unwrap();
        assert!(out.rule_found);
        assert_eq!(out.cursor_move, CursorMove::NextRule);
        assert_eq!(s.streak(), 0);
        assert_eq!(s.counters().rules_found, 1);
        // First trial unscored, next two scored.
        assert_eq!(s.counters().score, 2);
        let t = s.current_trial().unwrap();
        assert_eq!((t.rule, t.index_in_rule), (2, 0));
    }

    #[test]
    fn test_exhaustion_moves_to_next_rule() {
        let mut s = session(3);
        for _ in 0..10 {
            let idx = wrong_index(s.current_trial().unwrap());
            s.submit(idx).unwrap();
        }
        assert_eq!(s.counters().rules_found, 0);
        assert_eq!(s.cursor(), 10);
        assert_eq!(s.last_outcome().unwrap().cursor_move, CursorMove::NextRule);
        let t = s.current_trial().unwrap();
        assert_eq!((t.rule, t.index_in_rule), (2, 0));
        assert_eq!(s.counters().counted_trials, 10);
        // 9 scored wrong answers on rule 1, which has no previous rule.
        assert_eq!(s.counters().non_perseverative_errors, 9);
        assert_eq!(s.counters().perseverative_errors, 0);
    }

    #[test]
    fn test_first_trial_unscored() {
        let mut s = session(4);
        let idx = wrong_index(s.current_trial().unwrap());
        let out = s.submit(idx).unwrap();
        assert!(!out.scored);
        assert_eq!(out.error_kind, None);
        assert_eq!(s.counters().counted_trials, 1);
        assert_eq!(s.counters().non_perseverative_errors, 0);
        assert_eq!(s.counters().perseverative_errors, 0);
        assert_eq!(s.counters().score, 0);
    }

    #[test]
    fn test_first_trial_correct_feeds_streak() {
        let mut s = session(5);
        let idx = s.current_trial().unwrap().correct_index;
        s.submit(idx).unwrap();
        assert_eq!(s.streak(), 1);
        assert_eq!(s.counters().score, 0);
    }

    #[test]
    fn test_terminates_at_counted_limit() {
        let mut s = session(6);
        let mut answered = 0;
        while let Some(t) = s.current_trial() {
            let idx = wrong_index(t);
            s.submit(idx).unwrap();
            answered += 1;
        }
        assert_eq!(answered, 60);
        assert!(s.is_finished());
        assert_eq!(s.last_outcome().unwrap().cursor_move, CursorMove::Finished);
        assert!(matches!(s.submit(0), Err(SessionError::Finished)));
    }

    #[test]
    fn test_terminates_at_buffer_end() {
        let cfg = ExperimentConfig {
            schedule: RuleSchedule::Reduced,
            trials_per_rule: 4,
            transition_trials: 1,
            ..Default::default()
        };
        let mut s = Session::new(cfg, Some(7)).unwrap();
        let mut answered = 0;
        while let Some(t) = s.current_trial() {
            let idx = t.correct_index;
            s.submit(idx).unwrap();
            answered += 1;
        }
        // 6 rules x 3 correct answers each.
        assert_eq!(answered, 18);
        assert_eq!(s.counters().rules_found, 6);
        assert_eq!(s.cursor(), s.trials().len());
    }

    #[test]
    fn test_out_of_range_selection_leaves_state() {
        let mut s = session(8);
        assert!(matches!(
            s.submit(4),
            Err(SessionError::SelectionOutOfRange { .. })
        ));
        assert_eq!(s.counters().counted_trials, 0);
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn test_reset_zeroes_state() {
        let mut s = session(9);
        let before = s.trials().to_vec();
        for _ in 0..5 {
            let idx = s.current_trial().unwrap().correct_index;
            s.submit(idx).unwrap();
        }
        s.reset().unwrap();
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.streak(), 0);
        assert_eq!(*s.counters(), SessionCounters::default());
        assert!(s.last_outcome().is_none());
        assert_ne!(s.trials(), &before[..]);
    }
}

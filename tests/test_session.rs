//! Scripted session scenarios over hand-built trial buffers.

use wcst::error::SessionError;
use wcst::session::{CursorMove, ErrorKind, Session};
use wcst::types::{Card, ExperimentConfig, FeaturePair, Feedback, Stage, Trial};

const MAIN: Card = Card([1, 2, 3, 4]);

/// Options: 0 = rule (2,3) correct, 1 = old rule (0,1), 2 = position 0 only, 3 = nothing.
fn trial(rule: u32, index_in_rule: usize, previous: Option<FeaturePair>) -> Trial {
    Trial {
        main: MAIN,
        options: [
            Card([2, 3, 3, 4]),
            Card([1, 2, 4, 1]),
            Card([1, 3, 4, 1]),
            Card([4, 4, 4, 1]),
        ],
        correct_index: 0,
        rule,
        rule_features: FeaturePair(2, 3),
        previous_features: previous,
        stage: Stage::FourSymbol,
        is_transition: previous.is_some(),
        index_in_rule,
    }
}

/// `rules` blocks of `per_rule` trials; blocks after the first carry previous pair (0,1)
/// on their first `transition` trials.
fn buffer(rules: u32, per_rule: usize, transition: usize) -> Vec<Trial> {
    let mut trials = Vec::new();
    for rule in 1..=rules {
        for i in 0..per_rule {
            let previous = if rule > 1 && i < transition {
                Some(FeaturePair(0, 1))
            } else {
                None
            };
            trials.push(trial(rule, i, previous));
        }
    }
    trials
}

fn session(rules: u32, per_rule: usize, transition: usize) -> Session {
    let config = ExperimentConfig {
        trials_per_rule: per_rule,
        transition_trials: transition,
        ..Default::default()
    };
    Session::with_trials(config, buffer(rules, per_rule, transition)).unwrap()
}

#[test]
fn three_correct_after_first_trial_advances_rule() {
    let mut s = session(3, 10, 3);
    // Miss the first (unscored) trial so the streak starts on scored trials.
    s.submit(3).unwrap();
    assert_eq!(s.streak(), 0);

    for _ in 0..2 {
        let out = s.submit(0).unwrap();
        assert_eq!(out.cursor_move, CursorMove::Next);
    }
    let out = s.submit(0).unwrap();
    assert!(out.rule_found);
    assert_eq!(out.cursor_move, CursorMove::NextRule);
    assert_eq!(s.counters().rules_found, 1);
    assert_eq!(s.counters().score, 3);
    assert_eq!(s.streak(), 0);
    assert_eq!(s.cursor(), 10);
}

#[test]
fn broken_streak_does_not_advance() {
    let mut s = session(2, 10, 3);
    s.submit(0).unwrap();
    s.submit(0).unwrap();
    s.submit(2).unwrap();
    assert_eq!(s.streak(), 0);
    s.submit(0).unwrap();
    s.submit(0).unwrap();
    assert_eq!(s.counters().rules_found, 0);
    assert_eq!(s.cursor(), 5);
}

#[test]
fn exhausted_block_moves_to_next_rule() {
    let mut s = session(2, 10, 3);
    for i in 0..9 {
        let out = s.submit(3).unwrap();
        assert_eq!(out.cursor_move, CursorMove::Next, "trial {i}");
    }
    let out = s.submit(3).unwrap();
    assert_eq!(out.cursor_move, CursorMove::NextRule);
    assert!(!out.rule_found);
    assert_eq!(s.cursor(), 10);
    assert_eq!(s.counters().rules_found, 0);
}

#[test]
fn streak_wins_over_exhaustion_on_last_trial() {
    let mut s = session(2, 10, 3);
    for _ in 0..7 {
        s.submit(3).unwrap();
    }
    for _ in 0..3 {
        s.submit(0).unwrap();
    }
    let out = s.last_outcome().unwrap();
    assert!(out.rule_found);
    assert_eq!(s.counters().rules_found, 1);
    assert_eq!(s.cursor(), 10);
}

#[test]
fn last_rule_exhaustion_finishes() {
    let mut s = session(1, 4, 0);
    for _ in 0..3 {
        s.submit(3).unwrap();
    }
    let out = s.submit(3).unwrap();
    assert_eq!(out.cursor_move, CursorMove::Finished);
    assert!(s.is_finished());
    assert!(s.current_trial().is_none());
    assert!(matches!(s.submit(0), Err(SessionError::Finished)));
}

#[test]
fn perseverative_errors_classified() {
    let mut s = session(2, 10, 3);
    // Exhaust rule 1 quickly via the streak.
    for _ in 0..3 {
        s.submit(0).unwrap();
    }
    assert_eq!(s.cursor(), 10);

    // Rule 2, first trial: unscored even when perseverative.
    let out = s.submit(1).unwrap();
    assert!(!out.scored);
    assert_eq!(out.error_kind, None);
    assert_eq!(s.counters().perseverative_errors, 0);

    // Second trial carries the previous pair: option 1 matches (0,1) fully.
    let out = s.submit(1).unwrap();
    assert_eq!(out.error_kind, Some(ErrorKind::Perseverative));
    assert_eq!(s.counters().perseverative_errors, 1);

    // Third trial: option 2 matches only position 0 of the old pair.
    let out = s.submit(2).unwrap();
    assert_eq!(out.feedback, Feedback::Incorrect);
    assert_eq!(out.error_kind, Some(ErrorKind::NonPerseverative));
    assert_eq!(s.counters().non_perseverative_errors, 1);

    // Past the transition trials the previous pair is gone.
    let out = s.submit(1).unwrap();
    assert_eq!(out.error_kind, Some(ErrorKind::NonPerseverative));
    assert_eq!(s.counters().perseverative_errors, 1);
    assert_eq!(s.counters().non_perseverative_errors, 2);
}

#[test]
fn half_correct_feedback() {
    let mut s = session(1, 10, 0);
    let mut t = trial(1, 0, None);
    t.options[3] = Card([4, 4, 3, 1]);
    let mut trials = vec![t];
    trials.extend(buffer(1, 10, 0).into_iter().skip(1));
    let mut s2 = Session::with_trials(s.config().clone(), trials).unwrap();
    assert_eq!(s2.submit(3).unwrap().feedback, Feedback::HalfCorrect);
    assert_eq!(s.submit(3).unwrap().feedback, Feedback::Incorrect);
}

#[test]
fn counted_limit_ends_session() {
    let config = ExperimentConfig {
        max_counted_trials: 5,
        ..Default::default()
    };
    let mut s = Session::with_trials(config, buffer(3, 10, 3)).unwrap();
    for _ in 0..4 {
        s.submit(3).unwrap();
    }
    let out = s.submit(3).unwrap();
    assert_eq!(out.cursor_move, CursorMove::Finished);
    assert_eq!(s.counters().counted_trials, 5);
    assert!(s.current_trial().is_none());
}

#[test]
fn first_trial_never_scores() {
    for pick in 0..4 {
        let mut s = session(2, 10, 3);
        s.submit(pick).unwrap();
        let c = s.counters();
        assert_eq!(c.counted_trials, 1);
        assert_eq!(c.score, 0);
        assert_eq!(c.perseverative_errors, 0);
        assert_eq!(c.non_perseverative_errors, 0);
        assert_eq!(s.streak(), usize::from(pick == 0));
    }
}

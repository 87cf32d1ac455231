//! Answer evaluation and perseveration classification. Both are pure.

use crate::card_mechanics::{count_matches, matches_all};
use crate::error::SessionError;
use crate::types::{Feedback, Trial};

/// Score a selection against the trial's recorded correct index.
///
/// A wrong card that shares at least one rule-feature value with the main
/// card is [`Feedback::HalfCorrect`].
pub fn evaluate(trial: &Trial, selected_index: usize) -> Result<Feedback, SessionError> {
    let selected = trial.option(selected_index)?;
    if selected_index == trial.correct_index {
        return Ok(Feedback::Correct);
    }
    let shared = count_matches(&trial.main, selected, &trial.rule_features.positions());
    Ok(if shared >= 1 {
        Feedback::HalfCorrect
    } else {
        Feedback::Incorrect
    })
}

/// True iff the trial carries a previous rule and the selection matches the
/// main card on *all* of that rule's feature positions.
pub fn is_perseverative(trial: &Trial, selected_index: usize) -> Result<bool, SessionError> {
    let selected = trial.option(selected_index)?;
    Ok(match trial.previous_features {
        Some(prev) => matches_all(&trial.main, selected, &prev.positions()),
        None => false,
    })
}

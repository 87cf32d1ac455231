//! Exact-match card construction.
//!
//! Every card the trial builder needs reduces to one primitive,
//! [`generate_matching_card`]: match a main card on exactly `n_match` active
//! positions, with some positions pinned to match and some pinned to differ.
//! The remaining free positions receive the extra matches, chosen uniformly
//! over all subsets of the required size.

use rand::seq::index::sample;
use rand::Rng;

use crate::card_mechanics::{different_value, positions_excluding, random_symbol};
use crate::error::GenerationError;
use crate::types::Card;

/// Card with an independent uniform form on each active position, absent elsewhere.
pub fn generate_random_card(rng: &mut impl Rng, active_positions: &[usize]) -> Card {
    let mut card = Card::blank();
    for &p in active_positions {
        card.set(p, random_symbol(rng));
    }
    card
}

/// Card matching `main` on exactly `n_match` of `active_positions`.
///
/// Positions in `must_match` always match, positions in `must_differ` always
/// differ. Fails when the two sets overlap, name an inactive position, or
/// leave the free positions unable to supply exactly
/// `n_match - |must_match|` extra matches.
pub fn generate_matching_card(
    rng: &mut impl Rng,
    main: &Card,
    active_positions: &[usize],
    n_match: usize,
    must_match: &[usize],
    must_differ: &[usize],
) -> Result<Card, GenerationError> {
    let overlap: Vec<usize> = must_match
        .iter()
        .copied()
        .filter(|p| must_differ.contains(p))
        .collect();
    if !overlap.is_empty() {
        return Err(GenerationError::Overlap(overlap));
    }

    if let Some(&position) = must_match
        .iter()
        .chain(must_differ)
        .find(|&&p| !active_positions.contains(&p))
    {
        return Err(GenerationError::PositionNotActive {
            position,
            active: active_positions.to_vec(),
        });
    }

    let pinned: Vec<usize> = must_match.iter().chain(must_differ).copied().collect();
    let free = positions_excluding(active_positions, &pinned);

    let n_extra = match n_match.checked_sub(must_match.len()) {
        Some(n) if n <= free.len() => n,
        _ => {
            return Err(GenerationError::Infeasible {
                n_match,
                must_match: must_match.to_vec(),
                must_differ: must_differ.to_vec(),
                free,
            })
        }
    };

    let mut card = Card::blank();
    for &p in must_match {
        card.set(p, main.get(p));
    }
    for &p in must_differ {
        card.set(p, different_value(rng, main.get(p)));
    }

    let extra = sample(rng, free.len(), n_extra);
    let mut take_match = vec![false; free.len()];
    for i in extra.iter() {
        take_match[i] = true;
    }
    for (i, &p) in free.iter().enumerate() {
        let v = if take_match[i] {
            main.get(p)
        } else {
            different_value(rng, main.get(p))
        };
        card.set(p, v);
    }

    Ok(card)
}

/// Card with exactly `n_match` matches that never matches *all* rule features.
///
/// The number of rule features matched is drawn uniformly from the feasible
/// range `[max(0, n_match - |non_rule|), min(|rule_features| - 1, n_match)]`;
/// which ones match is then drawn uniformly.
pub fn generate_not_both_rule_match(
    rng: &mut impl Rng,
    main: &Card,
    active_positions: &[usize],
    rule_features: &[usize],
    n_match: usize,
) -> Result<Card, GenerationError> {
    let infeasible = || GenerationError::InfeasibleNotRule {
        n_match,
        rule_features: rule_features.to_vec(),
        active: active_positions.to_vec(),
    };

    if rule_features.is_empty() {
        return Err(infeasible());
    }

    let non_rule = positions_excluding(active_positions, rule_features);
    let max_rf = (rule_features.len() - 1).min(n_match);
    let min_rf = n_match.saturating_sub(non_rule.len());
    if min_rf > max_rf {
        return Err(infeasible());
    }

    let n_rf = rng.random_range(min_rf..=max_rf);
    let chosen = sample(rng, rule_features.len(), n_rf);
    let mut matched = Vec::with_capacity(n_rf);
    let mut unmatched = Vec::with_capacity(rule_features.len() - n_rf);
    for (i, &p) in rule_features.iter().enumerate() {
        if chosen.iter().any(|c| c == i) {
            matched.push(p);
        } else {
            unmatched.push(p);
        }
    }

    generate_matching_card(rng, main, active_positions, n_match, &matched, &unmatched)
}

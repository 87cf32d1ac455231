use rand::Rng;

use crate::constants::*;
use crate::types::Card;

/// Number of `positions` on which `a` and `b` carry the same value.
pub fn count_matches(a: &Card, b: &Card, positions: &[usize]) -> usize {
    positions.iter().filter(|&&p| a.get(p) == b.get(p)).count()
}

/// True iff `a` and `b` agree on every position in `positions`.
pub fn matches_all(a: &Card, b: &Card, positions: &[usize]) -> bool {
    positions.iter().all(|&p| a.get(p) == b.get(p))
}

/// Uniform symbol form in `MIN_SYMBOL..=MAX_SYMBOL`.
#[inline(always)]
pub fn random_symbol(rng: &mut impl Rng) -> u8 {
    rng.random_range(MIN_SYMBOL..=MAX_SYMBOL)
}

/// Uniform symbol form different from `current`.
///
/// `current` outside the symbol range leaves all four forms available.
#[inline(always)]
pub fn different_value(rng: &mut impl Rng, current: u8) -> u8 {
    if !(MIN_SYMBOL..=MAX_SYMBOL).contains(&current) {
        return random_symbol(rng);
    }
    let v = rng.random_range(MIN_SYMBOL..MAX_SYMBOL);
    if v >= current {
        v + 1
    } else {
        v
    }
}

/// `active` minus `excluded`, preserving order.
pub fn positions_excluding(active: &[usize], excluded: &[usize]) -> Vec<usize> {
    active
        .iter()
        .copied()
        .filter(|p| !excluded.contains(p))
        .collect()
}

/// True iff inactive slots are absent and active slots hold a valid form.
pub fn is_well_formed(card: &Card, active: &[usize]) -> bool {
    (0..NUM_POSITIONS).all(|p| {
        let v = card.get(p);
        if active.contains(&p) {
            (MIN_SYMBOL..=MAX_SYMBOL).contains(&v)
        } else {
            v == SYMBOL_ABSENT
        }
    })
}

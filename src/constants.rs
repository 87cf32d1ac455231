//! Card geometry, block sizes and session limits.
//!
//! A card is a 4-slot vector. Slot values:
//! - `0` = symbol absent (only on inactive positions of 3-symbol cards)
//! - `1..=4` = one of the four forms of that symbol
//!
//! Stage 1 uses slots {0,1,2}; stage 2 uses all four.

/// Number of symbol slots on every card.
pub const NUM_POSITIONS: usize = 4;

/// Number of option cards shown per trial (1 correct + 3 wrong).
pub const NUM_OPTIONS: usize = 4;

/// Number of wrong cards per trial.
pub const NUM_WRONG_CARDS: usize = NUM_OPTIONS - 1;

/// Value stored on an inactive slot.
pub const SYMBOL_ABSENT: u8 = 0;

/// Smallest symbol form.
pub const MIN_SYMBOL: u8 = 1;

/// Largest symbol form.
pub const MAX_SYMBOL: u8 = 4;

/// Active slots for 3-symbol cards (stage 1).
pub const STAGE_ONE_POSITIONS: [usize; 3] = [0, 1, 2];

/// Active slots for 4-symbol cards (stage 2).
pub const STAGE_TWO_POSITIONS: [usize; 4] = [0, 1, 2, 3];

/// Number of positions in a rule's feature pair.
pub const RULE_FEATURE_COUNT: usize = 2;

/// Trials generated per rule block.
pub const DEFAULT_TRIALS_PER_RULE: usize = 10;

/// Largest accepted `trials_per_rule`.
pub const MAX_TRIALS_PER_RULE: usize = 100;

/// Leading trials of every non-first rule that carry the transition card.
pub const DEFAULT_TRANSITION_TRIALS: usize = 3;

/// Counted trials after which a session ends.
pub const DEFAULT_MAX_COUNTED_TRIALS: usize = 60;

/// Largest accepted `max_counted_trials`.
pub const MAX_COUNTED_TRIALS_LIMIT: usize = 2000;

/// Consecutive correct answers that count as "rule found".
pub const DEFAULT_STREAK_TO_ADVANCE: usize = 3;

/// Number of rules in the standard schedule.
pub const STANDARD_RULE_COUNT: usize = 19;

/// Number of rules in the reduced schedule.
pub const REDUCED_RULE_COUNT: usize = 6;

/// Rules up to and including this number use 3-symbol cards.
pub const LAST_STAGE_ONE_RULE: u32 = 2;

/// Live sessions a server keeps before refusing new ones.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Default HTTP port for `wcst-server`.
pub const DEFAULT_PORT: u16 = 9000;

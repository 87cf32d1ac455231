//! # WCST: card sorting task engine
//!
//! Generates trial sets for a Wisconsin-style card sorting task, scores
//! answers and tracks the hidden sorting rule through a session.
//!
//! A participant sees a main card and four options. Exactly one option
//! matches the main card on the two positions of the active rule; the rule
//! changes without warning once the participant has found it (3 correct in a
//! row) or its block of trials runs out.
//!
//! ## Pipeline
//!
//! | Step | Module | Description |
//! |------|--------|-------------|
//! | 1 | [`card_generator`] | Exact-match card construction with pinned match/differ positions |
//! | 2 | [`rule_specs`] | Per-rule correct/wrong card table, transition card |
//! | 3 | [`trial_generator`] | Feature-pair assignment, trial assembly, option shuffle |
//! | 4 | [`scoring`] | `evaluate` and `is_perseverative` |
//! | 5 | [`session`] | Streak / rule-advance / error-classification state machine |
//!
//! ## Card representation
//!
//! A [`types::Card`] is `[u8; 4]`: slot value 0 = absent, 1..=4 = symbol
//! form. Rules 1-2 use 3-symbol cards (slots 0-2), later rules use all four.
//! A card's display code is its values concatenated (`[2,4,4,1]` -> `"2441"`).
//!
//! ## Schedules
//!
//! [`types::RuleSchedule::Standard`] runs 19 rules;
//! [`types::RuleSchedule::Reduced`] runs 6, with an easier correct card on
//! rules 5-6.

pub mod card_generator;
pub mod card_mechanics;
pub mod constants;
pub mod env_config;
pub mod error;
pub mod rule_specs;
pub mod scoring;
pub mod server;
pub mod session;
pub mod simulation;
pub mod trial_generator;
pub mod types;

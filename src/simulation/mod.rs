//! Simulated participants driving sessions.
//!
//! - [`participant`]: response strategies behind the [`Participant`] trait
//! - [`engine`]: drive sessions with a participant, in parallel across seeds

pub mod engine;
pub mod participant;

pub use engine::{simulate_batch, simulate_session, SessionSummary};
pub use participant::{HypothesisTester, Oracle, Participant, ParticipantKind, RandomResponder};

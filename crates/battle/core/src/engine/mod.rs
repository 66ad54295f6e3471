//! Turn scheduling and encounter-wide escalation.
//!
//! - [`ActionQueue`]: speed-derived gauge deciding who acts next
//! - [`EnrageState`]: time-pressure state machine raising foe power

mod enrage;
mod queue;

pub use enrage::{EnrageState, EnrageUpdate};
pub use queue::{ActionQueue, QueueEntry, QueueError};

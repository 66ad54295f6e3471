//! Damage and healing resolution.
//!
//! Both resolvers are pure functions of their inputs: the enrage percentage
//! is passed in explicitly and every random draw comes from the caller's RNG.

mod damage;
mod healing;

pub use damage::{DamageOutcome, apply_damage, mitigate};
pub use healing::{HealOutcome, apply_healing};

/// Floor for divisors and multiplicative stats in the resolvers.
pub(crate) const EPSILON: f64 = 1e-6;

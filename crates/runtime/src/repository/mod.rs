//! Repository layer for persistent roster data.
//!
//! Rosters are the only state shared between battles: the runtime loads one
//! before an encounter and saves it back only after a victory.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileRosterRepository;
pub use memory::InMemoryRosterRepository;
pub use traits::RosterRepository;

//! In-memory repository implementations for testing and development.

mod roster;

pub use roster::InMemoryRosterRepository;

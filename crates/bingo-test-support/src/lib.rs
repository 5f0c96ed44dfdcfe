//! Shared test mocks and utilities for the collaborative bingo board.

mod clock;
mod repository;
mod rng;

pub use clock::FixedClock;
pub use repository::{EmptySessionRepository, FailingSessionRepository, RecordingSessionRepository};
pub use rng::{MockRng, SequenceRng};

//! Collaborative bingo board — runtime wiring.
//!
//! Reads configuration from the environment, initialises tracing and builds
//! the [`state::AppState`] a presentation layer opens session peers from.

pub mod config;
pub mod error;
pub mod state;
pub mod telemetry;

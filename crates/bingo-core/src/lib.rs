//! Bingo Core — shared abstractions.
//!
//! This crate defines the traits and types the bingo board context and its
//! storage backends depend on. It contains no storage code.

pub mod clock;
pub mod command;
pub mod error;
pub mod identity;
pub mod notification;
pub mod repository;
pub mod rng;

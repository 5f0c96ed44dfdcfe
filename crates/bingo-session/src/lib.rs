//! Collaborative bingo board — session engine and synchronization.
//!
//! Players jointly propose resolutions onto a shared grid. Once the grid
//! fills it is shuffled into a bingo board with a free center space, and each
//! player checks off what they have completed. Every rule lives in
//! [`domain::engine`] as a pure transformation; [`application`] layers
//! persistence and change propagation on top.

pub mod application;
pub mod domain;

//! Domain layer: data model, grid rules, commands and the session engine.

pub mod canvas;
pub mod commands;
pub mod engine;
pub mod grid;
pub mod model;

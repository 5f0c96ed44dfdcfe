//! Application layer: persistence, read models, share links and the
//! per-observer session peer.

pub mod codec;
pub mod command_handlers;
pub mod peer;
pub mod query_handlers;
pub mod share;

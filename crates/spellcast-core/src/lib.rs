//! spellcast-core: Pure session types, text processing, and the drill state machine.
//!
//! No async runtime, no I/O, no platform dependencies.

pub mod script;
pub mod session;
pub mod text_prep;
pub mod types;
pub mod words;

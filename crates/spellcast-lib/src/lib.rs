//! spellcast-lib: Spelling drill engine.
//!
//! Session driver, speech announcer with a ranked voice chain, audio
//! playback, snapshot persistence, and HTTP API. Depends on spellcast-core
//! for the state machine and pure types.

pub mod announcer;
pub mod config;
pub mod playback;
pub mod server;
pub mod store;
pub mod trainer;
pub mod voice;

// Re-export spellcast-core for convenience
pub use spellcast_core;

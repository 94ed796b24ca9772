//! OBS Studio as the recording backend, over OBS WebSocket v5.

pub mod listener;
pub mod protocol;

pub use listener::{ListenerConfig, SessionListener};

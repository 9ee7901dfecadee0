//! WASM bindings for podcastr-playback
//!
//! Binds a `PlayerSession` to a browser `<audio>` element so the player can
//! run inside the web UI.

#[cfg(feature = "wasm")]
pub mod device;

#[cfg(feature = "wasm")]
pub mod player;

#[cfg(feature = "wasm")]
pub use device::HtmlAudioDevice;

#[cfg(feature = "wasm")]
pub use player::{PlayRequest, WasmPlayer};

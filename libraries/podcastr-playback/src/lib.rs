//! Podcastr - Player State & Transport Control
//!
//! Platform-agnostic podcast player core for Podcastr.
//!
//! This crate provides:
//! - Episode queue with a current selection
//! - Play/pause, next/previous, loop and shuffle transport commands
//! - Reconciliation of an audio device with the player state
//! - Translation of device events (started, paused, ended, ...) back into
//!   player commands, including end-of-track resolution
//! - Optimistic seek handling and `MM:SS` time labels
//!
//! # Architecture
//!
//! `podcastr-playback` never owns an audio output:
//! - `PlayerState` is pure state with transition rules
//! - `PlaybackSurface` drives anything implementing [`AudioDevice`]
//! - `PlayerSession` owns both and is the only writer
//!
//! Platform-specific code (browser `<audio>`, the terminal simulator)
//! implements [`AudioDevice`] and feeds [`DeviceEvent`]s back in.
//!
//! # Example: Selecting from a listing
//!
//! ```rust
//! use podcastr_playback::{Episode, PlayerCommand, PlayerSession, Queue, SimulatedDevice};
//! use url::Url;
//!
//! let episode = |title: &str| Episode {
//!     title: title.to_string(),
//!     members: "Diego e Richard".to_string(),
//!     thumbnail: Url::parse("https://cdn.example.com/cover.jpg").unwrap(),
//!     duration_seconds: 1800,
//!     source_url: Url::parse(&format!("https://cdn.example.com/{title}.m4a")).unwrap(),
//! };
//!
//! let queue = Queue::new(vec![episode("one"), episode("two"), episode("three")]);
//! let mut session = PlayerSession::new(SimulatedDevice::from_queue(&queue));
//!
//! session
//!     .dispatch(PlayerCommand::LoadFromQueue { queue: queue.clone(), index: 1 })
//!     .unwrap();
//! assert_eq!(session.state().current_index(), Some(1));
//! assert!(session.state().is_playing());
//!
//! // Clicking the same item of the same listing pauses it
//! session
//!     .dispatch(PlayerCommand::LoadFromQueue { queue, index: 1 })
//!     .unwrap();
//! assert!(!session.state().is_playing());
//! ```
//!
//! # Example: Driving a device
//!
//! ```rust
//! use podcastr_playback::{Episode, PlayerCommand, PlayerSession, SimulatedDevice};
//! use std::time::Duration;
//! use url::Url;
//!
//! let episode = Episode {
//!     title: "Short".to_string(),
//!     members: "Host".to_string(),
//!     thumbnail: Url::parse("https://cdn.example.com/cover.jpg").unwrap(),
//!     duration_seconds: 2,
//!     source_url: Url::parse("https://cdn.example.com/short.mp3").unwrap(),
//! };
//!
//! let mut device = SimulatedDevice::new();
//! device.set_source_duration(episode.source_url.clone(), 2);
//! let mut session = PlayerSession::new(device);
//! session.dispatch(PlayerCommand::LoadSingle(episode)).unwrap();
//!
//! // Run the device past the end of the episode
//! session.device_mut().advance(Duration::from_secs(3));
//! for event in session.device_mut().take_events() {
//!     session.handle_device_event(event);
//! }
//!
//! // Nothing follows a single episode, so the player clears itself
//! assert!(session.state().queue().is_empty());
//! assert!(!session.state().is_playing());
//! ```

mod device;
mod error;
mod events;
pub mod format;
mod session;
mod sim;
mod state;
pub mod surface;
mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use device::{AudioDevice, DeviceEvent, DeviceEventKind, LoadToken, MediaSnapshot};
pub use error::{PlayerError, Result};
pub use events::PlayerEvent;
pub use format::format_duration;
pub use session::{NowPlaying, PlayerSession};
pub use sim::SimulatedDevice;
pub use state::PlayerState;
pub use surface::{translate, PlaybackSurface, Progress, Reaction, SeekControl};
pub use types::{Episode, PlayerCommand, Queue, TransportControls};

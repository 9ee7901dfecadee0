//! Player Events
//!
//! Notifications for the UI layer. The session queues them while it applies
//! commands and device events; the UI drains them after each call.

use serde::{Deserialize, Serialize};

/// Events emitted by the player session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Play/pause or a mode flag changed
    StateChanged {
        is_playing: bool,
        is_looping: bool,
        is_shuffling: bool,
    },

    /// A different episode (or the same one, restarted) is now current
    EpisodeChanged {
        /// Index into the queue
        index: usize,
        /// Title of the new episode
        title: String,
    },

    /// Displayed time moved
    ProgressChanged {
        elapsed_seconds: u32,
        duration_seconds: u32,
    },

    /// Queue ran out or was dropped
    QueueCleared,

    /// A command was refused without touching state
    CommandRejected {
        /// Why it was refused
        reason: String,
    },
}

//! Playback surface - keeps an audio device in step with `PlayerState`
//!
//! The surface is the only thing that issues device commands. After every
//! state transition the session calls [`PlaybackSurface::reconcile`], which
//! diffs the state against what the device was last told and issues the
//! missing commands. Device events go the other way through [`translate`].

use crate::{
    device::{AudioDevice, DeviceEvent, DeviceEventKind, LoadToken},
    state::PlayerState,
    types::PlayerCommand,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What a device event asks for
#[derive(Debug, Clone)]
pub enum Reaction {
    /// Apply a state command
    Command(PlayerCommand),

    /// Display-only playhead update
    Elapsed(u32),

    /// Display-only duration update
    Duration(u32),

    /// Play the current episode again from the start
    Restart,
}

/// Map a device event to the reaction it calls for
///
/// Pure: reads the state, never changes it. End-of-track resolution lives
/// here because only at the end of a track is "is there anything after
/// this" the question being asked.
pub fn translate(state: &PlayerState, event: &DeviceEventKind) -> Reaction {
    match event {
        DeviceEventKind::Started => Reaction::Command(PlayerCommand::SetPlayingState(true)),
        DeviceEventKind::Paused | DeviceEventKind::Failed(_) => {
            Reaction::Command(PlayerCommand::SetPlayingState(false))
        }
        DeviceEventKind::TimeUpdated(seconds) => Reaction::Elapsed(*seconds),
        DeviceEventKind::MetadataLoaded { duration_seconds } => {
            Reaction::Duration(*duration_seconds)
        }
        DeviceEventKind::Ended => resolve_end_of_track(state),
    }
}

fn resolve_end_of_track(state: &PlayerState) -> Reaction {
    if state.is_looping() && state.current_episode().is_some() {
        Reaction::Restart
    } else if state.has_next() {
        Reaction::Command(PlayerCommand::Next)
    } else {
        Reaction::Command(PlayerCommand::Clear)
    }
}

/// Elapsed and total time of the current episode, display only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub elapsed_seconds: u32,
    pub duration_seconds: u32,
}

/// Values for the seek slider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeekControl {
    pub max: u32,
    pub value: u32,
}

/// What a reconcile pass changed on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reconciled {
    pub episode_changed: bool,
    pub playing_changed: bool,
    pub looping_changed: bool,
}

impl Reconciled {
    pub fn any(&self) -> bool {
        self.episode_changed || self.playing_changed || self.looping_changed
    }
}

// What the device was last told
#[derive(Debug, Clone, Copy, Default)]
struct Observed {
    selection: u64,
    is_playing: bool,
    is_looping: bool,
}

/// Binds `PlayerState` to an audio device and a seek control
pub struct PlaybackSurface<D: AudioDevice> {
    device: D,
    token: LoadToken,
    observed: Observed,
    progress: Progress,
    // Whether `progress.duration_seconds` came from the device
    duration_reported: bool,
}

impl<D: AudioDevice> PlaybackSurface<D> {
    /// Wrap a device, matching a freshly created `PlayerState`
    pub fn new(device: D) -> Self {
        Self {
            device,
            token: LoadToken::default(),
            observed: Observed::default(),
            progress: Progress::default(),
            duration_reported: false,
        }
    }

    /// Bring the device in line with `state`
    pub fn reconcile(&mut self, state: &PlayerState) -> Reconciled {
        let mut change = Reconciled::default();

        if state.selection() != self.observed.selection {
            self.observed.selection = state.selection();
            change.episode_changed = true;
            self.token = self.token.next();
            self.duration_reported = false;

            match state.current_episode() {
                Some(episode) => {
                    info!(
                        title = %episode.title,
                        index = ?state.current_index(),
                        token = self.token.id(),
                        "Loading episode"
                    );

                    // Reset the display before the device says anything so
                    // the previous episode's time never shows.
                    self.progress = Progress {
                        elapsed_seconds: 0,
                        duration_seconds: episode.duration_seconds,
                    };

                    self.device.load(self.token, &episode.source_url);
                    self.device.seek(0);
                    self.device.set_loop(state.is_looping());
                    self.observed.is_looping = state.is_looping();

                    if state.is_playing() {
                        self.device.play();
                    }
                    self.observed.is_playing = state.is_playing();
                }
                None => {
                    info!("Nothing selected, unloading device");
                    self.progress = Progress::default();
                    self.device.stop();
                    self.observed.is_playing = false;
                }
            }
        }

        if state.is_playing() != self.observed.is_playing {
            self.observed.is_playing = state.is_playing();
            change.playing_changed = true;

            if state.is_playing() {
                self.device.play();
            } else {
                self.device.pause();
            }
        }

        if state.is_looping() != self.observed.is_looping {
            self.observed.is_looping = state.is_looping();
            change.looping_changed = true;
            self.device.set_loop(state.is_looping());
        }

        change
    }

    /// Whether an event belongs to the currently loaded episode
    pub fn accepts(&self, event: &DeviceEvent) -> bool {
        if event.token == self.token {
            true
        } else {
            debug!(
                event_token = event.token.id(),
                current_token = self.token.id(),
                "Dropping stale device event"
            );
            false
        }
    }

    /// Record a device playhead report, clamped to the known duration
    pub fn set_elapsed(&mut self, seconds: u32) {
        self.progress.elapsed_seconds = seconds.min(self.progress.duration_seconds);
    }

    /// Record the device-reported duration
    pub fn set_duration(&mut self, seconds: u32) {
        self.duration_reported = true;
        self.progress.duration_seconds = seconds;
        self.progress.elapsed_seconds = self.progress.elapsed_seconds.min(seconds);
    }

    /// Play the current episode again from zero
    pub fn restart(&mut self, state: &PlayerState) {
        if state.current_episode().is_none() {
            return;
        }

        self.device.seek(0);
        self.progress.elapsed_seconds = 0;
        if state.is_playing() {
            self.device.play();
        }
    }

    /// Move the playhead from the seek control
    ///
    /// The displayed time jumps immediately rather than waiting for the
    /// device to confirm; the next `TimeUpdated` reconciles any difference.
    /// Only a device-reported duration limits the device seek; the displayed
    /// time stays within the current duration. Returns the position sent to
    /// the device, or `None` with nothing selected.
    pub fn seek_to(&mut self, state: &PlayerState, amount: u32) -> Option<u32> {
        state.current_episode()?;

        let position = if self.duration_reported {
            amount.min(self.progress.duration_seconds)
        } else {
            amount
        };
        self.device.seek(position);

        self.progress.elapsed_seconds = position.min(self.progress.duration_seconds);
        Some(position)
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn seek_control(&self) -> SeekControl {
        SeekControl {
            max: self.progress.duration_seconds,
            value: self.progress.elapsed_seconds,
        }
    }

    /// Token of the most recent load
    pub fn token(&self) -> LoadToken {
        self.token
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

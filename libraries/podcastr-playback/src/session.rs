//! Player session - the single owner of player state
//!
//! A session owns one `PlayerState` and the surface that mirrors it onto a
//! device. UI actions go through [`PlayerSession::dispatch`], device events
//! through [`PlayerSession::handle_device_event`]. Both run to completion,
//! reconcile the device and queue [`PlayerEvent`]s for the UI.

use crate::{
    device::{AudioDevice, DeviceEvent, DeviceEventKind},
    error::Result,
    events::PlayerEvent,
    format::format_duration,
    state::PlayerState,
    surface::{translate, PlaybackSurface, Progress, Reaction, SeekControl},
    types::{Episode, PlayerCommand, TransportControls},
};
use rand::{thread_rng, Rng};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Snapshot of the current episode for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NowPlaying {
    pub index: usize,
    pub episode: Episode,
    pub elapsed: String,
    pub duration: String,
    pub is_playing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Flags {
    is_playing: bool,
    is_looping: bool,
    is_shuffling: bool,
}

impl Flags {
    fn of(state: &PlayerState) -> Self {
        Self {
            is_playing: state.is_playing(),
            is_looping: state.is_looping(),
            is_shuffling: state.is_shuffling(),
        }
    }
}

/// Player state plus the device it drives
pub struct PlayerSession<D: AudioDevice> {
    state: PlayerState,
    surface: PlaybackSurface<D>,

    // Event queue for UI synchronization
    pending_events: Vec<PlayerEvent>,
}

impl<D: AudioDevice> PlayerSession<D> {
    /// Start an empty session on `device`
    pub fn new(device: D) -> Self {
        Self {
            state: PlayerState::new(),
            surface: PlaybackSurface::new(device),
            pending_events: Vec::new(),
        }
    }

    // ===== Inputs =====

    /// Apply a UI command
    pub fn dispatch(&mut self, command: PlayerCommand) -> Result<()> {
        self.dispatch_with(command, &mut thread_rng())
    }

    /// Apply a UI command with an explicit RNG for shuffle draws
    pub fn dispatch_with<R: Rng>(&mut self, command: PlayerCommand, rng: &mut R) -> Result<()> {
        // Turning shuffle off is always allowed
        if matches!(command, PlayerCommand::ToggleShuffle)
            && !self.state.is_shuffling()
            && !self.state.can_shuffle()
        {
            debug!(
                queue_len = self.state.queue().len(),
                "Shuffle needs more than one episode"
            );
            self.pending_events.push(PlayerEvent::CommandRejected {
                reason: "shuffle needs more than one episode".to_string(),
            });
            return Ok(());
        }

        let before = Flags::of(&self.state);
        if let Err(err) = self.state.apply_with(command, rng) {
            debug!(error = %err, "Command rejected");
            self.pending_events.push(PlayerEvent::CommandRejected {
                reason: err.to_string(),
            });
            return Err(err);
        }
        self.after_transition(before);
        Ok(())
    }

    /// Feed one device event through translation
    pub fn handle_device_event(&mut self, event: DeviceEvent) {
        self.handle_device_event_with(event, &mut thread_rng());
    }

    /// Feed one device event with an explicit RNG for shuffle draws
    pub fn handle_device_event_with<R: Rng>(&mut self, event: DeviceEvent, rng: &mut R) {
        if !self.surface.accepts(&event) {
            return;
        }

        if let DeviceEventKind::Failed(reason) = &event.kind {
            warn!(%reason, "Device refused playback");
        }

        match translate(&self.state, &event.kind) {
            Reaction::Command(command) => {
                if matches!(command, PlayerCommand::Clear) {
                    info!("Queue finished, clearing player");
                }

                let before = Flags::of(&self.state);
                // Translated commands carry no index
                if let Err(err) = self.state.apply_with(command, rng) {
                    warn!(error = %err, "Device event produced an invalid command");
                    return;
                }
                self.after_transition(before);
            }
            Reaction::Elapsed(seconds) => {
                self.surface.set_elapsed(seconds);
                self.emit_progress();
            }
            Reaction::Duration(seconds) => {
                self.surface.set_duration(seconds);
                self.emit_progress();
            }
            Reaction::Restart => {
                debug!("Looping current episode");
                self.surface.restart(&self.state);
                self.emit_episode_changed();
                self.emit_progress();
            }
        }
    }

    /// Seek from the slider
    ///
    /// Returns the position used, or `None` when nothing is selected.
    pub fn seek_to(&mut self, amount: u32) -> Option<u32> {
        let position = self.surface.seek_to(&self.state, amount)?;
        self.emit_progress();
        Some(position)
    }

    fn after_transition(&mut self, before: Flags) {
        let change = self.surface.reconcile(&self.state);

        if change.episode_changed {
            self.emit_episode_changed();
            self.emit_progress();
        }

        let after = Flags::of(&self.state);
        if after != before {
            self.pending_events.push(PlayerEvent::StateChanged {
                is_playing: after.is_playing,
                is_looping: after.is_looping,
                is_shuffling: after.is_shuffling,
            });
        }
    }

    // ===== Internal Event Emitters =====

    fn emit_episode_changed(&mut self) {
        let event = match (self.state.current_index(), self.state.current_episode()) {
            (Some(index), Some(episode)) => PlayerEvent::EpisodeChanged {
                index,
                title: episode.title.clone(),
            },
            _ => PlayerEvent::QueueCleared,
        };
        self.pending_events.push(event);
    }

    fn emit_progress(&mut self) {
        let progress = self.surface.progress();
        self.pending_events.push(PlayerEvent::ProgressChanged {
            elapsed_seconds: progress.elapsed_seconds,
            duration_seconds: progress.duration_seconds,
        });
    }

    // ===== Readers =====

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn progress(&self) -> Progress {
        self.surface.progress()
    }

    pub fn seek_control(&self) -> SeekControl {
        self.surface.seek_control()
    }

    pub fn controls(&self) -> TransportControls {
        self.state.controls()
    }

    /// Current episode with formatted times, `None` when nothing is selected
    pub fn now_playing(&self) -> Option<NowPlaying> {
        let index = self.state.current_index()?;
        let episode = self.state.current_episode()?;
        let progress = self.surface.progress();

        Some(NowPlaying {
            index,
            episode: episode.clone(),
            elapsed: format_duration(progress.elapsed_seconds),
            duration: format_duration(progress.duration_seconds),
            is_playing: self.state.is_playing(),
        })
    }

    pub fn surface(&self) -> &PlaybackSurface<D> {
        &self.surface
    }

    pub fn device(&self) -> &D {
        self.surface.device()
    }

    pub fn device_mut(&mut self) -> &mut D {
        self.surface.device_mut()
    }

    /// Take every queued UI event
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }
}

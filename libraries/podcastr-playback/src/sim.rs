//! Simulated audio device
//!
//! A clock-driven device with no audio output. The host advances it with
//! [`SimulatedDevice::advance`] and collects what it reported with
//! [`SimulatedDevice::take_events`]. Used by the terminal player and by
//! tests.

use crate::{
    device::{AudioDevice, DeviceEvent, DeviceEventKind, LoadToken},
    types::Queue,
};
use std::collections::HashMap;
use std::time::Duration;
use tracing::trace;
use url::Url;

#[derive(Debug, Clone)]
struct Loaded {
    token: LoadToken,
    url: Url,
    duration: Duration,
    position: Duration,
}

/// In-memory audio device
#[derive(Debug, Default)]
pub struct SimulatedDevice {
    durations: HashMap<Url, u32>,
    loaded: Option<Loaded>,
    is_playing: bool,
    is_looping: bool,
    refuse_playback: bool,
    outbox: Vec<DeviceEvent>,
}

impl SimulatedDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Know every episode of `queue`, using its catalog durations
    pub fn from_queue(queue: &Queue) -> Self {
        let mut device = Self::new();
        device.register_queue(queue);
        device
    }

    pub fn register_queue(&mut self, queue: &Queue) {
        for episode in queue {
            self.durations
                .insert(episode.source_url.clone(), episode.duration_seconds);
        }
    }

    /// Set the real length of a source, which may differ from the catalog
    pub fn set_source_duration(&mut self, url: Url, seconds: u32) {
        self.durations.insert(url, seconds);
    }

    /// Refuse every `play`, like a browser autoplay policy would
    pub fn set_refuse_playback(&mut self, refuse: bool) {
        self.refuse_playback = refuse;
    }

    /// Let simulated time pass
    pub fn advance(&mut self, elapsed: Duration) {
        if !self.is_playing {
            return;
        }
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };

        let before = loaded.position.as_secs();
        loaded.position += elapsed;

        if loaded.position >= loaded.duration {
            if self.is_looping && !loaded.duration.is_zero() {
                let overshoot = loaded.position.as_nanos() % loaded.duration.as_nanos();
                loaded.position = Duration::from_nanos(overshoot as u64);
                let token = loaded.token;
                let seconds = loaded.position.as_secs() as u32;
                self.emit(token, DeviceEventKind::TimeUpdated(seconds));
            } else {
                loaded.position = loaded.duration;
                let token = loaded.token;
                let seconds = loaded.duration.as_secs() as u32;
                self.is_playing = false;
                self.emit(token, DeviceEventKind::TimeUpdated(seconds));
                self.emit(token, DeviceEventKind::Ended);
            }
        } else if loaded.position.as_secs() != before {
            let token = loaded.token;
            let seconds = loaded.position.as_secs() as u32;
            self.emit(token, DeviceEventKind::TimeUpdated(seconds));
        }
    }

    /// Take every event reported since the last call
    pub fn take_events(&mut self) -> Vec<DeviceEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_looping(&self) -> bool {
        self.is_looping
    }

    pub fn loaded_url(&self) -> Option<&Url> {
        self.loaded.as_ref().map(|loaded| &loaded.url)
    }

    pub fn position_seconds(&self) -> u32 {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.position.as_secs() as u32)
            .unwrap_or(0)
    }

    fn emit(&mut self, token: LoadToken, kind: DeviceEventKind) {
        trace!(token = token.id(), ?kind, "Simulated device event");
        self.outbox.push(DeviceEvent::new(token, kind));
    }
}

impl AudioDevice for SimulatedDevice {
    fn load(&mut self, token: LoadToken, url: &Url) {
        self.is_playing = false;

        match self.durations.get(url) {
            Some(&seconds) => {
                self.loaded = Some(Loaded {
                    token,
                    url: url.clone(),
                    duration: Duration::from_secs(u64::from(seconds)),
                    position: Duration::ZERO,
                });
                self.emit(
                    token,
                    DeviceEventKind::MetadataLoaded {
                        duration_seconds: seconds,
                    },
                );
            }
            None => {
                self.loaded = None;
                self.emit(token, DeviceEventKind::Failed(format!("unknown source {url}")));
            }
        }
    }

    fn play(&mut self) {
        let Some(token) = self.loaded.as_ref().map(|loaded| loaded.token) else {
            return;
        };

        if self.refuse_playback {
            self.emit(token, DeviceEventKind::Failed("playback refused".to_string()));
        } else if !self.is_playing {
            self.is_playing = true;
            self.emit(token, DeviceEventKind::Started);
        }
    }

    fn pause(&mut self) {
        let Some(token) = self.loaded.as_ref().map(|loaded| loaded.token) else {
            return;
        };

        if self.is_playing {
            self.is_playing = false;
            self.emit(token, DeviceEventKind::Paused);
        }
    }

    fn seek(&mut self, seconds: u32) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.position = Duration::from_secs(u64::from(seconds)).min(loaded.duration);
        }
    }

    fn set_loop(&mut self, looping: bool) {
        self.is_looping = looping;
    }

    fn stop(&mut self) {
        self.loaded = None;
        self.is_playing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(name: &str) -> Url {
        Url::parse(&format!("https://cdn.example.com/{name}.mp3")).unwrap()
    }

    fn kinds(device: &mut SimulatedDevice) -> Vec<DeviceEventKind> {
        device.take_events().into_iter().map(|event| event.kind).collect()
    }

    #[test]
    fn load_reports_metadata() {
        let mut device = SimulatedDevice::new();
        device.set_source_duration(url("a"), 3);

        device.load(LoadToken::new(1), &url("a"));
        let events = device.take_events();
        assert_eq!(
            events,
            vec![DeviceEvent::new(
                LoadToken::new(1),
                DeviceEventKind::MetadataLoaded { duration_seconds: 3 }
            )]
        );
    }

    #[test]
    fn unknown_source_fails() {
        let mut device = SimulatedDevice::new();
        device.load(LoadToken::new(1), &url("missing"));
        assert!(matches!(kinds(&mut device)[..], [DeviceEventKind::Failed(_)]));
        assert!(device.loaded_url().is_none());
    }

    #[test]
    fn plays_to_the_end() {
        let mut device = SimulatedDevice::new();
        device.set_source_duration(url("a"), 2);
        device.load(LoadToken::new(1), &url("a"));
        device.play();
        device.take_events();

        device.advance(Duration::from_secs(1));
        assert_eq!(kinds(&mut device), vec![DeviceEventKind::TimeUpdated(1)]);

        device.advance(Duration::from_secs(5));
        assert_eq!(
            kinds(&mut device),
            vec![DeviceEventKind::TimeUpdated(2), DeviceEventKind::Ended]
        );
        assert!(!device.is_playing());
    }

    #[test]
    fn native_loop_wraps_without_ending() {
        let mut device = SimulatedDevice::new();
        device.set_source_duration(url("a"), 2);
        device.load(LoadToken::new(1), &url("a"));
        device.set_loop(true);
        device.play();
        device.take_events();

        device.advance(Duration::from_secs(3));
        assert_eq!(kinds(&mut device), vec![DeviceEventKind::TimeUpdated(1)]);
        assert!(device.is_playing());
    }

    #[test]
    fn refused_playback_reports_failure() {
        let mut device = SimulatedDevice::new();
        device.set_source_duration(url("a"), 2);
        device.set_refuse_playback(true);
        device.load(LoadToken::new(1), &url("a"));
        device.take_events();

        device.play();
        assert!(matches!(kinds(&mut device)[..], [DeviceEventKind::Failed(_)]));
        assert!(!device.is_playing());
    }

    #[test]
    fn paused_device_does_not_advance() {
        let mut device = SimulatedDevice::new();
        device.set_source_duration(url("a"), 10);
        device.load(LoadToken::new(1), &url("a"));

        device.advance(Duration::from_secs(4));
        assert_eq!(device.position_seconds(), 0);
    }
}

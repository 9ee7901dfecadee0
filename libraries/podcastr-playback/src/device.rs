//! Audio device abstraction
//!
//! Platform code implements [`AudioDevice`] and feeds the events it observes
//! back into the session as [`DeviceEvent`]s.

use serde::{Deserialize, Serialize};
use url::Url;

/// Identity of one `load` request
///
/// Every event carries the token of the load it belongs to, so events from a
/// superseded episode can be told apart and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LoadToken(u64);

impl LoadToken {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Audio output the surface drives
///
/// Commands are fire-and-forget. Outcomes (did playback actually start,
/// where is the playhead) come back as [`DeviceEvent`]s.
///
/// A natural end of track must be reported as `Ended` alone, without a
/// `Paused` before it.
pub trait AudioDevice {
    /// Abort whatever is loaded and start loading `url`
    fn load(&mut self, token: LoadToken, url: &Url);

    /// Start or resume output
    fn play(&mut self);

    /// Pause output, keeping the position
    fn pause(&mut self);

    /// Move the playhead
    fn seek(&mut self, seconds: u32);

    /// Repeat the loaded source natively when it ends
    fn set_loop(&mut self, looping: bool);

    /// Unload the current source
    fn stop(&mut self);
}

/// Something the device reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeviceEventKind {
    /// Output actually started
    Started,

    /// Output paused (by us or by the platform)
    Paused,

    /// Periodic playhead report
    TimeUpdated(u32),

    /// Source played to its natural end
    Ended,

    /// Source metadata is available
    MetadataLoaded { duration_seconds: u32 },

    /// Playback could not start (autoplay policy, decode error, ...)
    Failed(String),
}

/// A device event tagged with the load it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceEvent {
    pub token: LoadToken,
    pub kind: DeviceEventKind,
}

impl DeviceEvent {
    pub fn new(token: LoadToken, kind: DeviceEventKind) -> Self {
        Self { token, kind }
    }
}

/// Media element state sampled when a platform event is handled
///
/// Browsers queue media events, so a report can arrive after the source or
/// play state it describes was replaced. Devices that cannot tag events at
/// the source use this to decide whether a report belongs to the latest load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaSnapshot {
    /// The element is paused right now
    pub paused: bool,

    /// The element is playing the source of the latest load
    pub source_matches: bool,
}

impl MediaSnapshot {
    /// Whether an event handled in this state belongs to the latest load
    ///
    /// Play and pause reports must agree with the current paused flag;
    /// everything else must come from the current source.
    pub fn is_current(&self, kind: &DeviceEventKind) -> bool {
        match kind {
            DeviceEventKind::Started => !self.paused,
            DeviceEventKind::Paused => self.paused,
            DeviceEventKind::TimeUpdated(_)
            | DeviceEventKind::Ended
            | DeviceEventKind::MetadataLoaded { .. }
            | DeviceEventKind::Failed(_) => self.source_matches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_advance() {
        let token = LoadToken::default();
        assert_eq!(token.next().id(), 1);
        assert_ne!(token.next(), token);
    }

    #[test]
    fn pause_queued_by_source_switch_is_not_current() {
        // Switching sources while playing queues a `pause` for the old
        // source; by the time it is handled the new source is playing.
        let playing_new_source = MediaSnapshot {
            paused: false,
            source_matches: true,
        };
        assert!(!playing_new_source.is_current(&DeviceEventKind::Paused));
        assert!(playing_new_source.is_current(&DeviceEventKind::Started));
    }

    #[test]
    fn reports_from_old_source_are_not_current() {
        let switching = MediaSnapshot {
            paused: false,
            source_matches: false,
        };
        assert!(!switching.is_current(&DeviceEventKind::TimeUpdated(42)));
        assert!(!switching.is_current(&DeviceEventKind::Ended));
        assert!(!switching.is_current(&DeviceEventKind::MetadataLoaded {
            duration_seconds: 60
        }));
        assert!(!switching.is_current(&DeviceEventKind::Failed("AbortError".to_string())));
    }

    #[test]
    fn reports_matching_the_element_are_current() {
        let paused = MediaSnapshot {
            paused: true,
            source_matches: true,
        };
        assert!(paused.is_current(&DeviceEventKind::Paused));
        assert!(!paused.is_current(&DeviceEventKind::Started));
        assert!(paused.is_current(&DeviceEventKind::Ended));
        assert!(paused.is_current(&DeviceEventKind::TimeUpdated(3)));
    }
}

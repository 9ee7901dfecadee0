//! `AudioDevice` over an `HtmlAudioElement`

use crate::device::{AudioDevice, DeviceEvent, DeviceEventKind, LoadToken, MediaSnapshot};
use js_sys::Promise;
use url::Url;
use web_sys::HtmlAudioElement;

/// Browser audio element as a player device
///
/// The element's events carry no load identity and are delivered from a
/// task queue, so a report can describe a source that was already replaced.
/// [`stamp`](Self::stamp) checks the element's state when the report is
/// handled and tags stale ones with the token of the previous load.
pub struct HtmlAudioDevice {
    element: HtmlAudioElement,
    token: LoadToken,
    retired: LoadToken,
    source: Option<Url>,
    pending_play: Option<(LoadToken, Promise)>,
}

impl HtmlAudioDevice {
    pub fn new(element: HtmlAudioElement) -> Self {
        Self {
            element,
            token: LoadToken::default(),
            retired: LoadToken::default(),
            source: None,
            pending_play: None,
        }
    }

    pub fn element(&self) -> &HtmlAudioElement {
        &self.element
    }

    /// Token of the source currently assigned to the element
    pub fn token(&self) -> LoadToken {
        self.token
    }

    /// The promise of the last `play()` with the load it was issued for
    ///
    /// The promise rejects when the browser refuses to start (autoplay
    /// policy) or when a newer load aborts it; report the rejection with
    /// the returned token so the second case is dropped as stale.
    pub fn take_play_promise(&mut self) -> Option<(LoadToken, Promise)> {
        self.pending_play.take()
    }

    /// Tag an element event with the load it belongs to
    pub fn stamp(&self, kind: DeviceEventKind) -> DeviceEvent {
        let token = if self.snapshot().is_current(&kind) {
            self.token
        } else {
            self.retired
        };
        DeviceEvent::new(token, kind)
    }

    fn snapshot(&self) -> MediaSnapshot {
        let current_src = self.element.current_src();
        MediaSnapshot {
            paused: self.element.paused(),
            source_matches: self
                .source
                .as_ref()
                .is_some_and(|url| url.as_str() == current_src),
        }
    }

    fn retire(&mut self) {
        self.retired = self.token;
        self.pending_play = None;
    }
}

impl AudioDevice for HtmlAudioDevice {
    fn load(&mut self, token: LoadToken, url: &Url) {
        self.retire();
        self.token = token;
        self.source = Some(url.clone());
        self.element.set_src(url.as_str());
    }

    fn play(&mut self) {
        self.pending_play = self.element.play().ok().map(|promise| (self.token, promise));
    }

    fn pause(&mut self) {
        self.element.pause().ok();
    }

    fn seek(&mut self, seconds: u32) {
        self.element.set_current_time(f64::from(seconds));
    }

    fn set_loop(&mut self, looping: bool) {
        self.element.set_loop(looping);
    }

    fn stop(&mut self) {
        self.retire();
        self.source = None;
        self.element.pause().ok();
        self.element.remove_attribute("src").ok();
        self.element.load();
    }
}

//! WASM-compatible player wrapper

use super::device::HtmlAudioDevice;
use crate::{
    device::{DeviceEvent, DeviceEventKind, LoadToken},
    format::format_duration,
    Episode, PlayerCommand, PlayerError, PlayerSession, Queue,
};
use js_sys::{Function, Promise};
use std::collections::HashMap;
use wasm_bindgen::prelude::*;
use web_sys::HtmlAudioElement;

/// A `play()` issued to the element, with the load it belongs to
///
/// ```js
/// const request = player.takePlayPromise();
/// request?.promise.catch((e) => player.playRejected(request.token, e.name));
/// ```
#[wasm_bindgen]
pub struct PlayRequest {
    token: LoadToken,
    promise: Promise,
}

#[wasm_bindgen]
impl PlayRequest {
    #[wasm_bindgen(getter)]
    pub fn token(&self) -> f64 {
        self.token.id() as f64
    }

    #[wasm_bindgen(getter)]
    pub fn promise(&self) -> Promise {
        self.promise.clone()
    }
}

/// Player bound to an `<audio>` element
///
/// JS wires the element's `play`, `pause`, `timeupdate`, `ended`,
/// `loadedmetadata` and `error` events to the `device*` methods.
#[wasm_bindgen]
pub struct WasmPlayer {
    inner: PlayerSession<HtmlAudioDevice>,

    // Queues registered by the listing screens, keyed by listing id, so
    // re-selecting from the same listing keeps its identity
    queues: HashMap<String, Queue>,

    on_change: Option<Function>,
}

#[wasm_bindgen]
impl WasmPlayer {
    #[wasm_bindgen(constructor)]
    pub fn new(element: HtmlAudioElement) -> Self {
        console_error_panic_hook::set_once();

        Self {
            inner: PlayerSession::new(HtmlAudioDevice::new(element)),
            queues: HashMap::new(),
            on_change: None,
        }
    }

    // ===== Queue Loading =====

    /// Play one episode on its own
    #[wasm_bindgen(js_name = loadSingle)]
    pub fn load_single(&mut self, episode: JsValue) -> Result<(), JsValue> {
        let episode: Episode = serde_wasm_bindgen::from_value(episode)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse episode: {}", e)))?;
        self.dispatch(PlayerCommand::LoadSingle(episode))
    }

    /// Register (or replace) the episode list of a listing screen
    #[wasm_bindgen(js_name = registerQueue)]
    pub fn register_queue(&mut self, listing_id: String, episodes: JsValue) -> Result<(), JsValue> {
        let episodes: Vec<Episode> = serde_wasm_bindgen::from_value(episodes)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse episodes: {}", e)))?;
        self.queues.insert(listing_id, Queue::new(episodes));
        Ok(())
    }

    /// Select `index` of a registered listing
    #[wasm_bindgen(js_name = loadFromQueue)]
    pub fn load_from_queue(&mut self, listing_id: &str, index: usize) -> Result<(), JsValue> {
        let queue = self
            .queues
            .get(listing_id)
            .cloned()
            .ok_or_else(|| JsValue::from_str(&format!("Unknown listing: {}", listing_id)))?;
        self.dispatch(PlayerCommand::LoadFromQueue { queue, index })
    }

    // ===== Transport =====

    #[wasm_bindgen(js_name = togglePlay)]
    pub fn toggle_play(&mut self) {
        self.dispatch(PlayerCommand::TogglePlay).ok();
    }

    #[wasm_bindgen(js_name = toggleLoop)]
    pub fn toggle_loop(&mut self) {
        self.dispatch(PlayerCommand::ToggleLoop).ok();
    }

    #[wasm_bindgen(js_name = toggleShuffle)]
    pub fn toggle_shuffle(&mut self) {
        self.dispatch(PlayerCommand::ToggleShuffle).ok();
    }

    pub fn next(&mut self) {
        self.dispatch(PlayerCommand::Next).ok();
    }

    pub fn previous(&mut self) {
        self.dispatch(PlayerCommand::Previous).ok();
    }

    pub fn clear(&mut self) {
        self.dispatch(PlayerCommand::Clear).ok();
    }

    /// Seek from the slider, in seconds
    #[wasm_bindgen(js_name = seekTo)]
    pub fn seek_to(&mut self, amount: f64) {
        self.inner.seek_to(amount.max(0.0) as u32);
        self.emit_change();
    }

    /// The last device `play()`, for autoplay rejection handling
    #[wasm_bindgen(js_name = takePlayPromise)]
    pub fn take_play_promise(&mut self) -> Option<PlayRequest> {
        self.inner
            .device_mut()
            .take_play_promise()
            .map(|(token, promise)| PlayRequest { token, promise })
    }

    /// A `play()` promise rejected; `token` comes from its `PlayRequest`
    #[wasm_bindgen(js_name = playRejected)]
    pub fn play_rejected(&mut self, token: f64, reason: String) {
        let token = LoadToken::new(token.max(0.0) as u64);
        self.inner
            .handle_device_event(DeviceEvent::new(token, DeviceEventKind::Failed(reason)));
        self.emit_change();
    }

    // ===== Device Events =====

    #[wasm_bindgen(js_name = deviceStarted)]
    pub fn device_started(&mut self) {
        self.device_event(DeviceEventKind::Started);
    }

    #[wasm_bindgen(js_name = devicePaused)]
    pub fn device_paused(&mut self) {
        // The element pauses itself right before `ended`; that is not a
        // user pause and must not race the end-of-track resolution.
        if self.inner.device().element().ended() {
            return;
        }
        self.device_event(DeviceEventKind::Paused);
    }

    #[wasm_bindgen(js_name = deviceTimeUpdated)]
    pub fn device_time_updated(&mut self) {
        let seconds = self.inner.device().element().current_time();
        self.device_event(DeviceEventKind::TimeUpdated(seconds.max(0.0).floor() as u32));
    }

    #[wasm_bindgen(js_name = deviceEnded)]
    pub fn device_ended(&mut self) {
        self.device_event(DeviceEventKind::Ended);
    }

    #[wasm_bindgen(js_name = deviceMetadataLoaded)]
    pub fn device_metadata_loaded(&mut self) {
        let duration = self.inner.device().element().duration();
        if duration.is_finite() {
            self.device_event(DeviceEventKind::MetadataLoaded {
                duration_seconds: duration.max(0.0).floor() as u32,
            });
        }
    }

    #[wasm_bindgen(js_name = deviceFailed)]
    pub fn device_failed(&mut self, reason: String) {
        self.device_event(DeviceEventKind::Failed(reason));
    }

    // ===== State Queries =====

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.inner.state().is_playing()
    }

    #[wasm_bindgen(js_name = isLooping)]
    pub fn is_looping(&self) -> bool {
        self.inner.state().is_looping()
    }

    #[wasm_bindgen(js_name = isShuffling)]
    pub fn is_shuffling(&self) -> bool {
        self.inner.state().is_shuffling()
    }

    #[wasm_bindgen(js_name = currentIndex)]
    pub fn current_index(&self) -> Option<u32> {
        self.inner.state().current_index().map(|index| index as u32)
    }

    /// Current episode, or `null`
    #[wasm_bindgen(js_name = currentEpisode)]
    pub fn current_episode(&self) -> JsValue {
        self.inner
            .state()
            .current_episode()
            .and_then(|episode| serde_wasm_bindgen::to_value(episode).ok())
            .unwrap_or(JsValue::NULL)
    }

    /// `{ max, value }` for the seek slider
    #[wasm_bindgen(js_name = seekControl)]
    pub fn seek_control(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.seek_control()).unwrap_or(JsValue::NULL)
    }

    /// Which transport buttons are enabled
    pub fn controls(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.controls()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = elapsedLabel)]
    pub fn elapsed_label(&self) -> String {
        format_duration(self.inner.progress().elapsed_seconds)
    }

    #[wasm_bindgen(js_name = durationLabel)]
    pub fn duration_label(&self) -> String {
        format_duration(self.inner.progress().duration_seconds)
    }

    // ===== Event Listeners =====

    /// Register a callback receiving the array of player events after each
    /// change
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, callback: Function) {
        self.on_change = Some(callback);
    }

    // ===== Internal =====

    fn dispatch(&mut self, command: PlayerCommand) -> Result<(), JsValue> {
        let result = self.inner.dispatch(command).map_err(to_js_error);
        self.emit_change();
        result
    }

    fn device_event(&mut self, kind: DeviceEventKind) {
        let event = self.inner.device().stamp(kind);
        self.inner.handle_device_event(event);
        self.emit_change();
    }

    fn emit_change(&mut self) {
        let events = self.inner.drain_events();
        if events.is_empty() {
            return;
        }

        if let Some(ref cb) = self.on_change {
            if let Ok(js_events) = serde_wasm_bindgen::to_value(&events) {
                cb.call1(&JsValue::NULL, &js_events).ok();
            }
        }
    }
}

fn to_js_error(error: PlayerError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

//! Player state - queue, selection and mode flags
//!
//! `PlayerState` owns what is playing and how. It never talks to an audio
//! device; the surface observes it and reconciles the device afterwards.

use crate::{
    error::{PlayerError, Result},
    types::{Episode, PlayerCommand, Queue, TransportControls},
};
use rand::{thread_rng, Rng};
use tracing::debug;

/// Queue, current index and mode flags for one listening session
///
/// Invariants:
/// - `current_index` is `None` or a valid index into `queue`
/// - `is_playing` is only true while an episode is selected
#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    queue: Queue,
    current_index: Option<usize>,
    is_playing: bool,
    is_looping: bool,
    is_shuffling: bool,

    // Bumped on every (re)selection so observers can tell a restart of the
    // same index apart from nothing happening.
    selection: u64,
}

impl PlayerState {
    /// Empty queue, every flag off
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Commands =====

    /// Replace the queue with one episode and start playing it
    pub fn load_single(&mut self, episode: Episode) {
        self.queue = Queue::new(vec![episode]);
        self.select(0);
        self.is_playing = true;
    }

    /// Replace the queue and select `index`
    ///
    /// Re-selecting the current index of the same queue toggles playback;
    /// any other selection starts playing.
    pub fn load_from_queue(&mut self, queue: Queue, index: usize) -> Result<()> {
        if index >= queue.len() {
            return Err(PlayerError::IndexOutOfRange {
                index,
                len: queue.len(),
            });
        }

        let reselected =
            self.current_index == Some(index) && self.queue.same_identity(&queue);

        if reselected {
            self.is_playing = !self.is_playing;
        } else {
            self.queue = queue;
            self.select(index);
            self.is_playing = true;
        }

        Ok(())
    }

    /// Flip play/pause
    pub fn toggle_play(&mut self) {
        self.set_playing_state(!self.is_playing);
    }

    /// Flip repeat-current-episode
    pub fn toggle_loop(&mut self) {
        self.is_looping = !self.is_looping;
    }

    /// Flip shuffle
    ///
    /// Callers are expected to check [`can_shuffle`](Self::can_shuffle)
    /// first; a queue of one has nothing to shuffle to.
    pub fn toggle_shuffle(&mut self) {
        self.is_shuffling = !self.is_shuffling;
    }

    /// Absolute play/pause setter
    pub fn set_playing_state(&mut self, playing: bool) {
        if playing && self.current_index.is_none() {
            debug!("Ignoring play request with nothing selected");
            return;
        }
        self.is_playing = playing;
    }

    /// Advance to the next episode using the thread-local RNG for shuffle
    pub fn next(&mut self) {
        self.next_with(&mut thread_rng());
    }

    /// Advance to the next episode
    ///
    /// When shuffling a queue of two or more, draws uniformly over the whole
    /// queue (the current episode included, which then restarts). Otherwise
    /// steps forward and stays put at the end of the queue.
    pub fn next_with<R: Rng>(&mut self, rng: &mut R) {
        let Some(index) = self.current_index else {
            return;
        };

        if self.shuffle_applies() {
            let drawn = rng.gen_range(0..self.queue.len());
            self.select(drawn);
        } else if index + 1 < self.queue.len() {
            self.select(index + 1);
        } else {
            debug!(index, "Already at the last episode");
        }
    }

    /// Step back one episode, no wraparound
    pub fn previous(&mut self) {
        match self.current_index {
            Some(index) if index > 0 => self.select(index - 1),
            _ => debug!("Already at the first episode"),
        }
    }

    /// Drop the queue and stop
    ///
    /// Loop and shuffle preferences survive.
    pub fn clear(&mut self) {
        self.queue = Queue::default();
        self.current_index = None;
        self.is_playing = false;
        self.selection += 1;
    }

    /// Apply a command
    pub fn apply(&mut self, command: PlayerCommand) -> Result<()> {
        self.apply_with(command, &mut thread_rng())
    }

    /// Apply a command with an explicit RNG for shuffle draws
    pub fn apply_with<R: Rng>(&mut self, command: PlayerCommand, rng: &mut R) -> Result<()> {
        match command {
            PlayerCommand::LoadSingle(episode) => self.load_single(episode),
            PlayerCommand::LoadFromQueue { queue, index } => self.load_from_queue(queue, index)?,
            PlayerCommand::TogglePlay => self.toggle_play(),
            PlayerCommand::ToggleLoop => self.toggle_loop(),
            PlayerCommand::ToggleShuffle => self.toggle_shuffle(),
            PlayerCommand::SetPlayingState(playing) => self.set_playing_state(playing),
            PlayerCommand::Next => self.next_with(rng),
            PlayerCommand::Previous => self.previous(),
            PlayerCommand::Clear => self.clear(),
        }
        Ok(())
    }

    fn select(&mut self, index: usize) {
        self.current_index = Some(index);
        self.selection += 1;
    }

    // ===== Queries =====

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_episode(&self) -> Option<&Episode> {
        self.current_index.and_then(|index| self.queue.get(index))
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_looping(&self) -> bool {
        self.is_looping
    }

    pub fn is_shuffling(&self) -> bool {
        self.is_shuffling
    }

    /// Selection counter, changes whenever the current episode is (re)chosen
    pub fn selection(&self) -> u64 {
        self.selection
    }

    /// Whether `next` would land on an episode
    ///
    /// Shuffle over two or more episodes always has a target; otherwise
    /// there must be a later index.
    pub fn has_next(&self) -> bool {
        match self.current_index {
            Some(_) if self.shuffle_applies() => true,
            Some(index) => index + 1 < self.queue.len(),
            None => false,
        }
    }

    pub fn has_previous(&self) -> bool {
        matches!(self.current_index, Some(index) if index > 0)
    }

    /// Shuffle is meaningless for a queue of one or less
    pub fn can_shuffle(&self) -> bool {
        self.current_index.is_some() && self.queue.len() > 1
    }

    /// Button availability for the transport bar
    ///
    /// Shuffle stays enabled while it is on so it can always be turned off.
    pub fn controls(&self) -> TransportControls {
        let selected = self.current_index.is_some();
        TransportControls {
            play: selected,
            previous: selected,
            next: selected,
            looping: selected,
            shuffle: self.can_shuffle() || (selected && self.is_shuffling),
        }
    }

    // The flag outlives the queue it was set on
    fn shuffle_applies(&self) -> bool {
        self.is_shuffling && self.queue.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use url::Url;

    fn episode(title: &str) -> Episode {
        Episode {
            title: title.to_string(),
            members: "Diego".to_string(),
            thumbnail: Url::parse("https://cdn.example.com/cover.jpg").unwrap(),
            duration_seconds: 600,
            source_url: Url::parse(&format!("https://cdn.example.com/{title}.mp3")).unwrap(),
        }
    }

    fn abc() -> Queue {
        Queue::new(vec![episode("a"), episode("b"), episode("c")])
    }

    #[test]
    fn new_state_is_empty() {
        let state = PlayerState::new();
        assert!(state.queue().is_empty());
        assert_eq!(state.current_index(), None);
        assert!(!state.is_playing());
        assert!(!state.is_looping());
        assert!(!state.is_shuffling());
        assert_eq!(state.controls(), TransportControls::default());
    }

    #[test]
    fn load_single_always_plays() {
        let mut state = PlayerState::new();
        state.load_from_queue(abc(), 2).unwrap();
        state.toggle_play();
        assert!(!state.is_playing());

        state.load_single(episode("x"));
        assert_eq!(state.queue().len(), 1);
        assert_eq!(state.current_index(), Some(0));
        assert!(state.is_playing());
        assert_eq!(state.current_episode().unwrap().title, "x");
    }

    #[test]
    fn load_from_queue_rejects_out_of_range() {
        let mut state = PlayerState::new();
        state.load_single(episode("x"));
        let before = state.selection();

        let err = state.load_from_queue(abc(), 3).unwrap_err();
        assert!(matches!(err, PlayerError::IndexOutOfRange { index: 3, len: 3 }));
        assert_eq!(state.current_episode().unwrap().title, "x");
        assert_eq!(state.selection(), before);
    }

    #[test]
    fn reselecting_same_queue_and_index_toggles() {
        let mut state = PlayerState::new();
        let queue = abc();
        state.load_from_queue(queue.clone(), 1).unwrap();
        assert!(state.is_playing());

        let selection = state.selection();
        state.load_from_queue(queue.clone(), 1).unwrap();
        assert!(!state.is_playing());
        assert_eq!(state.selection(), selection);

        state.load_from_queue(queue, 1).unwrap();
        assert!(state.is_playing());
    }

    #[test]
    fn same_index_of_new_queue_starts_playing() {
        let mut state = PlayerState::new();
        state.load_from_queue(abc(), 1).unwrap();
        state.toggle_play();

        state.load_from_queue(abc(), 1).unwrap();
        assert!(state.is_playing());
    }

    #[test]
    fn next_advances_then_stops_at_end() {
        let mut state = PlayerState::new();
        state.load_from_queue(abc(), 1).unwrap();

        state.next();
        assert_eq!(state.current_index(), Some(2));

        let selection = state.selection();
        state.next();
        assert_eq!(state.current_index(), Some(2));
        assert_eq!(state.selection(), selection);
    }

    #[test]
    fn shuffle_next_draws_within_queue() {
        let mut state = PlayerState::new();
        state.load_from_queue(abc(), 0).unwrap();
        state.toggle_shuffle();

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let selection = state.selection();
            state.next_with(&mut rng);
            assert!(state.current_index().unwrap() < 3);
            assert_eq!(state.selection(), selection + 1);
        }
    }

    #[test]
    fn previous_stops_at_first() {
        let mut state = PlayerState::new();
        state.load_from_queue(abc(), 1).unwrap();

        state.previous();
        assert_eq!(state.current_index(), Some(0));

        state.previous();
        assert_eq!(state.current_index(), Some(0));
    }

    #[test]
    fn clear_keeps_mode_flags() {
        let mut state = PlayerState::new();
        state.load_from_queue(abc(), 1).unwrap();
        state.toggle_loop();
        state.toggle_shuffle();

        state.clear();
        assert!(state.queue().is_empty());
        assert_eq!(state.current_index(), None);
        assert!(!state.is_playing());
        assert!(state.is_looping());
        assert!(state.is_shuffling());
    }

    #[test]
    fn play_needs_a_selection() {
        let mut state = PlayerState::new();
        state.toggle_play();
        assert!(!state.is_playing());
        state.set_playing_state(true);
        assert!(!state.is_playing());
    }

    #[test]
    fn has_next_accounts_for_shuffle() {
        let mut state = PlayerState::new();
        state.load_from_queue(abc(), 2).unwrap();
        assert!(!state.has_next());

        state.toggle_shuffle();
        assert!(state.has_next());
    }

    #[test]
    fn shuffle_flag_is_inert_on_single_episode() {
        let mut state = PlayerState::new();
        state.load_from_queue(abc(), 0).unwrap();
        state.toggle_shuffle();
        state.load_single(episode("solo"));

        assert!(state.is_shuffling());
        assert!(!state.has_next());
        assert!(state.controls().shuffle);

        let selection = state.selection();
        state.next_with(&mut StdRng::seed_from_u64(3));
        assert_eq!(state.current_index(), Some(0));
        assert_eq!(state.selection(), selection);
    }

    #[test]
    fn controls_disable_shuffle_for_single_episode() {
        let mut state = PlayerState::new();
        state.load_single(episode("solo"));

        let controls = state.controls();
        assert!(controls.play);
        assert!(controls.next);
        assert!(!controls.shuffle);
    }

    #[test]
    fn apply_dispatches_commands() {
        let mut state = PlayerState::new();
        let mut rng = StdRng::seed_from_u64(1);

        state
            .apply_with(PlayerCommand::LoadFromQueue { queue: abc(), index: 0 }, &mut rng)
            .unwrap();
        state.apply_with(PlayerCommand::Next, &mut rng).unwrap();
        state.apply_with(PlayerCommand::ToggleLoop, &mut rng).unwrap();
        state
            .apply_with(PlayerCommand::SetPlayingState(false), &mut rng)
            .unwrap();

        assert_eq!(state.current_index(), Some(1));
        assert!(state.is_looping());
        assert!(!state.is_playing());

        let err = state
            .apply_with(PlayerCommand::LoadFromQueue { queue: abc(), index: 9 }, &mut rng)
            .unwrap_err();
        assert!(matches!(err, PlayerError::IndexOutOfRange { .. }));
    }
}

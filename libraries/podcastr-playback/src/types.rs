//! Core types for player state management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

/// A playable podcast episode
///
/// Supplied fully formed by the catalog screens and never mutated after it
/// has been enqueued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// Episode title
    pub title: String,

    /// Hosts and guests, display only
    pub members: String,

    /// Cover art location
    pub thumbnail: Url,

    /// Duration from the catalog metadata
    #[serde(alias = "duration")]
    pub duration_seconds: u32,

    /// Playable media location
    #[serde(alias = "url")]
    pub source_url: Url,
}

/// Ordered list of episodes available for sequential or shuffled playback
///
/// Cloning a queue is cheap and the clone shares the original's identity.
/// Two queues built separately never share identity, even with equal
/// contents. Re-selecting the current index of the *same* queue toggles
/// playback instead of restarting it.
#[derive(Debug, Clone, Default)]
pub struct Queue {
    episodes: Arc<[Episode]>,
}

impl Queue {
    /// Create a queue from episodes in play order
    pub fn new(episodes: Vec<Episode>) -> Self {
        Self {
            episodes: episodes.into(),
        }
    }

    /// Parse a JSON catalog (an array of episodes)
    pub fn from_json(json: &str) -> Result<Self> {
        let episodes: Vec<Episode> = serde_json::from_str(json)?;
        Ok(Self::new(episodes))
    }

    /// Whether both handles refer to the same loaded queue
    pub fn same_identity(&self, other: &Queue) -> bool {
        Arc::ptr_eq(&self.episodes, &other.episodes)
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Episode> {
        self.episodes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Episode> {
        self.episodes.iter()
    }

    pub fn as_slice(&self) -> &[Episode] {
        &self.episodes
    }
}

impl From<Vec<Episode>> for Queue {
    fn from(episodes: Vec<Episode>) -> Self {
        Self::new(episodes)
    }
}

impl FromIterator<Episode> for Queue {
    fn from_iter<I: IntoIterator<Item = Episode>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Queue {
    type Item = &'a Episode;
    type IntoIter = std::slice::Iter<'a, Episode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Transport commands accepted by the player
///
/// Every UI action and every translated device event ends up as one of
/// these.
#[derive(Debug, Clone)]
pub enum PlayerCommand {
    /// Replace the queue with a single episode and start it
    LoadSingle(Episode),

    /// Replace the queue and select `index`
    LoadFromQueue { queue: Queue, index: usize },

    /// Flip play/pause
    TogglePlay,

    /// Flip repeat-current-episode
    ToggleLoop,

    /// Flip shuffle
    ToggleShuffle,

    /// Absolute play/pause, used to follow the device
    SetPlayingState(bool),

    /// Advance (or redraw when shuffling)
    Next,

    /// Step back one episode
    Previous,

    /// Drop the queue and stop
    Clear,
}

/// Which transport buttons are usable in the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransportControls {
    pub play: bool,
    pub previous: bool,
    pub next: bool,
    pub looping: bool,
    pub shuffle: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(title: &str) -> Episode {
        Episode {
            title: title.to_string(),
            members: "Host".to_string(),
            thumbnail: Url::parse("https://cdn.example.com/cover.jpg").unwrap(),
            duration_seconds: 120,
            source_url: Url::parse(&format!("https://cdn.example.com/{title}.mp3")).unwrap(),
        }
    }

    #[test]
    fn clones_share_identity() {
        let queue = Queue::new(vec![episode("a"), episode("b")]);
        let clone = queue.clone();
        assert!(queue.same_identity(&clone));
    }

    #[test]
    fn equal_contents_do_not_share_identity() {
        let first = Queue::new(vec![episode("a")]);
        let second = Queue::new(vec![episode("a")]);
        assert_eq!(first.as_slice(), second.as_slice());
        assert!(!first.same_identity(&second));
    }

    #[test]
    fn parses_catalog_with_listing_field_names() {
        let json = r#"[
            {
                "title": "Faladev #30",
                "members": "Diego e Richard",
                "thumbnail": "https://cdn.example.com/30.jpg",
                "duration": 3981,
                "url": "https://cdn.example.com/30.m4a"
            },
            {
                "title": "Faladev #31",
                "members": "Tiago",
                "thumbnail": "https://cdn.example.com/31.jpg",
                "durationSeconds": 2700,
                "sourceUrl": "https://cdn.example.com/31.m4a"
            }
        ]"#;

        let queue = Queue::from_json(json).unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.get(0).unwrap().duration_seconds, 3981);
        assert_eq!(
            queue.get(1).unwrap().source_url.as_str(),
            "https://cdn.example.com/31.m4a"
        );
    }

    #[test]
    fn rejects_catalog_with_bad_url() {
        let json = r#"[{
            "title": "x",
            "members": "y",
            "thumbnail": "not a url",
            "duration": 1,
            "url": "https://cdn.example.com/x.mp3"
        }]"#;

        assert!(Queue::from_json(json).is_err());
    }
}

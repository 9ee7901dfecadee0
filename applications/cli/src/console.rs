//! Line commands typed into the terminal player

use podcastr_playback::{format_duration, PlayerEvent, PlayerSession, Queue, SimulatedDevice};

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Play,
    Pause,
    Toggle,
    Next,
    Previous,
    Loop,
    Shuffle,
    Seek(u32),
    Select(usize),
    Status,
    Help,
    Quit,
}

impl ConsoleCommand {
    /// Parse one line of input
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Err("empty command".to_string());
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "play" => Self::Play,
            "pause" => Self::Pause,
            "toggle" | "p" => Self::Toggle,
            "next" | "n" => Self::Next,
            "prev" | "previous" | "b" => Self::Previous,
            "loop" | "l" => Self::Loop,
            "shuffle" | "s" => Self::Shuffle,
            "seek" => Self::Seek(parse_arg(words.next(), "seek <seconds>")?),
            "select" => Self::Select(parse_arg(words.next(), "select <index>")?),
            "status" | "?" => Self::Status,
            "help" | "h" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("unknown command '{}', try 'help'", other)),
        };

        Ok(command)
    }
}

fn parse_arg<T: std::str::FromStr>(word: Option<&str>, usage: &str) -> Result<T, String> {
    word.and_then(|w| w.parse().ok())
        .ok_or_else(|| format!("usage: {}", usage))
}

pub const HELP: &str = "\
commands:
  play | pause | toggle (p)   control playback
  next (n) | prev (b)         move through the queue
  loop (l) | shuffle (s)      toggle modes
  seek <seconds>              jump within the episode
  select <index>              pick an episode from the catalog
  status (?)                  show what is playing
  quit (q)                    leave";

/// Describe a player event for the terminal, `None` for silent ones
pub fn describe_event(event: &PlayerEvent, queue_len: usize) -> Option<String> {
    match event {
        PlayerEvent::EpisodeChanged { index, title } => Some(format!(
            "Now playing [{}/{}]: {}",
            index + 1,
            queue_len,
            title
        )),
        PlayerEvent::StateChanged {
            is_playing,
            is_looping,
            is_shuffling,
        } => Some(format!(
            "{} | loop {} | shuffle {}",
            if *is_playing { "playing" } else { "paused" },
            on_off(*is_looping),
            on_off(*is_shuffling)
        )),
        PlayerEvent::QueueCleared => Some("Queue finished".to_string()),
        PlayerEvent::CommandRejected { reason } => Some(format!("Rejected: {}", reason)),
        PlayerEvent::ProgressChanged { .. } => None,
    }
}

/// One-line status for the `status` command
pub fn describe_status(session: &PlayerSession<SimulatedDevice>, catalog: &Queue) -> String {
    match session.now_playing() {
        Some(now) => format!(
            "[{}/{}] {} - {}  {} / {}  ({})",
            now.index + 1,
            session.state().queue().len(),
            now.episode.title,
            now.episode.members,
            now.elapsed,
            now.duration,
            if now.is_playing { "playing" } else { "paused" }
        ),
        None => format!(
            "Nothing selected ({} episodes in catalog, use 'select <index>')",
            catalog.len()
        ),
    }
}

/// Catalog listing line
pub fn describe_catalog_entry(index: usize, title: &str, members: &str, seconds: u32) -> String {
    format!("{:>3}  {:>6}  {} - {}", index, format_duration(seconds), title, members)
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_aliases() {
        assert_eq!(ConsoleCommand::parse("next"), Ok(ConsoleCommand::Next));
        assert_eq!(ConsoleCommand::parse("  B "), Ok(ConsoleCommand::Previous));
        assert_eq!(ConsoleCommand::parse("seek 90"), Ok(ConsoleCommand::Seek(90)));
        assert_eq!(ConsoleCommand::parse("select 2"), Ok(ConsoleCommand::Select(2)));
        assert_eq!(ConsoleCommand::parse("q"), Ok(ConsoleCommand::Quit));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(ConsoleCommand::parse("").is_err());
        assert!(ConsoleCommand::parse("seek").is_err());
        assert!(ConsoleCommand::parse("seek -4").is_err());
        assert!(ConsoleCommand::parse("rewind").is_err());
    }

    #[test]
    fn describes_events() {
        let event = PlayerEvent::EpisodeChanged {
            index: 0,
            title: "Faladev #30".to_string(),
        };
        assert_eq!(
            describe_event(&event, 3).as_deref(),
            Some("Now playing [1/3]: Faladev #30")
        );

        let event = PlayerEvent::StateChanged {
            is_playing: false,
            is_looping: true,
            is_shuffling: false,
        };
        assert_eq!(
            describe_event(&event, 3).as_deref(),
            Some("paused | loop on | shuffle off")
        );

        let event = PlayerEvent::ProgressChanged {
            elapsed_seconds: 1,
            duration_seconds: 2,
        };
        assert_eq!(describe_event(&event, 3), None);
    }

    #[test]
    fn catalog_entries_show_formatted_duration() {
        assert_eq!(
            describe_catalog_entry(1, "Faladev #30", "Diego", 3981),
            "  1   66:21  Faladev #30 - Diego"
        );
    }
}

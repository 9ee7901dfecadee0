//! Interactive terminal player
//!
//! Runs one `PlayerSession` on a simulated device. Stdin lines and clock
//! ticks are handled one at a time on a single thread, so no command ever
//! interleaves with a device event.

use crate::console::{describe_event, describe_status, ConsoleCommand, HELP};
use anyhow::{Context, Result};
use podcastr_playback::{PlayerCommand, PlayerSession, Queue, SimulatedDevice};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Startup options for `podcastr play`
#[derive(Debug, Clone)]
pub struct PlayOptions {
    pub index: usize,
    pub looping: bool,
    pub shuffling: bool,
    pub tick: Duration,
}

/// What the loop should do after a console command
enum Flow {
    Continue,
    Quit,
}

/// Run the interactive player until `quit` or end of input
pub async fn run(catalog: Queue, options: PlayOptions) -> Result<()> {
    let mut session = PlayerSession::new(SimulatedDevice::from_queue(&catalog));

    if options.looping {
        session.dispatch(PlayerCommand::ToggleLoop)?;
    }
    session
        .dispatch(PlayerCommand::LoadFromQueue {
            queue: catalog.clone(),
            index: options.index,
        })
        .with_context(|| format!("cannot start at episode {}", options.index))?;
    if options.shuffling {
        session.dispatch(PlayerCommand::ToggleShuffle)?;
    }
    settle(&mut session);

    info!(episodes = catalog.len(), tick = ?options.tick, "Player started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(options.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    debug!("End of input");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                match ConsoleCommand::parse(&line) {
                    Ok(command) => {
                        if let Flow::Quit = execute(&mut session, &catalog, command) {
                            break;
                        }
                    }
                    Err(message) => println!("{}", message),
                }
            }
            _ = ticker.tick() => {
                session.device_mut().advance(options.tick);
            }
        }

        settle(&mut session);
    }

    info!("Player stopped");
    Ok(())
}

/// Apply one console command to the session
fn execute(
    session: &mut PlayerSession<SimulatedDevice>,
    catalog: &Queue,
    command: ConsoleCommand,
) -> Flow {
    let player_command = match command {
        ConsoleCommand::Play => PlayerCommand::SetPlayingState(true),
        ConsoleCommand::Pause => PlayerCommand::SetPlayingState(false),
        ConsoleCommand::Toggle => PlayerCommand::TogglePlay,
        ConsoleCommand::Next => PlayerCommand::Next,
        ConsoleCommand::Previous => PlayerCommand::Previous,
        ConsoleCommand::Loop => PlayerCommand::ToggleLoop,
        ConsoleCommand::Shuffle => PlayerCommand::ToggleShuffle,
        ConsoleCommand::Select(index) => PlayerCommand::LoadFromQueue {
            queue: catalog.clone(),
            index,
        },
        ConsoleCommand::Seek(seconds) => {
            match session.seek_to(seconds) {
                Some(position) => debug!(position, "Seeked"),
                None => println!("Nothing selected"),
            }
            return Flow::Continue;
        }
        ConsoleCommand::Status => {
            println!("{}", describe_status(session, catalog));
            return Flow::Continue;
        }
        ConsoleCommand::Help => {
            println!("{}", HELP);
            return Flow::Continue;
        }
        ConsoleCommand::Quit => return Flow::Quit,
    };

    // Rejections are reported through the session's own events
    if let Err(err) = session.dispatch(player_command) {
        warn!(error = %err, "Command failed");
    }
    Flow::Continue
}

/// Deliver pending device events and print what changed
fn settle(session: &mut PlayerSession<SimulatedDevice>) {
    loop {
        let events = session.device_mut().take_events();
        if events.is_empty() {
            break;
        }
        for event in events {
            session.handle_device_event(event);
        }
    }

    let queue_len = session.state().queue().len();
    for event in session.drain_events() {
        if let Some(line) = describe_event(&event, queue_len) {
            println!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podcastr_playback::Episode;
    use url::Url;

    fn catalog() -> Queue {
        (0..3)
            .map(|i| Episode {
                title: format!("Episode {}", i),
                members: "Hosts".to_string(),
                thumbnail: Url::parse("https://cdn.example.com/cover.jpg").unwrap(),
                duration_seconds: 30,
                source_url: Url::parse(&format!("https://cdn.example.com/{}.mp3", i)).unwrap(),
            })
            .collect()
    }

    fn started(catalog: &Queue) -> PlayerSession<SimulatedDevice> {
        let mut session = PlayerSession::new(SimulatedDevice::from_queue(catalog));
        session
            .dispatch(PlayerCommand::LoadFromQueue {
                queue: catalog.clone(),
                index: 0,
            })
            .unwrap();
        settle(&mut session);
        session
    }

    #[test]
    fn select_same_episode_pauses() {
        let catalog = catalog();
        let mut session = started(&catalog);

        execute(&mut session, &catalog, ConsoleCommand::Select(0));
        settle(&mut session);

        assert!(!session.state().is_playing());
        assert!(!session.device().is_playing());
    }

    #[test]
    fn select_out_of_range_keeps_playing() {
        let catalog = catalog();
        let mut session = started(&catalog);

        execute(&mut session, &catalog, ConsoleCommand::Select(7));
        settle(&mut session);

        assert_eq!(session.state().current_index(), Some(0));
        assert!(session.state().is_playing());
    }

    #[test]
    fn seek_and_clock_drive_progress() {
        let catalog = catalog();
        let mut session = started(&catalog);

        execute(&mut session, &catalog, ConsoleCommand::Seek(10));
        session.device_mut().advance(Duration::from_secs(2));
        settle(&mut session);

        assert_eq!(session.progress().elapsed_seconds, 12);
    }

    #[test]
    fn quit_stops_the_loop() {
        let catalog = catalog();
        let mut session = started(&catalog);
        assert!(matches!(
            execute(&mut session, &catalog, ConsoleCommand::Quit),
            Flow::Quit
        ));
    }
}

use anyhow::{anyhow, bail, Result};
use std::str::FromStr;

use crate::{
    sink::PresentationSink,
    timeline::PlaybackSnapshot,
};

use super::PlaybackController;

/// A line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    /// The play/pause button.
    Toggle,
    /// The page went to the background.
    Hide,
    /// The page came back; playback stays paused.
    Show,
    Status,
    Resize(u16),
    Quit,
}

impl FromStr for PlayerCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let command = match words.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("p") | Some("play") | Some("pause") => PlayerCommand::Toggle,
            Some("h") | Some("hide") => PlayerCommand::Hide,
            Some("v") | Some("show") => PlayerCommand::Show,
            Some("s") | Some("status") => PlayerCommand::Status,
            Some("w") | Some("width") => {
                let width = words
                    .next()
                    .ok_or_else(|| anyhow!("width needs a column count"))?;
                let width: u16 = width
                    .parse()
                    .map_err(|_| anyhow!("invalid width '{width}'"))?;
                PlayerCommand::Resize(width)
            }
            Some("q") | Some("quit") | Some("exit") => PlayerCommand::Quit,
            Some(other) => bail!("unknown command '{other}'"),
        };
        if let Some(extra) = words.next() {
            bail!("unexpected argument '{extra}'");
        }
        Ok(command)
    }
}

#[derive(Debug)]
pub enum CommandOutcome {
    Continue,
    Status(PlaybackSnapshot),
    Quit,
}

pub async fn handle_command<S: PresentationSink + Send + 'static>(
    controller: &PlaybackController<S>,
    command: PlayerCommand,
) -> Result<CommandOutcome> {
    match command {
        PlayerCommand::Toggle => {
            controller.toggle().await?;
        }
        PlayerCommand::Hide => controller.on_visibility_change(true).await?,
        PlayerCommand::Show => controller.on_visibility_change(false).await?,
        PlayerCommand::Status => return Ok(CommandOutcome::Status(controller.snapshot().await)),
        PlayerCommand::Resize(width) => controller.resize(width).await,
        PlayerCommand::Quit => return Ok(CommandOutcome::Quit),
    }
    Ok(CommandOutcome::Continue)
}

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::{clock::ClockMode, settings::PlayerSettings};

#[derive(Parser, Debug, Default)]
#[command(name = "tangent-tally", version, about)]
pub struct Cli {
    /// Settings file; created on first `--save`.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Schedule JSON. The bundled press-conference schedule is used otherwise.
    #[arg(long)]
    pub schedule: Option<PathBuf>,

    /// Recording to play alongside the timeline (needs the `audio` feature).
    #[arg(long)]
    pub audio: Option<PathBuf>,

    /// How ticks turn into elapsed time.
    #[arg(long, value_enum)]
    pub clock: Option<ClockArg>,

    /// Tick period in milliseconds.
    #[arg(long = "tick-ms")]
    pub tick_ms: Option<u64>,

    /// Terminal width used for the chart.
    #[arg(long)]
    pub width: Option<u16>,

    /// Write events as JSON lines instead of drawing.
    #[arg(long)]
    pub json: bool,

    /// Start paused; press enter to play.
    #[arg(long)]
    pub paused: bool,

    /// Write the effective settings back to the settings file.
    #[arg(long)]
    pub save: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ClockArg {
    Fixed,
    Wall,
}

impl From<ClockArg> for ClockMode {
    fn from(arg: ClockArg) -> Self {
        match arg {
            ClockArg::Fixed => ClockMode::FixedStep,
            ClockArg::Wall => ClockMode::WallClock,
        }
    }
}

impl Cli {
    /// Command-line flags win over the settings file.
    pub fn apply(&self, settings: &mut PlayerSettings) {
        if let Some(path) = &self.schedule {
            settings.schedule_path = Some(path.clone());
        }
        if let Some(path) = &self.audio {
            settings.audio_path = Some(path.clone());
        }
        if let Some(clock) = self.clock {
            settings.clock_mode = clock.into();
        }
        if let Some(tick_ms) = self.tick_ms {
            settings.tick_millis = tick_ms;
        }
        if let Some(width) = self.width {
            settings.viewport_width = width;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_settings() {
        let cli = Cli::parse_from([
            "tangent-tally",
            "--clock",
            "wall",
            "--tick-ms",
            "40",
            "--width",
            "120",
            "--json",
        ]);
        let mut settings = PlayerSettings::default();
        cli.apply(&mut settings);

        assert!(cli.json);
        assert_eq!(settings.clock_mode, ClockMode::WallClock);
        assert_eq!(settings.tick_millis, 40);
        assert_eq!(settings.viewport_width, 120);
        assert_eq!(settings.schedule_path, None);
    }

    #[test]
    fn absent_flags_leave_settings_alone() {
        let cli = Cli::parse_from(["tangent-tally"]);
        let mut settings = PlayerSettings {
            tick_millis: 250,
            ..PlayerSettings::default()
        };
        cli.apply(&mut settings);
        assert_eq!(settings.tick_millis, 250);
        assert!(!cli.paused);
    }

    #[test]
    fn unknown_clock_is_rejected() {
        assert!(Cli::try_parse_from(["tangent-tally", "--clock", "sundial"]).is_err());
    }
}

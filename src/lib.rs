pub mod audio;
pub mod cli;
pub mod clock;
pub mod layout;
pub mod playback;
pub mod schedule;
pub mod settings;
pub mod sink;
pub mod timeline;
pub mod utils;

use anyhow::{Context, Result};
use log::{info, warn};
use std::{io, path::Path, sync::Arc};
use tokio::io::{AsyncBufReadExt, BufReader};

use audio::{AudioTransport, SilentTransport};
use cli::Cli;
use clock::ElapsedClock;
use layout::format_seconds;
use playback::{handle_command, CommandOutcome, PlaybackController, PlayerCommand};
use schedule::Schedule;
use settings::{PlayerSettings, SettingsStore};
use sink::{JsonLinesSink, PresentationSink, TerminalSink};
use timeline::{PlaybackSnapshot, PlaybackStatus, TimelineDriver};

type BoxedSink = Box<dyn PresentationSink + Send>;

pub async fn run(cli: Cli) -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let store = cli
        .settings
        .clone()
        .map(SettingsStore::new)
        .transpose()?;
    let mut settings = store
        .as_ref()
        .map(SettingsStore::settings)
        .unwrap_or_default();
    cli.apply(&mut settings);

    if cli.save {
        match &store {
            Some(store) => store.update(settings.clone())?,
            None => warn!("--save needs --settings; nothing written"),
        }
    }

    let schedule = Arc::new(load_schedule(&settings)?);
    info!(
        "loaded {} intervals across {} topics ({} recording)",
        schedule.len(),
        schedule.topic_count(),
        format_seconds(schedule.recording().as_secs_f64())
    );

    let transport = open_transport(settings.audio_path.as_deref())?;
    let driver = TimelineDriver::new(
        schedule.clone(),
        ElapsedClock::new(settings.clock_mode, settings.tick_interval()),
        settings.capabilities,
    );

    let sink: BoxedSink = if cli.json {
        Box::new(JsonLinesSink::new(io::stdout()))
    } else {
        Box::new(TerminalSink::new(
            schedule.clone(),
            settings.viewport_width,
            io::stdout(),
        ))
    };

    let controller = PlaybackController::new(driver, sink, transport);
    let summary = drive(&controller, !cli.paused, cli.json).await?;
    print_summary(&schedule, &summary, cli.json)
}

fn load_schedule(settings: &PlayerSettings) -> Result<Schedule> {
    match &settings.schedule_path {
        Some(path) => Schedule::load(path)
            .with_context(|| format!("Invalid schedule {}", path.display())),
        None => Schedule::builtin().context("Bundled schedule failed validation"),
    }
}

fn open_transport(path: Option<&Path>) -> Result<Arc<dyn AudioTransport>> {
    match path {
        #[cfg(feature = "audio")]
        Some(path) => Ok(Arc::new(audio::AudioEngineHandle::open(path)?)),
        #[cfg(not(feature = "audio"))]
        Some(path) => {
            warn!(
                "built without the `audio` feature; {} will not be played",
                path.display()
            );
            Ok(Arc::new(SilentTransport::new()))
        }
        None => Ok(Arc::new(SilentTransport::new())),
    }
}

/// Plays until the timeline completes, the user quits or ctrl-c arrives.
/// Commands come from stdin one per line.
async fn drive<S: PresentationSink + Send + 'static>(
    controller: &PlaybackController<S>,
    autoplay: bool,
    json: bool,
) -> Result<PlaybackSnapshot> {
    let mut status = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    if autoplay {
        controller.play().await?;
    }

    loop {
        tokio::select! {
            changed = status.changed() => {
                if changed.is_err() || *status.borrow_and_update() == PlaybackStatus::Complete {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    stdin_open = false;
                    // Nothing left to resume a paused session.
                    if *status.borrow() != PlaybackStatus::Playing {
                        break;
                    }
                    continue;
                };

                let command = match line.parse::<PlayerCommand>() {
                    Ok(command) => command,
                    Err(err) => {
                        warn!("{err}");
                        continue;
                    }
                };
                match handle_command(controller, command).await? {
                    CommandOutcome::Continue => {}
                    CommandOutcome::Status(snapshot) => print_status(&snapshot, json)?,
                    CommandOutcome::Quit => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    controller.dispose().await
}

fn print_status(snapshot: &PlaybackSnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
    } else {
        println!(
            "[{:?}] {} interval {} tangents {}",
            snapshot.status,
            format_seconds(snapshot.elapsed_seconds),
            snapshot.current_interval_index,
            snapshot.tangent_count.max(0)
        );
    }
    Ok(())
}

fn print_summary(schedule: &Schedule, snapshot: &PlaybackSnapshot, json: bool) -> Result<()> {
    if json {
        return print_status(snapshot, true);
    }

    println!();
    println!(
        "{} in, {} tangents",
        format_seconds(snapshot.elapsed_seconds),
        snapshot.tangent_count.max(0)
    );
    for (topic, seconds) in &snapshot.per_topic_seconds {
        let name = schedule.topic_name(*topic).unwrap_or("?");
        println!("  {:>6}  {name}", format_seconds(*seconds));
    }
    Ok(())
}

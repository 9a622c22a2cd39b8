use anyhow::{anyhow, Context, Result};
use rodio::{Decoder, OutputStream, Sink};
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Sender},
        Arc, Mutex,
    },
    thread,
};

use super::AudioTransport;

// Set to true to log audio thread failures
const ENABLE_LOGS: bool = true;

use crate::log_error;

enum AudioCommand {
    Play,
    Pause,
    Stop,
}

/// Plays a recording on a dedicated thread that owns the non-`Send` rodio
/// output. The recording is decoded up front so a bad file fails at startup,
/// not on the first play.
pub struct AudioEngineHandle {
    path: PathBuf,
    tx: Mutex<Option<Sender<AudioCommand>>>,
    is_playing: Arc<AtomicBool>,
}

impl AudioEngineHandle {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open recording {}", path.display()))?;
        Decoder::new(BufReader::new(file))
            .with_context(|| format!("Failed to decode recording {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            tx: Mutex::new(None),
            is_playing: Arc::new(AtomicBool::new(false)),
        })
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>> {
        let mut guard = self
            .tx
            .lock()
            .map_err(|_| anyhow!("audio engine lock poisoned"))?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();
        let is_playing = Arc::clone(&self.is_playing);
        let path = self.path.clone();

        thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                let sink = match open_sink(&path) {
                    Ok(opened) => opened,
                    Err(err) => {
                        log_error!("audio engine unavailable: {err:#}");
                        return;
                    }
                };
                let (_stream, sink) = sink;

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::Play => {
                            sink.play();
                            is_playing.store(true, Ordering::SeqCst);
                        }
                        AudioCommand::Pause => {
                            sink.pause();
                            is_playing.store(false, Ordering::SeqCst);
                        }
                        AudioCommand::Stop => {
                            sink.stop();
                            is_playing.store(false, Ordering::SeqCst);
                            break;
                        }
                    }
                }
            })
            .context("Failed to spawn audio thread")?;

        *guard = Some(tx.clone());
        Ok(tx)
    }

    fn send(&self, cmd: AudioCommand) -> Result<()> {
        let tx = self.ensure_thread()?;
        tx.send(cmd).map_err(|_| anyhow!("audio engine has shut down"))
    }
}

fn open_sink(path: &Path) -> Result<(OutputStream, Sink)> {
    let (stream, handle) =
        OutputStream::try_default().context("Failed to create audio output stream")?;
    let sink = Sink::try_new(&handle).context("Failed to create audio sink")?;
    let file = File::open(path)?;
    sink.append(Decoder::new(BufReader::new(file))?);
    sink.pause();
    Ok((stream, sink))
}

impl AudioTransport for AudioEngineHandle {
    fn play(&self) -> Result<()> {
        self.send(AudioCommand::Play)
    }

    fn pause(&self) -> Result<()> {
        self.send(AudioCommand::Pause)
    }

    fn stop(&self) -> Result<()> {
        let tx = self
            .tx
            .lock()
            .map_err(|_| anyhow!("audio engine lock poisoned"))?
            .take();
        if let Some(tx) = tx {
            let _ = tx.send(AudioCommand::Stop);
        }
        self.is_playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.is_playing.load(Ordering::SeqCst)
    }
}

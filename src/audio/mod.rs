#[cfg(feature = "audio")]
pub mod engine;

#[cfg(feature = "audio")]
pub use engine::AudioEngineHandle;

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};

/// The recording being narrated. The timeline follows its own clock and only
/// starts and stops the transport alongside it.
pub trait AudioTransport: Send + Sync {
    fn play(&self) -> Result<()>;
    fn pause(&self) -> Result<()>;
    /// Releases the output device.
    fn stop(&self) -> Result<()>;
    fn is_playing(&self) -> bool;
}

/// Transport with no output device: tracks the playing flag only.
#[derive(Debug, Default)]
pub struct SilentTransport {
    playing: AtomicBool,
}

impl SilentTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioTransport for SilentTransport {
    fn play(&self) -> Result<()> {
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_transport_tracks_state() {
        let transport = SilentTransport::new();
        assert!(!transport.is_playing());
        transport.play().unwrap();
        assert!(transport.is_playing());
        transport.pause().unwrap();
        assert!(!transport.is_playing());
    }
}

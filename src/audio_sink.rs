use crate::config::{AudioMode, ClientConfig};
use crate::error::PlaybackError;
use crate::frame::Frame;
use crate::stream_consumer::FrameHandler;
use crate::wav::build_wav;
use crossbeam_channel::{bounded, unbounded, Sender};
use log::{debug, error, info, warn};
use rodio::{Decoder, OutputStream, Source};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

type WavSource = Decoder<Cursor<Vec<u8>>>;

/// Accepts self-describing audio containers (WAV) and plays them
pub trait MediaSink: Send + Sync {
    fn play(&self, container: Vec<u8>) -> Result<(), PlaybackError>;
}

/// Plays containers on the default output device.
///
/// The output stream is not `Send`, so it lives on a dedicated thread. Clips
/// are mixed in as soon as they arrive: a clip that starts while another is
/// still playing overlaps it.
pub struct RodioSink {
    sources: Sender<WavSource>,
}

impl RodioSink {
    pub fn new() -> Result<Self, PlaybackError> {
        let (sources, receiver) = unbounded::<WavSource>();
        let (ready_tx, ready_rx) = bounded::<Result<(), String>>(1);

        thread::Builder::new()
            .name("audio-playback".to_string())
            .spawn(move || {
                let (_stream, handle) = match OutputStream::try_default() {
                    Ok(output) => {
                        let _ = ready_tx.send(Ok(()));
                        output
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };

                while let Ok(source) = receiver.recv() {
                    if let Err(e) = handle.play_raw(source.convert_samples::<f32>()) {
                        error!("❌ Failed to start playback: {}", e);
                    }
                }
                debug!("Audio playback thread exiting");
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!("🔊 Audio output opened on the default device");
                Ok(Self { sources })
            }
            Ok(Err(e)) => Err(PlaybackError::Device(e)),
            Err(_) => Err(PlaybackError::Device(
                "audio thread exited during startup".to_string(),
            )),
        }
    }
}

impl MediaSink for RodioSink {
    fn play(&self, container: Vec<u8>) -> Result<(), PlaybackError> {
        let source =
            Decoder::new(Cursor::new(container)).map_err(|e| PlaybackError::Decode(e.to_string()))?;
        self.sources.send(source).map_err(|_| PlaybackError::Closed)
    }
}

/// Writes every container to `<dir>/audio-<n>.wav`
pub struct WavFileSink {
    dir: PathBuf,
    next_index: AtomicUsize,
}

impl WavFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, PlaybackError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            next_index: AtomicUsize::new(1),
        })
    }

    fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!("audio-{:06}.wav", index))
    }
}

impl MediaSink for WavFileSink {
    fn play(&self, container: Vec<u8>) -> Result<(), PlaybackError> {
        let path = self.path_for(self.next_index.fetch_add(1, Ordering::Relaxed));
        std::fs::write(&path, container)?;
        debug!("💾 Saved audio clip to {}", path.display());
        Ok(())
    }
}

/// Media sink selected by the configuration, `None` when audio is off
pub fn sink_from_config(
    config: &ClientConfig,
) -> Result<Option<Arc<dyn MediaSink>>, PlaybackError> {
    match config.audio {
        AudioMode::Off => Ok(None),
        AudioMode::Speaker => Ok(Some(Arc::new(RodioSink::new()?))),
        AudioMode::File => {
            info!("💾 Saving audio clips in `{}`", config.audio_dir.display());
            Ok(Some(Arc::new(WavFileSink::new(&config.audio_dir)?)))
        }
    }
}

/// Frame handler for the audio subscription: wraps PCM in a WAV container and plays it
pub struct AudioHandler {
    sink: Arc<dyn MediaSink>,
}

impl AudioHandler {
    pub fn new(sink: Arc<dyn MediaSink>) -> Self {
        Self { sink }
    }
}

impl FrameHandler for AudioHandler {
    fn on_frame(&mut self, frame: Frame) {
        let (samples, format) = match frame {
            Frame::Audio { samples, format } => (samples, format),
            other => {
                debug!("Audio handler ignoring {} frame", other.category());
                return;
            }
        };

        debug!(
            "🎵 Audio clip: {} bytes, {}Hz, {}ch, {} bits",
            samples.len(),
            format.sample_rate,
            format.channels,
            format.bits_per_sample
        );
        if let Err(e) = self.sink.play(build_wav(&samples, format)) {
            warn!("⚠️  Failed to play audio clip: {}", e);
        }
    }
}

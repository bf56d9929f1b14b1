//! Render frames: decompression, framebuffer assembly and presentation.

pub mod framebuffer;
pub mod terminal;

pub use framebuffer::Framebuffer;
pub use terminal::{ITermSink, KittySink, RawFileSink, TerminalKind};

use crate::config::{ClientConfig, DisplayMode};
use crate::error::DisplayError;
use crate::frame::{Frame, Rectangle};
use crate::stream_consumer::FrameHandler;
use flate2::read::DeflateDecoder;
use log::{debug, info, warn};
use std::io::Read;

/// Presentation target for a full RGBA frame
pub trait PixelSink: Send {
    fn present(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<(), DisplayError>;
}

/// Decompress a raw DEFLATE stream (no zlib or gzip wrapper)
pub fn inflate(compressed: &[u8]) -> Result<Vec<u8>, DisplayError> {
    let mut pixels = Vec::new();
    DeflateDecoder::new(compressed)
        .read_to_end(&mut pixels)
        .map_err(DisplayError::Inflate)?;
    Ok(pixels)
}

/// Pixel sink selected by the configuration, `None` when display is off
pub fn sink_from_config(config: &ClientConfig) -> Option<Box<dyn PixelSink>> {
    let kind = match config.display {
        DisplayMode::Off => return None,
        DisplayMode::Kitty => TerminalKind::Kitty,
        DisplayMode::Iterm => TerminalKind::ITerm2,
        DisplayMode::Raw => TerminalKind::Plain,
        DisplayMode::Auto => TerminalKind::detect(),
    };

    let sink: Box<dyn PixelSink> = match kind {
        TerminalKind::Kitty => Box::new(KittySink::new(std::io::stdout())),
        TerminalKind::ITerm2 => Box::new(ITermSink::new(std::io::stdout())),
        TerminalKind::Plain => {
            info!(
                "🖼️  Saving display in `{}`; use a kitty or iTerm2 terminal to see it inline",
                config.display_file.display()
            );
            Box::new(RawFileSink::new(&config.display_file))
        }
    };
    Some(sink)
}

/// Frame handler for the render subscriptions.
///
/// Tiles are blitted into a framebuffer which is then presented as a whole.
/// A tile that fails to decode is logged and dropped; the subscription stays up.
pub struct RenderHandler {
    framebuffer: Framebuffer,
    sink: Box<dyn PixelSink>,
}

impl RenderHandler {
    pub fn new(width: u32, height: u32, sink: Box<dyn PixelSink>) -> Self {
        Self {
            framebuffer: Framebuffer::new(width, height),
            sink,
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    fn render(&mut self, rectangle: Rectangle, pixels: &[u8]) -> Result<(), DisplayError> {
        self.framebuffer.blit(rectangle, pixels)?;
        self.sink.present(
            self.framebuffer.pixels(),
            self.framebuffer.width(),
            self.framebuffer.height(),
        )
    }
}

impl FrameHandler for RenderHandler {
    fn on_frame(&mut self, frame: Frame) {
        let result = match frame {
            Frame::Render { pixels, rectangle } => self.render(rectangle, &pixels),
            Frame::CompressedRender {
                compressed,
                rectangle,
            } => inflate(&compressed).and_then(|pixels| self.render(rectangle, &pixels)),
            Frame::Audio { .. } => {
                debug!("Render handler ignoring audio frame");
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!("⚠️  Dropping render frame: {}", e);
        }
    }
}

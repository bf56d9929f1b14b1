use crate::error::FrameError;
use crate::wav::PcmFormat;
use service_protos::ubo::v1::{
    event, AudioPlayAudioEvent, DisplayCompressedRenderEvent, DisplayRenderEvent, Event,
};
use std::fmt;

/// Kind of event a subscription asks the store for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// Uncompressed display updates
    Render,
    /// DEFLATE compressed display updates
    CompressedRender,
    /// PCM clips to play
    Audio,
}

impl EventCategory {
    /// Event used as the subscription filter: the oneof case is set, its content is empty
    pub fn filter(&self) -> Event {
        let kind = match self {
            EventCategory::Render => {
                event::Event::DisplayRenderEvent(DisplayRenderEvent::default())
            }
            EventCategory::CompressedRender => event::Event::DisplayCompressedRenderEvent(
                DisplayCompressedRenderEvent::default(),
            ),
            EventCategory::Audio => {
                event::Event::AudioPlayAudioEvent(AudioPlayAudioEvent::default())
            }
        };
        Event { event: Some(kind) }
    }

    /// Category an event belongs to, if it carries a payload
    pub fn of(event: &Event) -> Option<Self> {
        match event.event.as_ref()? {
            event::Event::DisplayRenderEvent(_) => Some(EventCategory::Render),
            event::Event::DisplayCompressedRenderEvent(_) => Some(EventCategory::CompressedRender),
            event::Event::AudioPlayAudioEvent(_) => Some(EventCategory::Audio),
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventCategory::Render => "render",
            EventCategory::CompressedRender => "compressed-render",
            EventCategory::Audio => "audio",
        };
        f.write_str(name)
    }
}

/// Screen region `(x, y, width, height)` in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bytes of an RGBA buffer covering this rectangle
    pub fn rgba_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

impl TryFrom<&[i32]> for Rectangle {
    type Error = FrameError;

    fn try_from(values: &[i32]) -> Result<Self, Self::Error> {
        let invalid = || FrameError::InvalidRectangle(values.to_vec());
        let [x, y, width, height] = <[i32; 4]>::try_from(values).map_err(|_| invalid())?;
        let component = |value: i32| u32::try_from(value).map_err(|_| invalid());

        Ok(Rectangle::new(
            component(x)?,
            component(y)?,
            component(width)?,
            component(height)?,
        ))
    }
}

/// One decoded message of a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Render {
        pixels: Vec<u8>,
        rectangle: Rectangle,
    },
    CompressedRender {
        compressed: Vec<u8>,
        rectangle: Rectangle,
    },
    Audio {
        samples: Vec<u8>,
        format: PcmFormat,
    },
}

impl Frame {
    pub fn category(&self) -> EventCategory {
        match self {
            Frame::Render { .. } => EventCategory::Render,
            Frame::CompressedRender { .. } => EventCategory::CompressedRender,
            Frame::Audio { .. } => EventCategory::Audio,
        }
    }

    /// Payload size in bytes, for logging
    pub fn payload_len(&self) -> usize {
        match self {
            Frame::Render { pixels, .. } => pixels.len(),
            Frame::CompressedRender { compressed, .. } => compressed.len(),
            Frame::Audio { samples, .. } => samples.len(),
        }
    }
}

impl TryFrom<Event> for Frame {
    type Error = FrameError;

    fn try_from(event: Event) -> Result<Self, Self::Error> {
        match event.event.ok_or(FrameError::Empty)? {
            event::Event::DisplayRenderEvent(render) => Ok(Frame::Render {
                rectangle: Rectangle::try_from(render.rectangle.as_slice())?,
                pixels: render.data,
            }),
            event::Event::DisplayCompressedRenderEvent(render) => Ok(Frame::CompressedRender {
                rectangle: Rectangle::try_from(render.rectangle.as_slice())?,
                compressed: render.compressed_data,
            }),
            event::Event::AudioPlayAudioEvent(audio) => {
                let channels = u16::try_from(audio.channels).map_err(|_| {
                    FrameError::AudioParameter {
                        field: "channels",
                        value: audio.channels,
                    }
                })?;
                // The wire carries the sample width in bytes
                let bits_per_sample = audio
                    .width
                    .checked_mul(8)
                    .and_then(|bits| u16::try_from(bits).ok())
                    .ok_or(FrameError::AudioParameter {
                        field: "width",
                        value: audio.width,
                    })?;

                Ok(Frame::Audio {
                    samples: audio.sample,
                    format: PcmFormat::new(audio.rate, channels, bits_per_sample),
                })
            }
        }
    }
}

pub mod audio_sink;
pub mod config;
pub mod display;
pub mod error;
pub mod frame;
pub mod input;
pub mod keymap;
pub mod notification;
pub mod store;
pub mod stream_consumer;
pub mod wav;

pub use config::ClientConfig;
pub use frame::{EventCategory, Frame};
pub use store::{GrpcStore, StoreTransport};
pub use stream_consumer::{FrameHandler, StreamConsumer};

use crate::frame::EventCategory;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid host '{0}'")]
    InvalidHost(String),
    #[error("Invalid display size {width}x{height}: both dimensions must be positive")]
    InvalidDisplaySize { width: u32, height: u32 },
    #[error("Argument error: {0}")]
    Args(#[from] clap::Error),
}

/// Where render frames end up
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DisplayMode {
    /// Pick kitty or iTerm2 from the environment, fall back to a raw file
    Auto,
    Kitty,
    Iterm,
    /// Overwrite `--display-file` with raw RGBA on every frame
    Raw,
    /// Do not subscribe to render events
    Off,
}

/// Which display events to subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderMode {
    /// DEFLATE compressed tiles
    Compressed,
    /// Raw RGBA tiles
    Uncompressed,
}

/// Where audio frames end up
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AudioMode {
    /// Play through the default output device
    Speaker,
    /// Write each clip as a WAV file under `--audio-dir`
    File,
    /// Do not subscribe to audio events
    Off,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "store-client")]
#[command(about = "Remote store client: dispatches actions and renders display and audio events")]
pub struct ClientConfig {
    /// Store server host
    #[arg(long, env = "GRPC_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Store server port
    #[arg(long, env = "GRPC_PORT", default_value = "50051")]
    pub port: u16,

    /// Connect through a Unix domain socket instead of TCP
    #[arg(long, env = "GRPC_UNIX_SOCKET")]
    pub unix_socket: Option<PathBuf>,

    /// Delay before a closed subscription is opened again
    #[arg(long, default_value = "1000")]
    pub reconnect_delay_ms: u64,

    /// Display output
    #[arg(long, value_enum, default_value = "auto")]
    pub display: DisplayMode,

    /// Display event flavor
    #[arg(long, value_enum, default_value = "compressed")]
    pub render: RenderMode,

    /// File written by the raw display output
    #[arg(long, default_value = "display.raw")]
    pub display_file: PathBuf,

    /// Framebuffer width in pixels
    #[arg(long, default_value = "240")]
    pub display_width: u32,

    /// Framebuffer height in pixels
    #[arg(long, default_value = "240")]
    pub display_height: u32,

    /// Audio output
    #[arg(long, value_enum, default_value = "speaker")]
    pub audio: AudioMode,

    /// Directory for `--audio file`
    #[arg(long, default_value = "audio")]
    pub audio_dir: PathBuf,

    /// Do not read keys from the terminal
    #[arg(long)]
    pub no_input: bool,
}

impl ClientConfig {
    /// Load `.env` (if present), parse the command line and validate the result
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (for development)
        dotenvy::dotenv().ok();

        let config = Self::try_parse()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unix_socket.is_none()
            && (self.host.trim().is_empty() || self.host.contains(char::is_whitespace))
        {
            return Err(ConfigError::InvalidHost(self.host.clone()));
        }
        if self.display_width == 0 || self.display_height == 0 {
            return Err(ConfigError::InvalidDisplaySize {
                width: self.display_width,
                height: self.display_height,
            });
        }
        Ok(())
    }

    /// URI of the TCP endpoint
    pub fn endpoint_uri(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            // Bare IPv6 literal
            format!("http://[{}]:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    /// Event category carrying display updates
    pub fn render_category(&self) -> EventCategory {
        match self.render {
            RenderMode::Compressed => EventCategory::CompressedRender,
            RenderMode::Uncompressed => EventCategory::Render,
        }
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Human readable target, used in log lines
    pub fn target(&self) -> String {
        match &self.unix_socket {
            Some(path) => format!("unix:{}", path.display()),
            None => self.endpoint_uri(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50051,
            unix_socket: None,
            reconnect_delay_ms: 1000,
            display: DisplayMode::Auto,
            render: RenderMode::Compressed,
            display_file: PathBuf::from("display.raw"),
            display_width: 240,
            display_height: 240,
            audio: AudioMode::Speaker,
            audio_dir: PathBuf::from("audio"),
            no_input: false,
        }
    }
}

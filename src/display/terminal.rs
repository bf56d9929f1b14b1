use super::PixelSink;
use crate::error::DisplayError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::Write;
use std::path::PathBuf;

/// Largest base64 payload the kitty graphics protocol accepts per escape
const KITTY_CHUNK_LEN: usize = 4096;

/// Image-capable terminal found in the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    Kitty,
    ITerm2,
    Plain,
}

impl TerminalKind {
    pub fn detect() -> Self {
        Self::from_env(|name| std::env::var(name).ok())
    }

    /// Detection with an injectable environment lookup
    pub fn from_env(var: impl Fn(&str) -> Option<String>) -> Self {
        if var("KITTY_WINDOW_ID").is_some() || var("TERM").as_deref() == Some("xterm-kitty") {
            TerminalKind::Kitty
        } else if var("TERM_PROGRAM").as_deref() == Some("iTerm.app") {
            TerminalKind::ITerm2
        } else {
            TerminalKind::Plain
        }
    }
}

/// Draws frames with the kitty graphics protocol, replacing image id 1 each time
pub struct KittySink<W: Write + Send> {
    out: W,
    cleared: bool,
}

impl<W: Write + Send> KittySink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            cleared: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> PixelSink for KittySink<W> {
    fn present(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<(), DisplayError> {
        if !self.cleared {
            self.out.write_all(b"\x1b[2J\x1b[H")?;
            self.cleared = true;
        }

        let encoded = STANDARD.encode(pixels);
        // base64 is ASCII, so byte chunks are valid str slices
        let mut chunks: Vec<&str> = encoded
            .as_bytes()
            .chunks(KITTY_CHUNK_LEN)
            .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
            .collect();
        if chunks.is_empty() {
            chunks.push("");
        }

        let last = chunks.len() - 1;
        for (index, chunk) in chunks.iter().enumerate() {
            let more = u8::from(index < last);
            if index == 0 {
                write!(
                    self.out,
                    "\x1b_Gm={},a=T,i=1,q=1,C=1,s={},v={};{}\x1b\\",
                    more, width, height, chunk
                )?;
            } else {
                write!(self.out, "\x1b_Gm={},q=1;{}\x1b\\", more, chunk)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Draws frames as inline PAM images using the iTerm2 escape sequence
pub struct ITermSink<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> ITermSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// RGBA pixels as a PAM (portable arbitrary map) image
pub fn pam_image(pixels: &[u8], width: u32, height: u32) -> Vec<u8> {
    let header = format!(
        "P7\nWIDTH {}\nHEIGHT {}\nDEPTH 4\nMAXVAL 255\nTUPLTYPE RGB_ALPHA\nENDHDR\n",
        width, height
    );
    let mut image = Vec::with_capacity(header.len() + pixels.len());
    image.extend_from_slice(header.as_bytes());
    image.extend_from_slice(pixels);
    image
}

impl<W: Write + Send> PixelSink for ITermSink<W> {
    fn present(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<(), DisplayError> {
        let image = pam_image(pixels, width, height);
        let encoded = STANDARD.encode(&image);

        self.out.write_all(b"\x1b[H")?;
        write!(
            self.out,
            "\x1b]1337;File=inline=1;width={}px;height={}px;size={}:{}\x07\n",
            width,
            height,
            image.len(),
            encoded
        )?;
        self.out.flush()?;
        Ok(())
    }
}

/// Overwrites a file with the latest raw RGBA frame
pub struct RawFileSink {
    path: PathBuf,
}

impl RawFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PixelSink for RawFileSink {
    fn present(&mut self, pixels: &[u8], _width: u32, _height: u32) -> Result<(), DisplayError> {
        std::fs::write(&self.path, pixels)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn test_terminal_detection() {
        assert_eq!(
            TerminalKind::from_env(env(&[("KITTY_WINDOW_ID", "1")])),
            TerminalKind::Kitty
        );
        assert_eq!(
            TerminalKind::from_env(env(&[("TERM", "xterm-kitty")])),
            TerminalKind::Kitty
        );
        assert_eq!(
            TerminalKind::from_env(env(&[("TERM_PROGRAM", "iTerm.app")])),
            TerminalKind::ITerm2
        );
        assert_eq!(
            TerminalKind::from_env(env(&[("TERM", "xterm-256color")])),
            TerminalKind::Plain
        );
    }

    #[test]
    fn test_kitty_single_chunk() {
        let mut sink = KittySink::new(Vec::new());
        sink.present(&[1, 2, 3, 4], 1, 1).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();

        assert!(out.starts_with("\x1b[2J\x1b[H"));
        assert!(out.contains("\x1b_Gm=0,a=T,i=1,q=1,C=1,s=1,v=1;AQIDBA==\x1b\\"));
        assert_eq!(out.matches("\x1b_G").count(), 1);
    }

    #[test]
    fn test_kitty_chunking() {
        // 6144 bytes -> 8192 base64 characters -> exactly two chunks
        let pixels = vec![0u8; 6144];
        let mut sink = KittySink::new(Vec::new());
        sink.present(&pixels, 48, 32).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();

        assert_eq!(out.matches("\x1b_G").count(), 2);
        assert!(out.contains("\x1b_Gm=1,a=T,i=1,q=1,C=1,s=48,v=32;"));
        assert!(out.contains("\x1b_Gm=0,q=1;"));
        assert!(!out.contains("\x1b_Gm=1,q=1;"));
    }

    #[test]
    fn test_kitty_clears_only_once() {
        let mut sink = KittySink::new(Vec::new());
        sink.present(&[0; 4], 1, 1).unwrap();
        sink.present(&[0; 4], 1, 1).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out.matches("\x1b[2J").count(), 1);
    }

    #[test]
    fn test_pam_header() {
        let image = pam_image(&[9; 8], 2, 1);
        let header = b"P7\nWIDTH 2\nHEIGHT 1\nDEPTH 4\nMAXVAL 255\nTUPLTYPE RGB_ALPHA\nENDHDR\n";
        assert_eq!(&image[..header.len()], &header[..]);
        assert_eq!(&image[header.len()..], &[9; 8]);
    }

    #[test]
    fn test_iterm_escape() {
        let mut sink = ITermSink::new(Vec::new());
        sink.present(&[0; 4], 1, 1).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();

        assert!(out.starts_with("\x1b[H\x1b]1337;File=inline=1;width=1px;height=1px;size="));
        assert!(out.ends_with("\x07\n"));
    }

    #[test]
    fn test_raw_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("display.raw");
        let mut sink = RawFileSink::new(&path);

        sink.present(&[1, 2, 3, 4], 1, 1).unwrap();
        sink.present(&[5, 6, 7, 8], 1, 1).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![5, 6, 7, 8]);
    }
}

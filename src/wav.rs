//! WAV container construction for headless PCM buffers.
//!
//! Audio events carry raw interleaved PCM with the format described next to
//! it. Media backends want a self-describing file, so the samples are wrapped
//! in the canonical 44-byte RIFF/WAVE header.

/// Size of the canonical PCM WAV header
pub const WAV_HEADER_LEN: usize = 44;

const FMT_CHUNK_LEN: u32 = 16;
const FORMAT_PCM: u16 = 1;

/// Linear PCM parameters of a sample buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl PcmFormat {
    pub fn new(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    /// Bytes per interleaved frame, truncated to the 16-bit header field
    pub fn block_align(&self) -> u16 {
        self.channels.wrapping_mul(self.bits_per_sample / 8)
    }

    /// Bytes per second, from the untruncated frame size
    pub fn byte_rate(&self) -> u32 {
        let rate = u64::from(self.sample_rate)
            * u64::from(self.channels)
            * u64::from(self.bits_per_sample)
            / 8;
        rate as u32
    }
}

/// Wrap `samples` in a PCM WAV container.
///
/// The result is always `WAV_HEADER_LEN + samples.len()` bytes. Parameters are
/// not validated: the caller must pass a positive rate and channel count and a
/// bit depth that is a multiple of 8, otherwise the header is malformed.
/// Payloads over 4 GiB do not fit the 32-bit size fields and are not supported.
pub fn build_wav(samples: &[u8], format: PcmFormat) -> Vec<u8> {
    let data_len = samples.len() as u32;
    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + samples.len());

    // RIFF chunk descriptor, size excludes the first 8 bytes
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&36u32.wrapping_add(data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt sub-chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    wav.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    wav.extend_from_slice(&format.channels.to_le_bytes());
    wav.extend_from_slice(&format.sample_rate.to_le_bytes());
    wav.extend_from_slice(&format.byte_rate().to_le_bytes());
    wav.extend_from_slice(&format.block_align().to_le_bytes());
    wav.extend_from_slice(&format.bits_per_sample.to_le_bytes());

    // data sub-chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    debug_assert_eq!(wav.len(), WAV_HEADER_LEN);

    wav.extend_from_slice(samples);
    wav
}

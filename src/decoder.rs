//! WAV decoding into a playable track and the raw visualization buffer.
//!
//! A file is decoded once at load time. The playback side gets normalized
//! interleaved `f32` samples; the visualization side gets the raw little-endian
//! PCM bytes of every frame, which is what the sampler walks over.

use hound::{SampleFormat, WavReader};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{PlayerError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioFormat {
    pub channels: u16,
    pub frame_rate: u32,
    pub bits_per_sample: u16,
    pub sample_format: SampleFormat,
}

impl AudioFormat {
    pub fn bytes_per_sample(&self) -> usize {
        (self.bits_per_sample as usize).div_ceil(8)
    }

    /// Bytes per frame across all channels
    pub fn frame_size(&self) -> usize {
        self.bytes_per_sample() * self.channels as usize
    }
}

/// A decoded file ready to be handed to the playback backend.
#[derive(Debug, Clone)]
pub struct Track {
    pub path: PathBuf,
    pub format: AudioFormat,
    samples: Arc<[f32]>,
}

impl Track {
    pub fn new(path: PathBuf, format: AudioFormat, samples: Vec<f32>) -> Self {
        Self {
            path,
            format,
            samples: samples.into(),
        }
    }

    /// Interleaved samples normalized to [-1.0, 1.0]
    pub fn samples(&self) -> Arc<[f32]> {
        Arc::clone(&self.samples)
    }

    pub fn frame_length(&self) -> u64 {
        (self.samples.len() / self.format.channels.max(1) as usize) as u64
    }

    pub fn duration(&self) -> Duration {
        if self.format.frame_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frame_length() as f64 / self.format.frame_rate as f64)
    }
}

/// Immutable raw frame bytes of one loaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    bytes: Box<[i8]>,
}

impl AudioBuffer {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<i8> {
        self.bytes.get(index).copied()
    }

    pub fn as_slice(&self) -> &[i8] {
        &self.bytes
    }
}

impl From<Vec<i8>> for AudioBuffer {
    fn from(bytes: Vec<i8>) -> Self {
        Self {
            bytes: bytes.into_boxed_slice(),
        }
    }
}

pub struct DecodedAudio {
    pub track: Track,
    pub buffer: AudioBuffer,
}

pub fn decode(path: &Path) -> Result<DecodedAudio> {
    let reader = WavReader::open(path).map_err(|e| PlayerError::decode(path, e))?;
    decode_reader(path, reader)
}

fn decode_reader<R: Read>(path: &Path, mut reader: WavReader<R>) -> Result<DecodedAudio> {
    let spec = reader.spec();
    let format = AudioFormat {
        channels: spec.channels,
        frame_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        sample_format: spec.sample_format,
    };

    log::info!(
        "WAV format: {} Hz, {} channels, {} bits, {:?}",
        format.frame_rate,
        format.channels,
        format.bits_per_sample,
        format.sample_format
    );

    let (samples, bytes) = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
            let raw: std::result::Result<Vec<i32>, _> = reader.samples::<i32>().collect();
            let raw = raw.map_err(|e| PlayerError::decode(path, e))?;
            int_samples(&raw, bits)
        }
        (SampleFormat::Float, 32) => {
            let raw: std::result::Result<Vec<f32>, _> = reader.samples::<f32>().collect();
            let raw = raw.map_err(|e| PlayerError::decode(path, e))?;
            float_samples(raw)
        }
        (sample_format, bits) => {
            return Err(PlayerError::decode(
                path,
                format!("unsupported sample format: {bits}-bit {sample_format:?}"),
            ));
        }
    };

    if samples.len() < format.channels as usize {
        return Err(PlayerError::decode(path, "file contains no audio frames"));
    }

    let track = Track::new(path.to_path_buf(), format, samples);
    log::info!(
        "Decoded {}: {} frames, {} buffer bytes, duration {:?}",
        path.display(),
        track.frame_length(),
        bytes.len(),
        track.duration()
    );

    Ok(DecodedAudio {
        track,
        buffer: AudioBuffer::from(bytes),
    })
}

fn int_samples(raw: &[i32], bits: u16) -> (Vec<f32>, Vec<i8>) {
    let scale = (1i64 << (bits - 1)) as f32;
    let width = (bits as usize).div_ceil(8);

    let mut samples = Vec::with_capacity(raw.len());
    let mut bytes = Vec::with_capacity(raw.len() * width);
    for &sample in raw {
        samples.push(sample as f32 / scale);
        // Low little-endian bytes; hound hands 8-bit samples back centred on zero
        bytes.extend(sample.to_le_bytes()[..width].iter().map(|&b| b as i8));
    }
    (samples, bytes)
}

fn float_samples(raw: Vec<f32>) -> (Vec<f32>, Vec<i8>) {
    let bytes = raw
        .iter()
        .flat_map(|s| s.to_le_bytes())
        .map(|b| b as i8)
        .collect();
    (raw, bytes)
}

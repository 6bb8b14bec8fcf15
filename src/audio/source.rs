use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crossbeam_channel::Receiver;
use hound::WavReader;

use super::AudioCapture;
use crate::constants::SAMPLING_RATE;

/// A collaborator that delivers monotonic 16 kHz mono PCM batches.
pub trait SampleSource: Send {
    /// Next batch of samples, or `None` at end of stream.
    fn next_batch(&mut self) -> anyhow::Result<Option<Vec<i16>>>;
    fn sample_rate(&self) -> u32;
}

/// Live microphone capture through the default input device.
pub struct DeviceSource {
    rx: Receiver<Vec<i16>>,
    _capture: AudioCapture,
}

impl DeviceSource {
    pub fn new(buffer_size: usize) -> anyhow::Result<Self> {
        let (tx, rx) = crossbeam_channel::bounded(10);
        let capture = AudioCapture::new(tx, buffer_size)?;
        Ok(Self { rx, _capture: capture })
    }
}

impl SampleSource for DeviceSource {
    fn next_batch(&mut self) -> anyhow::Result<Option<Vec<i16>>> {
        match self.rx.recv() {
            Ok(data) => Ok(Some(data)),
            Err(_) => Ok(None),
        }
    }

    fn sample_rate(&self) -> u32 {
        SAMPLING_RATE
    }
}

/// Mono WAV file played back in fixed-size batches.
pub struct WavFileSource {
    samples: Vec<i16>,
    position: usize,
    chunk_size: usize,
    sample_rate: u32,
}

impl WavFileSource {
    pub fn new<P: AsRef<Path>>(path: P, chunk_size: usize) -> anyhow::Result<Self> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();

        if spec.channels != 1 {
            anyhow::bail!("Expected mono WAV file, got {} channels", spec.channels);
        }
        if spec.sample_rate != SAMPLING_RATE {
            anyhow::bail!(
                "Expected {} Hz WAV file, got {} Hz",
                SAMPLING_RATE,
                spec.sample_rate
            );
        }

        let sample_rate = spec.sample_rate;
        let samples = Self::read_samples(reader, &spec)?;

        Ok(Self {
            samples,
            position: 0,
            chunk_size,
            sample_rate,
        })
    }

    fn read_samples(
        mut reader: WavReader<BufReader<File>>,
        spec: &hound::WavSpec,
    ) -> anyhow::Result<Vec<i16>> {
        let samples = match spec.sample_format {
            hound::SampleFormat::Int if spec.bits_per_sample == 16 => {
                reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?
            }
            hound::SampleFormat::Int => {
                let max_val = 2_i32.pow(spec.bits_per_sample as u32 - 1) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| (v as f32 / max_val * 32767.0) as i16))
                    .collect::<Result<Vec<_>, _>>()?
            }
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .map(|s| s.map(|v| (v * 32767.0).clamp(-32768.0, 32767.0) as i16))
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(samples)
    }
}

impl SampleSource for WavFileSource {
    fn next_batch(&mut self) -> anyhow::Result<Option<Vec<i16>>> {
        if self.position >= self.samples.len() {
            return Ok(None);
        }

        let end = (self.position + self.chunk_size).min(self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;

        Ok(Some(chunk))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Headerless 16-bit little-endian PCM file, streamed in fixed batches.
/// This is the capture format the embedded system's debug port emits.
pub struct PcmFileSource {
    reader: BufReader<File>,
    chunk_size: usize,
}

impl PcmFileSource {
    pub fn new<P: AsRef<Path>>(path: P, chunk_size: usize) -> anyhow::Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self {
            reader: BufReader::new(file),
            chunk_size,
        })
    }
}

impl SampleSource for PcmFileSource {
    fn next_batch(&mut self) -> anyhow::Result<Option<Vec<i16>>> {
        let mut bytes = vec![0u8; self.chunk_size * 2];
        let mut filled = 0;

        while filled < bytes.len() {
            let n = self.reader.read(&mut bytes[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        // A trailing odd byte cannot form a sample and is dropped.
        let samples: Vec<i16> = bytes[..filled]
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        if samples.is_empty() {
            Ok(None)
        } else {
            Ok(Some(samples))
        }
    }

    fn sample_rate(&self) -> u32 {
        SAMPLING_RATE
    }
}

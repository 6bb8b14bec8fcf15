use crate::constants::SAMPLING_RATE;
use crate::error::{Result, ScanError};
use audio_thread_priority::RtPriorityHandle;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;

pub struct AudioCapture {
    stream: cpal::Stream,
    _rt_handle: Option<RtPriorityHandle>,
}

impl AudioCapture {
    /// Start capturing 16 kHz mono audio from the default input device,
    /// delivering converted 16-bit batches over the channel.
    pub fn new(tx: Sender<Vec<i16>>, buffer_size: usize) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| ScanError::AudioDevice("No input device found".into()))?;

        match device.name() {
            Ok(name) => log::info!("Input device: {}", name),
            Err(_) => log::info!("Input device: Unknown"),
        }

        let stream_config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(SAMPLING_RATE),
            buffer_size: cpal::BufferSize::Fixed(buffer_size as u32),
        };

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let converted: Vec<i16> = data
                        .iter()
                        .map(|&s| (s * 32767.0).clamp(-32768.0, 32767.0) as i16)
                        .collect();
                    if tx.send(converted).is_err() {
                        log::warn!("Audio receiver dropped");
                    }
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| ScanError::AudioStream(format!("{}", e)))?;

        // Attempt to promote to real-time priority
        let rt_handle = audio_thread_priority::promote_current_thread_to_real_time(
            buffer_size as u32,
            SAMPLING_RATE,
        );

        let rt_handle = match rt_handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Could not set real-time priority: {}", e);
                None
            }
        };

        stream
            .play()
            .map_err(|e| ScanError::AudioStream(format!("{}", e)))?;

        Ok(Self {
            stream,
            _rt_handle: rt_handle,
        })
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        let _ = self.stream.pause();
    }
}

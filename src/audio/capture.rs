use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info};

use crate::{Error, Result};

/// A fixed-length microphone recording, interleaved f32 samples.
#[derive(Debug, Clone)]
pub struct Clip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Clip {
    /// Encode as 16-bit PCM WAV.
    pub fn to_wav(&self) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| Error::Audio(e.to_string()))?;
            for &sample in &self.samples {
                let pcm = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                writer.write_sample(pcm).map_err(|e| Error::Audio(e.to_string()))?;
            }
            writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
        }
        Ok(cursor.into_inner())
    }
}

/// Record `duration` from the default input device. Blocks the calling thread.
pub fn record(duration: Duration) -> Result<Clip> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| Error::Audio("no input device available".to_string()))?;

    let config = device
        .default_input_config()
        .map_err(|e| Error::Audio(e.to_string()))?;
    let sample_rate = config.sample_rate().0;
    let channels = config.channels();
    info!(device = %device.name().unwrap_or_default(), sample_rate, channels, "recording");

    let buffer = Arc::new(Mutex::new(Vec::<f32>::new()));
    let err_fn = |err| error!("an error occurred on stream: {}", err);

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let buffer = Arc::clone(&buffer);
            device.build_input_stream(
                &config.into(),
                move |data: &[f32], _: &_| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                err_fn,
                None,
            )
        }
        cpal::SampleFormat::I16 => {
            let buffer = Arc::clone(&buffer);
            device.build_input_stream(
                &config.into(),
                move |data: &[i16], _: &_| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend(data.iter().map(|&s| s as f32 / i16::MAX as f32));
                    }
                },
                err_fn,
                None,
            )
        }
        other => return Err(Error::Audio(format!("unsupported sample format: {other:?}"))),
    }
    .map_err(|e| Error::Audio(e.to_string()))?;

    stream.play().map_err(|e| Error::Audio(e.to_string()))?;
    std::thread::sleep(duration);
    drop(stream);

    let samples = buffer
        .lock()
        .map(|mut buf| std::mem::take(&mut *buf))
        .map_err(|_| Error::Audio("capture buffer poisoned".to_string()))?;

    Ok(Clip { samples, sample_rate, channels })
}

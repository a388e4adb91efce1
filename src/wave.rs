use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{Result, SynthesisError, SynthesisErrorDescription};
use crate::resample;

fn wave_error<E: std::fmt::Display>(err: E) -> SynthesisError {
    SynthesisError::new(SynthesisErrorDescription::InvalidWave(err.to_string()))
}

/// Samples in `[-1.0, 1.0]`, interleaved when `channels == 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sampling_rate: u32,
    pub channels: u16,
}

impl Waveform {
    pub fn mono(samples: Vec<f32>, sampling_rate: u32) -> Self {
        Self {
            samples,
            sampling_rate,
            channels: 1,
        }
    }

    pub fn empty(sampling_rate: u32, channels: u16) -> Self {
        Self {
            samples: Vec::new(),
            sampling_rate,
            channels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sampling_rate as f64
    }

    pub fn is_stereo(&self) -> bool {
        self.channels == 2
    }

    pub fn channel(&self, index: usize) -> Vec<f32> {
        self.samples
            .iter()
            .skip(index)
            .step_by(self.channels.max(1) as usize)
            .copied()
            .collect()
    }

    pub fn into_stereo(self) -> Self {
        if self.channels != 1 {
            return self;
        }
        let samples = self.samples.iter().flat_map(|&s| [s, s]).collect();
        Self {
            samples,
            sampling_rate: self.sampling_rate,
            channels: 2,
        }
    }

    pub fn resampled(self, sampling_rate: u32) -> Result<Self> {
        if sampling_rate == self.sampling_rate {
            return Ok(self);
        }
        let channels = (0..self.channels as usize)
            .map(|c| resample::resample(&self.channel(c), self.sampling_rate, sampling_rate))
            .collect::<Result<Vec<_>>>()?;
        let frames = channels.first().map_or(0, Vec::len);
        let samples = (0..frames).flat_map(|i| channels.iter().map(move |ch| ch[i])).collect();
        Ok(Self {
            samples,
            sampling_rate,
            channels: self.channels,
        })
    }

    fn spec(&self) -> WavSpec {
        WavSpec {
            channels: self.channels,
            sample_rate: self.sampling_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    /// 16-bit PCM WAV, clipping out-of-range samples.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let mut writer = WavWriter::new(Cursor::new(&mut bytes), self.spec())?;
        for &sample in &self.samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(value)?;
        }
        writer.finalize()?;
        Ok(bytes)
    }

    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self> {
        let reader = WavReader::new(Cursor::new(bytes))?;
        Self::from_reader(reader)
    }

    pub fn from_reader<R: std::io::Read>(reader: WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        if spec.channels == 0 || spec.channels > 2 {
            return Err(wave_error(format!("unsupported channel count {}", spec.channels)));
        }
        let samples = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 16) => reader
                .into_samples::<i16>()
                .map(|s| s.map(|s| s as f32 / i16::MAX as f32))
                .collect::<Result<Vec<_>, _>>()?,
            (SampleFormat::Float, 32) => reader
                .into_samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?,
            (format, bits) => {
                return Err(wave_error(format!("unsupported sample format: {:?} / {}", format, bits)));
            }
        };
        Ok(Self {
            samples,
            sampling_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }
}

/// Joins waveforms end to end at the highest sampling rate among them,
/// promoting mono inputs to stereo when any input is stereo.
pub fn connect_waves(waves: &[Waveform]) -> Result<Waveform> {
    let Some(sampling_rate) = waves.iter().map(|w| w.sampling_rate).max() else {
        return Err(wave_error("no waves to connect"));
    };
    let channels = waves.iter().map(|w| w.channels).max().unwrap_or(1);

    let mut connected = Waveform::empty(sampling_rate, channels);
    for wave in waves {
        let wave = if wave.channels < channels {
            wave.clone().into_stereo()
        } else {
            wave.clone()
        };
        let wave = wave.resampled(sampling_rate)?;
        connected.samples.extend_from_slice(&wave.samples);
    }
    log::debug!("Connected {} waves into {} frames at {} Hz", waves.len(), connected.frames(), sampling_rate);
    Ok(connected)
}


use rubato::{Resampler, SincFixedIn, SincInterpolationType, SincInterpolationParameters, WindowFunction};

use crate::error::{Result, SynthesisError, SynthesisErrorDescription};

const CHUNK_SIZE: usize = 1024;

fn resample_error<E: std::fmt::Display>(err: E) -> SynthesisError {
    SynthesisError::new(SynthesisErrorDescription::ResampleFailed(err.to_string()))
}

pub fn resampled_len(len: usize, from_rate: u32, to_rate: u32) -> usize {
    (len as u64 * to_rate as u64 / from_rate as u64) as usize
}

/// Band-limited conversion of a mono signal. The output has exactly
/// [`resampled_len`] samples with the filter delay removed.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == 0 || to_rate == 0 {
        return Err(resample_error(format!("invalid sampling rate {} -> {}", from_rate, to_rate)));
    }
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }

    let new_length = resampled_len(samples.len(), from_rate, to_rate);
    if new_length == 0 {
        return Ok(Vec::new());
    }

    let resample_ratio = to_rate as f64 / from_rate as f64;
    log::debug!("Resampling {} samples {} Hz -> {} Hz", samples.len(), from_rate, to_rate);

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let input_chunk_size = samples.len().min(CHUNK_SIZE);

    let mut resampler = SincFixedIn::<f32>::new(resample_ratio, 2.0, params, input_chunk_size, 1)?;

    let output_delay = resampler.output_delay();
    let mut output_buffer = Vec::with_capacity(new_length + output_delay);
    let mut output_frames = vec![vec![0.0f32; resampler.output_frames_max()]];
    let mut input_buffer = vec![Vec::with_capacity(input_chunk_size)];

    let mut input_index = 0;
    loop {
        let frames = resampler.input_frames_next();
        if frames > samples.len() - input_index {
            break;
        }
        input_buffer[0].clear();
        input_buffer[0].extend_from_slice(&samples[input_index..input_index + frames]);

        let (_, output_count) = resampler
            .process_into_buffer(&input_buffer, &mut output_frames, None)?;
        output_buffer.extend_from_slice(&output_frames[0][..output_count]);
        input_index += frames;
    }

    if input_index < samples.len() {
        let remaining = &samples[input_index..];
        let (_, output_count) = resampler
            .process_partial_into_buffer(Some(&[remaining][..]), &mut output_frames, None)?;
        output_buffer.extend_from_slice(&output_frames[0][..output_count]);
    }

    while output_buffer.len() < new_length + output_delay {
        let (_, output_count) = resampler
            .process_partial_into_buffer(None::<&[Vec<f32>]>, &mut output_frames, None)?;
        if output_count == 0 {
            break;
        }
        output_buffer.extend_from_slice(&output_frames[0][..output_count]);
    }

    let mut output = output_buffer.split_off(output_delay.min(output_buffer.len()));
    output.resize(new_length, 0.0);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(len: usize, rate: u32, freq: f32) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_same_rate_is_identity() {
        let input = sine(1000, 24000, 440.0);
        assert_eq!(resample(&input, 24000, 24000).unwrap(), input);
    }

    #[test]
    fn test_output_length() {
        for (len, from, to) in [(24000, 24000, 48000), (24000, 24000, 16000), (1234, 24000, 44100), (10, 24000, 8000)] {
            let output = resample(&sine(len, from, 220.0), from, to).unwrap();
            assert_eq!(output.len(), resampled_len(len, from, to), "{} {} {}", len, from, to);
        }
    }

    #[test]
    fn test_upsampling_preserves_level() {
        let input = sine(24000, 24000, 440.0);
        let output = resample(&input, 24000, 48000).unwrap();
        let peak = output[4000..44000].iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        assert!((peak - 0.5).abs() < 0.05, "peak {}", peak);
    }

    #[test]
    fn test_empty_and_invalid() {
        assert!(resample(&[], 24000, 48000).unwrap().is_empty());
        assert!(resample(&[0.0; 4], 0, 48000).is_err());
    }
}

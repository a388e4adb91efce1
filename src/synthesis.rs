//! From an [`AudioQuery`] to samples.
//!
//! The query scalars are applied in a fixed order: pre/post lengths, speed,
//! pitch, intonation (around the voiced mean), then volume, resampling and
//! channel duplication on the decoded signal.

use crate::model::{TextAnalyzer, VoiceCore};
use crate::error::{Result, SynthesisError, SynthesisErrorDescription};
use crate::flatten::{self, FlatSequence};
use crate::kana::create_kana;
use crate::predict::{self, ensure_loaded};
use crate::types::{AccentPhrase, AudioQuery, Speaker, SynthesisOptions};
use crate::upspeak::apply_interrogative_upspeak;
use crate::wave::Waveform;

fn invalid_query(reason: String) -> SynthesisError {
    SynthesisError::new(SynthesisErrorDescription::InvalidQuery(reason))
}

fn decode_failure(reason: String) -> SynthesisError {
    SynthesisError::new(SynthesisErrorDescription::DecodeFailure(reason))
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodeInputs {
    pub phoneme_ids: Vec<i64>,
    pub pitches: Vec<f32>,
    pub durations: Vec<f32>,
}

impl DecodeInputs {
    pub fn len(&self) -> usize {
        self.phoneme_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phoneme_ids.is_empty()
    }
}

// sentinels take the pre/post lengths
fn phoneme_durations(flat: &FlatSequence, pre_phoneme_length: f64, post_phoneme_length: f64) -> Result<Vec<f32>> {
    let mut durations = vec![pre_phoneme_length as f32];
    for mora in &flat.moras {
        match (&mora.consonant, mora.consonant_length) {
            (Some(_), Some(length)) => durations.push(length as f32),
            (None, None) => {}
            (None, Some(_)) => {
                return Err(invalid_query(format!("mora {:?} has a consonant length but no consonant", mora.text)));
            }
            (Some(consonant), None) => {
                return Err(invalid_query(format!(
                    "mora {:?} has consonant {:?} without a length",
                    mora.text, consonant
                )));
            }
        }
        durations.push(mora.vowel_length as f32);
    }
    durations.push(post_phoneme_length as f32);
    Ok(durations)
}

/// Repeats each mora pitch over its phonemes, advancing at every vowel slot.
fn phoneme_pitches(flat: &FlatSequence) -> Vec<f32> {
    let split = flat.split();
    let mora_pitches = std::iter::once(0.0)
        .chain(flat.moras.iter().map(|mora| if mora.is_pause() { 0.0 } else { mora.pitch as f32 }))
        .chain(std::iter::once(0.0))
        .collect::<Vec<_>>();

    let mut pitches = Vec::with_capacity(flat.len());
    let mut mora_index = 0;
    for index in 0..flat.len() {
        pitches.push(mora_pitches.get(mora_index).copied().unwrap_or(0.0));
        if split.is_vowel_index(index) {
            mora_index += 1;
        }
    }
    pitches
}

pub fn apply_speed_scale(durations: &mut [f32], speed_scale: f64) {
    let speed_scale = speed_scale as f32;
    durations.iter_mut().for_each(|d| *d /= speed_scale);
}

pub fn apply_pitch_scale(pitches: &mut [f32], pitch_scale: f64) {
    let factor = 2.0f32.powf(pitch_scale as f32);
    pitches.iter_mut().for_each(|p| *p *= factor);
}

/// Stretches voiced pitches away from their mean; zeros stay zero.
pub fn apply_intonation_scale(pitches: &mut [f32], intonation_scale: f64) {
    let (sum, count) = pitches
        .iter()
        .filter(|&&p| p > 0.0)
        .fold((0.0f32, 0usize), |(sum, count), &p| (sum + p, count + 1));
    if count == 0 {
        return;
    }
    let mean = sum / count as f32;
    let scale = intonation_scale as f32;
    for pitch in pitches.iter_mut().filter(|p| **p > 0.0) {
        *pitch = (*pitch - mean) * scale + mean;
    }
}

fn validate_query(query: &AudioQuery) -> Result<()> {
    if !(query.speed_scale > 0.0) {
        return Err(invalid_query(format!("speed_scale must be positive, got {}", query.speed_scale)));
    }
    if query.output_sampling_rate == 0 {
        return Err(invalid_query("output_sampling_rate must be positive".to_string()));
    }
    Ok(())
}

/// Fails with `EmptyUtterance` when there is nothing but the sentinels.
pub fn build_decode_inputs(query: &AudioQuery, accent_phrases: &[AccentPhrase]) -> Result<DecodeInputs> {
    let flat = flatten::pre_process(accent_phrases)?;
    if flat.is_empty() {
        return Err(SynthesisError::new(SynthesisErrorDescription::EmptyUtterance));
    }

    let mut durations = phoneme_durations(&flat, query.pre_phoneme_length, query.post_phoneme_length)?;
    apply_speed_scale(&mut durations, query.speed_scale);

    let mut pitches = phoneme_pitches(&flat);
    apply_pitch_scale(&mut pitches, query.pitch_scale);
    apply_intonation_scale(&mut pitches, query.intonation_scale);

    Ok(DecodeInputs {
        phoneme_ids: flat.phoneme_ids(),
        pitches,
        durations,
    })
}

fn check_decoded(inputs: &DecodeInputs, wave: &[f32], sampling_rate: u32) -> Result<()> {
    if let Some(index) = wave.iter().position(|s| !s.is_finite()) {
        return Err(decode_failure(format!("non-finite sample at {}", index)));
    }
    let expected_secs = inputs.durations.iter().map(|&d| d as f64).sum::<f64>();
    let expected_samples = expected_secs * sampling_rate as f64;
    // at least one sample per phoneme once there is room for it
    let minimum = if expected_samples >= inputs.len() as f64 {
        inputs.len()
    } else if expected_samples >= 1.0 {
        1
    } else {
        0
    };
    if wave.len() < minimum {
        return Err(decode_failure(format!(
            "{} samples for {} phonemes ({:.3} s)",
            wave.len(),
            inputs.len(),
            expected_secs
        )));
    }
    Ok(())
}

pub fn post_process(mut wave: Vec<f32>, native_rate: u32, query: &AudioQuery) -> Result<Waveform> {
    let volume_scale = query.volume_scale as f32;
    wave.iter_mut().for_each(|s| *s *= volume_scale);

    let mut waveform = Waveform::mono(wave, native_rate).resampled(query.output_sampling_rate)?;
    if query.output_stereo {
        waveform = waveform.into_stereo();
    }
    Ok(waveform)
}

pub struct SynthesisEngine<C> {
    core: C,
    analyzer: Option<Box<dyn TextAnalyzer + Send>>,
}

impl<C> SynthesisEngine<C>
where
    C: VoiceCore,
{
    pub fn new(core: C) -> Self {
        Self {
            core,
            analyzer: None,
        }
    }

    pub fn with_analyzer<A>(mut self, analyzer: A) -> Self
    where
        A: TextAnalyzer + Send + 'static,
    {
        self.analyzer = Some(Box::new(analyzer));
        self
    }

    pub fn core(&self) -> &C {
        &self.core
    }

    pub fn sampling_rate(&self) -> u32 {
        self.core.sampling_rate()
    }

    pub fn speakers(&self) -> Vec<Speaker> {
        self.core.speakers()
    }

    pub fn is_model_loaded(&self, speaker_id: u32) -> bool {
        self.core.is_model_loaded(speaker_id)
    }

    pub fn create_accent_phrases(&self, text: &str, speaker_id: u32) -> Result<Vec<AccentPhrase>> {
        let analyzer = self
            .analyzer
            .as_ref()
            .ok_or_else(|| SynthesisError::new(SynthesisErrorDescription::AnalyzerUnavailable))?;
        let accent_phrases = analyzer.analyze(text)?;
        let (accent_phrases, _) = predict::predict_durations(&self.core, &accent_phrases, speaker_id)?;
        predict::predict_pitches(&self.core, &accent_phrases, speaker_id)
    }

    pub fn create_audio_query(&self, text: &str, speaker_id: u32) -> Result<AudioQuery> {
        let accent_phrases = self.create_accent_phrases(text, speaker_id)?;
        let kana = create_kana(&accent_phrases);
        Ok(AudioQuery {
            accent_phrases,
            output_sampling_rate: self.sampling_rate(),
            kana: Some(kana),
            ..AudioQuery::default()
        })
    }

    pub fn replace_phoneme_length(&self, accent_phrases: &[AccentPhrase], speaker_id: u32) -> Result<Vec<AccentPhrase>> {
        let (accent_phrases, _) = predict::predict_durations(&self.core, accent_phrases, speaker_id)?;
        Ok(accent_phrases)
    }

    pub fn replace_mora_pitch(&self, accent_phrases: &[AccentPhrase], speaker_id: u32) -> Result<Vec<AccentPhrase>> {
        predict::predict_pitches(&self.core, accent_phrases, speaker_id)
    }

    pub fn replace_mora_data(&self, accent_phrases: &[AccentPhrase], speaker_id: u32) -> Result<Vec<AccentPhrase>> {
        predict::predict_mora_data(&self.core, accent_phrases, speaker_id)
    }

    /// Renders `query`. Upspeak, when enabled, is applied to a copy of the
    /// phrases; the query itself is never modified.
    pub fn synthesis(&self, query: &AudioQuery, speaker_id: u32, options: SynthesisOptions) -> Result<Waveform> {
        validate_query(query)?;

        let accent_phrases = if options.enable_interrogative_upspeak {
            apply_interrogative_upspeak(&query.accent_phrases)
        } else {
            query.accent_phrases.clone()
        };

        let inputs = match build_decode_inputs(query, &accent_phrases) {
            Ok(inputs) => inputs,
            Err(err) if err.is_empty_utterance() => {
                log::warn!("Empty utterance, returning silence");
                let channels = if query.output_stereo { 2 } else { 1 };
                return Ok(Waveform::empty(query.output_sampling_rate, channels));
            }
            Err(err) => return Err(err),
        };

        ensure_loaded(&self.core, speaker_id)?;

        let native_rate = self.core.sampling_rate();
        let wave = self.core.decode(
            inputs.len(),
            &inputs.phoneme_ids,
            &inputs.pitches,
            &inputs.durations,
            speaker_id,
        )?;
        check_decoded(&inputs, &wave, native_rate)?;

        log::debug!(
            "Decoded {} phonemes into {} samples at {} Hz (speaker {})",
            inputs.len(),
            wave.len(),
            native_rate,
            speaker_id
        );

        post_process(wave, native_rate, query)
    }

    pub fn synthesis_wav(&self, query: &AudioQuery, speaker_id: u32, options: SynthesisOptions) -> Result<Vec<u8>> {
        self.synthesis(query, speaker_id, options)?.to_wav_bytes()
    }
}

impl<C> SynthesisEngine<C>
where
    C: VoiceCore + Send + 'static,
{
    /// Erases the core type, e.g. to hand the engine to a runner thread.
    pub fn boxed(self) -> SynthesisEngine<Box<dyn VoiceCore + Send>> {
        SynthesisEngine {
            core: Box::new(self.core),
            analyzer: self.analyzer,
        }
    }
}

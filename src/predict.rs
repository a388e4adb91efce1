use crate::model::{Prediction, VoiceCore};
use crate::error::{Result, SynthesisError, SynthesisErrorDescription};
use crate::flatten::{self, FlatSequence};
use crate::phoneme;
use crate::types::AccentPhrase;

pub(crate) fn ensure_loaded<C>(core: &C, speaker_id: u32) -> Result<()>
where
    C: VoiceCore + ?Sized,
{
    if core.is_model_loaded(speaker_id) {
        Ok(())
    } else {
        Err(SynthesisError::new(SynthesisErrorDescription::ModelUnavailable(speaker_id)))
    }
}

fn run_predictor<C>(core: &C, flat: &FlatSequence, speaker_id: u32) -> Result<Prediction>
where
    C: VoiceCore + ?Sized,
{
    ensure_loaded(core, speaker_id)?;

    let phoneme_ids = flat.phoneme_ids();
    let accent_ids = flat.accent_ids();
    let prediction = core.predict(phoneme_ids.len(), &phoneme_ids, &accent_ids, speaker_id)?;

    for (kind, values) in [("durations", &prediction.durations), ("pitches", &prediction.pitches)] {
        if values.len() != phoneme_ids.len() {
            return Err(SynthesisError::new(SynthesisErrorDescription::InferenceFailed(format!(
                "predictor returned {} {} for {} phonemes",
                values.len(),
                kind,
                phoneme_ids.len()
            ))));
        }
    }

    log::debug!("Predicted prosody for {} phonemes (speaker {})", phoneme_ids.len(), speaker_id);
    Ok(prediction)
}

// index 0 is the leading sentinel
fn apply_durations(accent_phrases: &mut [AccentPhrase], durations: &[f32]) {
    let mut index = 1;
    for mora in accent_phrases.iter_mut().flat_map(AccentPhrase::moras_with_pause_mut) {
        if mora.consonant.is_some() {
            mora.consonant_length = Some(f64::from(durations[index]));
            index += 1;
        } else {
            mora.consonant_length = None;
        }
        mora.vowel_length = f64::from(durations[index]);
        index += 1;
    }
}

fn apply_pitches(accent_phrases: &mut [AccentPhrase], pitches: &[f32]) {
    let mut index = 1;
    for phrase in accent_phrases.iter_mut() {
        for mora in phrase.moras.iter_mut() {
            if mora.consonant.is_some() {
                index += 1;
            }
            mora.pitch = if phoneme::is_unvoiced_vowel(&mora.vowel) {
                0.0
            } else {
                f64::from(pitches[index])
            };
            index += 1;
        }
        if let Some(pause) = phrase.pause_mora.as_mut() {
            pause.pitch = 0.0;
            index += 1;
        }
    }
}

/// The returned [`FlatSequence`] already holds the updated moras.
pub fn predict_durations<C>(
    core: &C,
    accent_phrases: &[AccentPhrase],
    speaker_id: u32,
) -> Result<(Vec<AccentPhrase>, FlatSequence)>
where
    C: VoiceCore + ?Sized,
{
    let mut flat = flatten::pre_process(accent_phrases)?;
    if flat.is_empty() {
        return Ok((accent_phrases.to_vec(), flat));
    }

    let prediction = run_predictor(core, &flat, speaker_id)?;

    let mut accent_phrases = accent_phrases.to_vec();
    apply_durations(&mut accent_phrases, &prediction.durations);
    flat.moras = flatten::flatten_moras(&accent_phrases);
    Ok((accent_phrases, flat))
}

pub fn predict_pitches<C>(core: &C, accent_phrases: &[AccentPhrase], speaker_id: u32) -> Result<Vec<AccentPhrase>>
where
    C: VoiceCore + ?Sized,
{
    if accent_phrases.is_empty() {
        return Ok(Vec::new());
    }

    let flat = flatten::pre_process(accent_phrases)?;
    let prediction = run_predictor(core, &flat, speaker_id)?;

    let mut accent_phrases = accent_phrases.to_vec();
    apply_pitches(&mut accent_phrases, &prediction.pitches);
    Ok(accent_phrases)
}

pub fn predict_mora_data<C>(core: &C, accent_phrases: &[AccentPhrase], speaker_id: u32) -> Result<Vec<AccentPhrase>>
where
    C: VoiceCore + ?Sized,
{
    if accent_phrases.is_empty() {
        return Ok(Vec::new());
    }

    let flat = flatten::pre_process(accent_phrases)?;
    let prediction = run_predictor(core, &flat, speaker_id)?;

    let mut accent_phrases = accent_phrases.to_vec();
    apply_durations(&mut accent_phrases, &prediction.durations);
    apply_pitches(&mut accent_phrases, &prediction.pitches);
    Ok(accent_phrases)
}

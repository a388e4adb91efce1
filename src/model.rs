use parking_lot::Mutex;

use crate::error::Result;
use crate::types::{AccentPhrase, Speaker};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Prediction {
    /// Seconds.
    pub durations: Vec<f32>,
    pub pitches: Vec<f32>,
}

/// Numeric forward functions of the acoustic model.
///
/// Every call is atomic: it either returns complete arrays or an error.
pub trait VoiceCore {
    fn is_model_loaded(&self, speaker_id: u32) -> bool;

    fn predict(&self, length: usize, phoneme_ids: &[i64], accent_ids: &[i64], speaker_id: u32) -> Result<Prediction>;

    fn decode(
        &self,
        length: usize,
        phoneme_ids: &[i64],
        pitches: &[f32],
        durations: &[f32],
        speaker_id: u32,
    ) -> Result<Vec<f32>>;

    fn sampling_rate(&self) -> u32;

    fn speakers(&self) -> Vec<Speaker> {
        Vec::new()
    }
}

impl<C> VoiceCore for Box<C>
where
    C: VoiceCore + ?Sized,
{
    fn is_model_loaded(&self, speaker_id: u32) -> bool {
        (**self).is_model_loaded(speaker_id)
    }

    fn predict(&self, length: usize, phoneme_ids: &[i64], accent_ids: &[i64], speaker_id: u32) -> Result<Prediction> {
        (**self).predict(length, phoneme_ids, accent_ids, speaker_id)
    }

    fn decode(
        &self,
        length: usize,
        phoneme_ids: &[i64],
        pitches: &[f32],
        durations: &[f32],
        speaker_id: u32,
    ) -> Result<Vec<f32>> {
        (**self).decode(length, phoneme_ids, pitches, durations, speaker_id)
    }

    fn sampling_rate(&self) -> u32 {
        (**self).sampling_rate()
    }

    fn speakers(&self) -> Vec<Speaker> {
        (**self).speakers()
    }
}

/// Serialises every call into a core that cannot be entered concurrently.
pub struct SerializedCore<C> {
    inner: Mutex<C>,
    sampling_rate: u32,
}

impl<C> SerializedCore<C>
where
    C: VoiceCore,
{
    pub fn new(core: C) -> Self {
        let sampling_rate = core.sampling_rate();
        Self {
            inner: Mutex::new(core),
            sampling_rate,
        }
    }

    pub fn into_inner(self) -> C {
        self.inner.into_inner()
    }

    pub fn with_inner<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&C) -> R,
    {
        f(&self.inner.lock())
    }
}

impl<C> VoiceCore for SerializedCore<C>
where
    C: VoiceCore,
{
    fn is_model_loaded(&self, speaker_id: u32) -> bool {
        self.inner.lock().is_model_loaded(speaker_id)
    }

    fn predict(&self, length: usize, phoneme_ids: &[i64], accent_ids: &[i64], speaker_id: u32) -> Result<Prediction> {
        self.inner.lock().predict(length, phoneme_ids, accent_ids, speaker_id)
    }

    fn decode(
        &self,
        length: usize,
        phoneme_ids: &[i64],
        pitches: &[f32],
        durations: &[f32],
        speaker_id: u32,
    ) -> Result<Vec<f32>> {
        self.inner.lock().decode(length, phoneme_ids, pitches, durations, speaker_id)
    }

    fn sampling_rate(&self) -> u32 {
        self.sampling_rate
    }

    fn speakers(&self) -> Vec<Speaker> {
        self.inner.lock().speakers()
    }
}

/// Sets `is_interrogative`; durations and pitches are left for the predictor.
pub trait TextAnalyzer {
    fn analyze(&self, text: &str) -> Result<Vec<AccentPhrase>>;
}

impl<F> TextAnalyzer for F
where
    F: Fn(&str) -> Result<Vec<AccentPhrase>>,
{
    fn analyze(&self, text: &str) -> Result<Vec<AccentPhrase>> {
        self(text)
    }
}

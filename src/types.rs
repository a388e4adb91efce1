
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AudioQuery {
    pub accent_phrases: Vec<AccentPhrase>,
    #[serde(alias = "speedScale")]
    pub speed_scale: f64,
    #[serde(alias = "pitchScale")]
    pub pitch_scale: f64,
    #[serde(alias = "intonationScale")]
    pub intonation_scale: f64,
    #[serde(alias = "volumeScale")]
    pub volume_scale: f64,
    #[serde(alias = "prePhonemeLength")]
    pub pre_phoneme_length: f64,
    #[serde(alias = "postPhonemeLength")]
    pub post_phoneme_length: f64,
    #[serde(alias = "outputSamplingRate")]
    pub output_sampling_rate: u32,
    #[serde(alias = "outputStereo")]
    pub output_stereo: bool,
    #[serde(default)]
    pub kana: Option<String>,
}

impl Default for AudioQuery {
    fn default() -> Self {
        Self {
            accent_phrases: Vec::new(),
            speed_scale: 1.0,
            pitch_scale: 0.0,
            intonation_scale: 1.0,
            volume_scale: 1.0,
            pre_phoneme_length: 0.1,
            post_phoneme_length: 0.1,
            output_sampling_rate: crate::DEFAULT_SAMPLING_RATE,
            output_stereo: false,
            kana: None,
        }
    }
}

impl AudioQuery {
    pub fn new(accent_phrases: Vec<AccentPhrase>) -> Self {
        Self {
            accent_phrases,
            ..Self::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AccentPhrase {
    pub moras: Vec<Mora>,
    /// 1-based position of the accent nucleus.
    pub accent: usize,
    #[serde(default)]
    pub pause_mora: Option<Mora>,
    #[serde(default)]
    pub is_interrogative: bool,
}

impl AccentPhrase {
    pub fn new(moras: Vec<Mora>, accent: usize) -> Self {
        Self {
            moras,
            accent,
            pause_mora: None,
            is_interrogative: false,
        }
    }

    pub fn with_pause(mut self, pause: Mora) -> Self {
        self.pause_mora = Some(pause);
        self
    }

    pub fn interrogative(mut self, is_interrogative: bool) -> Self {
        self.is_interrogative = is_interrogative;
        self
    }

    pub fn moras_with_pause(&self) -> impl Iterator<Item = &Mora> {
        self.moras.iter().chain(self.pause_mora.iter())
    }

    pub fn moras_with_pause_mut(&mut self) -> impl Iterator<Item = &mut Mora> {
        self.moras.iter_mut().chain(self.pause_mora.iter_mut())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Mora {
    pub text: String,
    pub vowel: String,
    pub vowel_length: f64,
    pub pitch: f64,
    #[serde(default)]
    pub consonant: Option<String>,
    #[serde(default)]
    pub consonant_length: Option<f64>,
}

impl Mora {
    pub fn new(text: &str, consonant: Option<&str>, vowel: &str) -> Self {
        Self {
            text: text.to_string(),
            vowel: vowel.to_string(),
            vowel_length: 0.0,
            pitch: 0.0,
            consonant: consonant.map(str::to_string),
            consonant_length: consonant.map(|_| 0.0),
        }
    }

    pub fn pause() -> Self {
        Self::new("、", None, crate::phoneme::SILENCE)
    }

    pub fn is_pause(&self) -> bool {
        self.consonant.is_none() && self.vowel == crate::phoneme::SILENCE
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Speaker {
    pub speaker_id: u32,
    pub speaker_name: String,
    pub style_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisOptions {
    pub enable_interrogative_upspeak: bool,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            enable_interrogative_upspeak: true,
        }
    }
}

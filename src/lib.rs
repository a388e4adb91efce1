
pub mod accent;
pub mod model;
pub mod error;
pub mod flatten;
pub mod kana;
pub mod phoneme;
pub mod predict;
pub mod resample;
mod runner;
pub mod synthesis;
pub mod types;
pub mod upspeak;
pub mod wave;

pub mod deps {
    pub use serde_json;
    pub use serde;
}

pub use runner::*;

pub use error::{
    ErrorDescription,
    GenericError,
    Result,
    SynthesisError,
    SynthesisErrorDescription,
};

pub use crate::model::{Prediction, SerializedCore, TextAnalyzer, VoiceCore};
pub use flatten::FlatSequence;
pub use synthesis::SynthesisEngine;
pub use types::{AccentPhrase, AudioQuery, Mora, Speaker, SynthesisOptions};
pub use wave::Waveform;

pub const DEFAULT_SAMPLING_RATE: u32 = 24000;

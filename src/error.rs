
use std::error::Error;
use std::fmt::{self, Display, Debug};

pub trait ErrorDescription {
    fn description(&self) -> impl Display;

    fn error_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn code(&self) -> Option<i32> {
        None
    }
}

impl<T> ErrorDescription for T
where
    T: Display,
{
    fn description(&self) -> impl Display {
        self
    }
}

pub struct GenericError<T>(T) where T: ErrorDescription;

impl<T> GenericError<T>
where
    T: ErrorDescription,
{
    pub const fn new(err: T) -> Self {
        Self(err)
    }

    pub fn kind(&self) -> &T {
        &self.0
    }

    pub fn error_name(&self) -> &'static str {
        self.0.error_name()
    }

    pub fn code(&self) -> Option<i32> {
        self.0.code()
    }
}

impl<T> Debug for GenericError<T>
where
    T: ErrorDescription,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0.code() {
            Some(code) => write!(f, "{}[{}]: {}", self.error_name(), code, self.0.description()),
            None => write!(f, "{}: {}", self.error_name(), self.0.description()),
        }
    }
}

impl<T> Display for GenericError<T>
where
    T: ErrorDescription,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.description())
    }
}

impl<T> Error for GenericError<T> where T: ErrorDescription {}

impl<T> From<T> for GenericError<T>
where
    T: ErrorDescription,
{
    fn from(err: T) -> Self {
        Self::new(err)
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisErrorDescription {
    UnknownSymbol(String),
    ModelUnavailable(u32),
    DecodeFailure(String),
    /// Nothing but the sentinels.
    EmptyUtterance,
    /// Reported by the core itself.
    InferenceFailed(String),
    AnalyzerUnavailable,
    ResampleFailed(String),
    InvalidWave(String),
    InvalidQuery(String),
    NotInitialized,
    AlreadyInitialized,
    EngineStopped,
}

impl ErrorDescription for SynthesisErrorDescription {
    fn description(&self) -> impl Display {
        match self {
            Self::UnknownSymbol(symbol) => format!("Unknown phoneme symbol: {:?}", symbol),
            Self::ModelUnavailable(speaker_id) => format!("Model is not loaded for speaker {}", speaker_id),
            Self::DecodeFailure(reason) => format!("Decoder returned malformed output: {}", reason),
            Self::EmptyUtterance => "Utterance contains no phonemes".to_string(),
            Self::InferenceFailed(reason) => format!("Inference failed: {}", reason),
            Self::AnalyzerUnavailable => "No text analyzer is attached to the engine".to_string(),
            Self::ResampleFailed(reason) => format!("Resampling failed: {}", reason),
            Self::InvalidWave(reason) => format!("Invalid WAV data: {}", reason),
            Self::InvalidQuery(reason) => format!("Invalid audio query: {}", reason),
            Self::NotInitialized => "Engine is not initialized".to_string(),
            Self::AlreadyInitialized => "Engine is already initialized".to_string(),
            Self::EngineStopped => "Engine runner has stopped".to_string(),
        }
    }

    fn error_name(&self) -> &'static str {
        "SynthesisError"
    }

    fn code(&self) -> Option<i32> {
        let code = match self {
            Self::UnknownSymbol(_) => 1,
            Self::ModelUnavailable(_) => 2,
            Self::DecodeFailure(_) => 3,
            Self::EmptyUtterance => 4,
            Self::InferenceFailed(_) => 5,
            Self::AnalyzerUnavailable => 6,
            Self::ResampleFailed(_) => 7,
            Self::InvalidWave(_) => 8,
            Self::InvalidQuery(_) => 9,
            Self::NotInitialized => 10,
            Self::AlreadyInitialized => 11,
            Self::EngineStopped => 12,
        };
        Some(code)
    }
}

pub type SynthesisError = GenericError<SynthesisErrorDescription>;

pub type Result<T, E = SynthesisError> = std::result::Result<T, E>;

impl SynthesisError {
    pub fn is_empty_utterance(&self) -> bool {
        matches!(self.0, SynthesisErrorDescription::EmptyUtterance)
    }
}

impl From<hound::Error> for SynthesisError {
    fn from(err: hound::Error) -> Self {
        Self::new(SynthesisErrorDescription::InvalidWave(err.to_string()))
    }
}

impl From<rubato::ResampleError> for SynthesisError {
    fn from(err: rubato::ResampleError) -> Self {
        Self::new(SynthesisErrorDescription::ResampleFailed(err.to_string()))
    }
}

impl From<rubato::ResamplerConstructionError> for SynthesisError {
    fn from(err: rubato::ResamplerConstructionError) -> Self {
        Self::new(SynthesisErrorDescription::ResampleFailed(err.to_string()))
    }
}

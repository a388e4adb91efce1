
use std::fmt::Debug;
use std::sync::OnceLock;

use tokio::sync::mpsc;
use tokio::sync::oneshot;

use crate::model::VoiceCore;
use crate::error::*;
use crate::synthesis::SynthesisEngine;
use crate::types::{AudioQuery, Speaker, SynthesisOptions};
use crate::wave::Waveform;

static ENGINE: OnceLock<EngineHandle> = OnceLock::new();

const QUEUE_DEPTH: usize = 100;

pub type BoxedEngine = SynthesisEngine<Box<dyn VoiceCore + Send>>;

struct EngineRequestData<Req, Res> {
    req: Req,
    res_sender: oneshot::Sender<Res>,
}

impl<Req, Res> EngineRequestData<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    pub fn new(req: Req) -> (Self, oneshot::Receiver<Res>) {
        let (res_sender, res_receiver) = oneshot::channel();
        (Self {
            req,
            res_sender,
        }, res_receiver)
    }
}

impl<Req, Res> Debug for EngineRequestData<Req, Res>
where
    Req: Debug,
    Res: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRequestData")
            .field("req", &self.req)
            .field("res_sender", &self.res_sender)
            .finish()
    }
}

#[derive(Debug)]
enum EngineRequest {
    AudioQuery(EngineRequestData<(String, u32), Result<AudioQuery>>),
    Synthesis(EngineRequestData<(AudioQuery, u32, SynthesisOptions), Result<Waveform>>),
    Speakers(EngineRequestData<(), Vec<Speaker>>),
}

/// Owns the engine on a dedicated thread; model calls never overlap.
struct Runner {
    engine: BoxedEngine,
    receiver: mpsc::Receiver<EngineRequest>,
}

impl Runner {
    fn start(engine: BoxedEngine) -> EngineHandle {
        let (req_sender, req_receiver) = mpsc::channel(QUEUE_DEPTH);

        let runner = Runner {
            engine,
            receiver: req_receiver,
        };

        std::thread::spawn(move || {
            runner.run();
        });

        EngineHandle {
            sender: req_sender,
        }
    }

    fn run(self) {
        let engine = self.engine;
        let mut receiver = self.receiver;

        while let Some(request) = receiver.blocking_recv() {
            match request {
                EngineRequest::AudioQuery(data) => {
                    let (text, speaker_id) = data.req;
                    let res = engine.create_audio_query(&text, speaker_id);
                    if let Err(e) = &res {
                        log::error!("Failed to create audio query: {}", e);
                    }
                    let _ = data.res_sender.send(res);
                },
                EngineRequest::Synthesis(data) => {
                    let (query, speaker_id, options) = data.req;
                    log::debug!("Synthesizing {} accent phrases with speaker {}", query.accent_phrases.len(), speaker_id);
                    let res = engine.synthesis(&query, speaker_id, options);
                    if let Err(e) = &res {
                        log::error!("Synthesis failed: {}", e);
                    }
                    let _ = data.res_sender.send(res);
                },
                EngineRequest::Speakers(data) => {
                    let _ = data.res_sender.send(engine.speakers());
                },
            }
        }

        log::warn!("Runner thread exited");
    }
}

fn stopped() -> SynthesisError {
    SynthesisError::new(SynthesisErrorDescription::EngineStopped)
}

#[derive(Debug, Clone)]
pub struct EngineHandle {
    sender: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    pub fn new() -> Result<EngineHandle> {
        ENGINE.get().cloned().ok_or_else(|| SynthesisError::new(SynthesisErrorDescription::NotInitialized))
    }

    pub fn spawn<C>(engine: SynthesisEngine<C>) -> EngineHandle
    where
        C: VoiceCore + Send + 'static,
    {
        Runner::start(engine.boxed())
    }

    fn request_blocking<Req, Res>(&self, req: Req, wrap: fn(EngineRequestData<Req, Res>) -> EngineRequest) -> Result<Res>
    where
        Req: Send + 'static,
        Res: Send + 'static,
    {
        let (data, receiver) = EngineRequestData::new(req);
        self.sender.blocking_send(wrap(data)).map_err(|_| stopped())?;
        receiver.blocking_recv().map_err(|_| stopped())
    }

    async fn request<Req, Res>(&self, req: Req, wrap: fn(EngineRequestData<Req, Res>) -> EngineRequest) -> Result<Res>
    where
        Req: Send + 'static,
        Res: Send + 'static,
    {
        let (data, receiver) = EngineRequestData::new(req);
        self.sender.send(wrap(data)).await.map_err(|_| stopped())?;
        receiver.await.map_err(|_| stopped())
    }

    pub fn audio_query_blocking(&self, text: &str, speaker_id: u32) -> Result<AudioQuery> {
        self.request_blocking((text.to_owned(), speaker_id), EngineRequest::AudioQuery)?
    }

    pub async fn audio_query(&self, text: &str, speaker_id: u32) -> Result<AudioQuery> {
        self.request((text.to_owned(), speaker_id), EngineRequest::AudioQuery).await?
    }

    pub fn synthesize_blocking(&self, query: AudioQuery, speaker_id: u32, options: SynthesisOptions) -> Result<Waveform> {
        self.request_blocking((query, speaker_id, options), EngineRequest::Synthesis)?
    }

    pub async fn synthesize(&self, query: AudioQuery, speaker_id: u32, options: SynthesisOptions) -> Result<Waveform> {
        self.request((query, speaker_id, options), EngineRequest::Synthesis).await?
    }

    pub fn speakers_blocking(&self) -> Result<Vec<Speaker>> {
        self.request_blocking((), EngineRequest::Speakers)
    }

    pub async fn speakers(&self) -> Result<Vec<Speaker>> {
        self.request((), EngineRequest::Speakers).await
    }
}

pub fn initialize<C>(engine: SynthesisEngine<C>) -> Result<()>
where
    C: VoiceCore + Send + 'static,
{
    if ENGINE.get().is_some() {
        return Err(SynthesisError::new(SynthesisErrorDescription::AlreadyInitialized));
    }
    let handle = EngineHandle::spawn(engine);
    ENGINE.set(handle).map_err(|_| SynthesisError::new(SynthesisErrorDescription::AlreadyInitialized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::MockCore;
    use crate::flatten::tests::hello_hiho;
    use crate::types::AccentPhrase;

    fn engine() -> SynthesisEngine<MockCore> {
        let analyzer = |_: &str| -> Result<Vec<AccentPhrase>> { Ok(hello_hiho()) };
        SynthesisEngine::new(MockCore::new()).with_analyzer(analyzer)
    }

    #[test]
    fn test_blocking_round_trip() {
        let handle = EngineHandle::spawn(engine());
        let query = handle.audio_query_blocking("こんにちは", 1).unwrap();
        assert_eq!(query.accent_phrases.len(), 2);
        let wave = handle.synthesize_blocking(query, 1, SynthesisOptions::default()).unwrap();
        assert!(!wave.is_empty());
        assert_eq!(handle.speakers_blocking().unwrap().len(), 3);
    }

    #[test]
    fn test_errors_are_forwarded() {
        let handle = EngineHandle::spawn(engine());
        let query = handle.audio_query_blocking("こんにちは", 1).unwrap();
        let err = handle.synthesize_blocking(query, 9, SynthesisOptions::default()).unwrap_err();
        assert_eq!(err.kind(), &SynthesisErrorDescription::ModelUnavailable(9));
    }

    #[tokio::test]
    async fn test_async_requests_from_many_tasks() {
        let handle = EngineHandle::spawn(engine());
        let query = handle.audio_query("こんにちは", 1).await.unwrap();
        let tasks = (0..3)
            .map(|speaker_id| {
                let handle = handle.clone();
                let query = query.clone();
                tokio::spawn(async move { handle.synthesize(query, speaker_id, SynthesisOptions::default()).await })
            })
            .collect::<Vec<_>>();
        for task in tasks {
            let wave = task.await.unwrap().unwrap();
            assert_eq!(wave.sampling_rate, 24000);
        }
        assert_eq!(handle.speakers().await.unwrap().len(), 3);
    }

    #[test]
    fn test_global_handle() {
        initialize(engine()).unwrap();
        assert!(EngineHandle::new().is_ok());
        let err = initialize(engine()).unwrap_err();
        assert_eq!(err.kind(), &SynthesisErrorDescription::AlreadyInitialized);
    }
}

use std::future::Future;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::SpeechError;
use crate::pcm::PcmBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    /// Buffer played to the end
    Finished,
    /// Stop token fired first
    Stopped,
}

/// A buffer that is playing on a connected output
pub struct Playback {
    handle: JoinHandle<Result<PlaybackEnd, SpeechError>>,
}

impl Playback {
    pub fn spawn<F>(playing: F) -> Self
    where
        F: Future<Output = Result<PlaybackEnd, SpeechError>> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(playing),
        }
    }

    /// Wait for the buffer to end or be stopped
    pub async fn finished(self) -> Result<PlaybackEnd, SpeechError> {
        self.handle
            .await
            .map_err(|e| SpeechError::Playback(format!("playback task failed: {e}")))?
    }
}

/// Exclusive audio output for one buffer at a time
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Connect to the device and start playing `buffer` until it ends or
    /// `stop` is cancelled. Connection errors are returned here, before any
    /// audio plays.
    async fn start(&self, buffer: PcmBuffer, stop: CancellationToken) -> Result<Playback, SpeechError>;
}

/// Output for builds without an audio backend
pub struct NullOutput;

#[async_trait]
impl AudioOutput for NullOutput {
    async fn start(&self, _buffer: PcmBuffer, _stop: CancellationToken) -> Result<Playback, SpeechError> {
        Err(SpeechError::UnsupportedPlatform(
            "built without an audio output backend".to_string(),
        ))
    }
}

#[cfg(feature = "rodio-output")]
pub use self::rodio_output::RodioOutput;

#[cfg(feature = "rodio-output")]
mod rodio_output {
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::oneshot;
    use tokio_util::sync::CancellationToken;

    use super::{AudioOutput, Playback, PlaybackEnd};
    use crate::SpeechError;
    use crate::pcm::PcmBuffer;

    const STOP_POLL_INTERVAL: Duration = Duration::from_millis(20);

    /// Default output device through rodio. The stream lives on a blocking
    /// thread for the length of one playback.
    pub struct RodioOutput {
        volume: f32,
    }

    impl RodioOutput {
        pub fn new(volume: f32) -> Self {
            Self {
                volume: volume.clamp(0.0, 1.0),
            }
        }
    }

    #[async_trait]
    impl AudioOutput for RodioOutput {
        async fn start(
            &self,
            buffer: PcmBuffer,
            stop: CancellationToken,
        ) -> Result<Playback, SpeechError> {
            let volume = self.volume;
            let (connected_tx, connected_rx) = oneshot::channel();
            let worker =
                tokio::task::spawn_blocking(move || play_blocking(buffer, volume, stop, connected_tx));

            match connected_rx.await {
                Ok(Ok(())) => Ok(Playback::spawn(async move {
                    worker
                        .await
                        .map_err(|e| SpeechError::Playback(format!("playback task failed: {e}")))?
                })),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(SpeechError::Playback(
                    "playback thread exited before connecting".to_string(),
                )),
            }
        }
    }

    /// The stream is not `Send`, so it is opened and dropped on this thread.
    /// `connected` carries the open result back to the caller.
    fn play_blocking(
        buffer: PcmBuffer,
        volume: f32,
        stop: CancellationToken,
        connected: oneshot::Sender<Result<(), SpeechError>>,
    ) -> Result<PlaybackEnd, SpeechError> {
        let mut stream = match rodio::OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                let _ = connected.send(Err(SpeechError::UnsupportedPlatform(format!(
                    "failed to open audio output: {e}"
                ))));
                return Ok(PlaybackEnd::Stopped);
            }
        };
        stream.log_on_drop(false);
        let _ = connected.send(Ok(()));

        let sink = rodio::Sink::connect_new(stream.mixer());
        sink.set_volume(volume);

        tracing::debug!(
            "Playing {:?} of audio at {} Hz",
            buffer.duration(),
            buffer.sample_rate
        );
        sink.append(rodio::buffer::SamplesBuffer::new(
            buffer.channels,
            buffer.sample_rate,
            buffer.samples,
        ));

        while !sink.empty() {
            if stop.is_cancelled() {
                sink.stop();
                return Ok(PlaybackEnd::Stopped);
            }
            std::thread::sleep(STOP_POLL_INTERVAL);
        }

        Ok(PlaybackEnd::Finished)
    }
}

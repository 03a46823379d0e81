use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio_util::sync::CancellationToken;

use crate::voice::{
    NO_SPEECH, RecognitionEvent, RecognitionSession, RecognizerOptions, SpeechRecognizer, VoiceError,
};

const LOCALE_PLACEHOLDER: &str = "{locale}";

/// Streaming recognizer run as a child process.
///
/// Every stdout line is an interim transcript; the last line seen before a
/// successful exit is the final one. A non-zero exit is reported as
/// `exit-code-N`.
pub struct CommandRecognizer {
    command: String,
}

impl CommandRecognizer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn argv(&self, locale: &str) -> Option<(String, Vec<String>)> {
        let mut parts = self
            .command
            .split_whitespace()
            .map(|part| part.replace(LOCALE_PLACEHOLDER, locale));
        let program = parts.next()?;
        Some((program, parts.collect()))
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    fn is_supported(&self) -> bool {
        !self.command.trim().is_empty()
    }

    async fn start(&self, options: RecognizerOptions) -> Result<RecognitionSession, VoiceError> {
        let (program, args) = self
            .argv(&options.locale)
            .ok_or_else(|| VoiceError::UnsupportedPlatform("empty recognizer command".to_string()))?;

        tracing::debug!("Starting recognizer: {} {:?}", program, args);
        let mut child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    VoiceError::UnsupportedPlatform(format!("{program} is not installed"))
                }
                _ => VoiceError::Recognizer(format!("failed to start {program}: {e}")),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| VoiceError::Recognizer("recognizer has no stdout".to_string()))?;

        let (tx, rx) = kanal::bounded_async(32);
        let stop = CancellationToken::new();
        tokio::spawn(read_transcripts(
            child,
            stdout,
            tx,
            stop.clone(),
            options.interim_results,
        ));

        Ok(RecognitionSession { events: rx, stop })
    }
}

async fn read_transcripts(
    mut child: Child,
    stdout: ChildStdout,
    tx: kanal::AsyncSender<RecognitionEvent>,
    stop: CancellationToken,
    interim_results: bool,
) {
    let mut lines = BufReader::new(stdout).lines();
    let mut last = None;

    loop {
        let line = tokio::select! {
            biased;
            _ = stop.cancelled() => {
                let _ = child.kill().await;
                return;
            }
            line = lines.next_line() => line,
        };

        match line {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if interim_results && tx.send(RecognitionEvent::Partial(line.to_string())).await.is_err() {
                    let _ = child.kill().await;
                    return;
                }
                last = Some(line.to_string());
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed to read recognizer output: {}", e);
                let _ = child.kill().await;
                let _ = tx.send(RecognitionEvent::Error("read-failed".to_string())).await;
                return;
            }
        }
    }

    let status = tokio::select! {
        biased;
        _ = stop.cancelled() => {
            let _ = child.kill().await;
            return;
        }
        status = child.wait() => status,
    };

    let event = match status {
        Ok(status) if status.success() => match last {
            Some(transcript) => RecognitionEvent::Final(transcript),
            None => RecognitionEvent::Error(NO_SPEECH.to_string()),
        },
        Ok(status) => RecognitionEvent::Error(match status.code() {
            Some(code) => format!("exit-code-{code}"),
            None => "terminated".to_string(),
        }),
        Err(e) => {
            tracing::warn!("Failed to wait for recognizer: {}", e);
            RecognitionEvent::Error("wait-failed".to_string())
        }
    };

    let _ = tx.send(event).await;
}

/// Recognizer for hosts with no speech recognition configured
pub struct UnsupportedRecognizer;

#[async_trait]
impl SpeechRecognizer for UnsupportedRecognizer {
    fn is_supported(&self) -> bool {
        false
    }

    async fn start(&self, _options: RecognizerOptions) -> Result<RecognitionSession, VoiceError> {
        Err(VoiceError::UnsupportedPlatform(
            "no speech recognizer configured".to_string(),
        ))
    }
}

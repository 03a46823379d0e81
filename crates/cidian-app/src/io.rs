use cidian_types::{AppEvent, TextSource, UiEvent};
use kanal::AsyncSender;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

/// Watch stdin for input lines
pub async fn watcher_io(
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let source = if atty::is(atty::Stream::Stdin) {
        TextSource::Keyboard
    } else {
        TextSource::Stream
    };
    watch_lines(BufReader::new(tokio::io::stdin()), source, cancel, event_tx).await
}

/// Forward every line of `reader` as input; end of input closes the app
pub async fn watch_lines<R>(
    reader: R,
    source: TextSource,
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Input watcher stopping");
                return Ok(());
            }
            line = lines.next_line() => line?,
        };

        let Some(text) = line else {
            tracing::debug!("End of input");
            event_tx.send(AppEvent::UiEvent(UiEvent::Close)).await?;
            return Ok(());
        };

        if let Err(e) = event_tx
            .send(AppEvent::RawTextInput {
                text,
                source,
            })
            .await
        {
            tracing::error!("Failed to send input to app: {}", e);
            return Ok(());
        }
    }
}

use std::sync::Arc;

use cidian_core::state::SessionState;
use cidian_types::AppEvent;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::events::narrate::forward_narration_state;
use crate::io::watcher_io;
use crate::state::AppState;
use crate::ui::ui_loop;

/// Centralized channel management
pub struct ChannelSet {
    pub app_to_ui: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new(input_capacity: usize, output_capacity: usize) -> Self {
        Self {
            app_to_ui: kanal::bounded_async(output_capacity.max(1)),
            ui_to_app: kanal::bounded_async(input_capacity.max(1)),
        }
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub async fn new(state: Arc<AppState>) -> Self {
        let (input, output) = {
            let config = state.config.read().await;
            (config.input_channel_capacity, config.output_channel_capacity)
        };

        Self {
            channels: ChannelSet::new(input, output),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn spawn_tasks(&self, session: SessionState) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Event loop
        tasks.spawn(event_loop(
            self.state.clone(),
            session,
            self.channels.ui_to_app.1.clone(),
            self.channels.ui_to_app.0.clone(),
            self.channels.app_to_ui.0.clone(),
            // Closing from the event loop shuts everything down
            self.cancel_token.clone(),
        ));

        // UI loop
        tasks.spawn(ui_loop(
            self.channels.app_to_ui.1.clone(),
            self.state.config.clone(),
            self.cancel_token.child_token(),
        ));

        // Narration state -> UI
        tasks.spawn(forward_narration_state(
            self.state.narration.clone(),
            self.channels.app_to_ui.0.clone(),
            self.cancel_token.child_token(),
        ));

        // Stdin
        tasks.spawn(watcher_io(
            self.cancel_token.child_token(),
            self.channels.ui_to_app.0.clone(),
        ));

        tasks
    }

    /// Resolves once the app has been asked to close
    pub async fn closed(&self) {
        self.cancel_token.cancelled().await
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

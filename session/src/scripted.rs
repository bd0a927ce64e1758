//! A widget that replays fixed event scripts, for tests and offline demos.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::{SessionConfig, SessionError, SessionEvent, SessionHandle, VerificationWidget};

/// Replays one queued script per started session.
#[derive(Default)]
pub struct ScriptedWidget {
    scripts: VecDeque<Vec<SessionEvent>>,
    delay: Duration,
    keep_open: bool,
    started: Vec<SessionConfig>,
}

impl ScriptedWidget {
    pub fn new(script: Vec<SessionEvent>) -> Self {
        Self::default().then(script)
    }

    /// Queue the script for the next session.
    pub fn then(mut self, script: Vec<SessionEvent>) -> Self {
        self.scripts.push_back(script);
        self
    }

    /// Pause before each event.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Keep the event channel open after the script runs out.
    pub fn keep_open(mut self) -> Self {
        self.keep_open = true;
        self
    }

    /// Configs of every session started so far.
    pub fn started(&self) -> &[SessionConfig] {
        &self.started
    }
}

impl VerificationWidget for ScriptedWidget {
    fn start(&mut self, config: &SessionConfig) -> Result<SessionHandle, SessionError> {
        let script = self
            .scripts
            .pop_front()
            .ok_or_else(|| SessionError::Widget("no scripted session left".into()))?;
        self.started.push(config.clone());

        let (tx, rx) = mpsc::channel(script.len().max(1));
        let delay = self.delay;
        let keep_open = self.keep_open;
        tokio::spawn(async move {
            for event in script {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if tx.send(event).await.is_err() {
                    return;
                }
            }
            if keep_open {
                tx.closed().await;
            }
        });

        Ok(SessionHandle { events: rx })
    }
}

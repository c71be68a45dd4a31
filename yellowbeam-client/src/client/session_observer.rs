use crate::session::{Controls, Notice};
use async_trait::async_trait;

/// The user-facing side of a session.
#[async_trait]
pub trait SessionObserver: Send + Sync + 'static {
    /// Asks whether to accept a call from `from`. Runs on its own task, so
    /// it may block on user input without stalling signaling.
    async fn confirm_incoming_call(&self, from: &str) -> bool;

    fn on_controls(&self, _controls: Controls) {}

    fn on_notice(&self, _notice: &Notice) {}
}

/// Answers every incoming call the same way without asking.
#[derive(Debug, Clone, Copy)]
pub struct AutoAnswer {
    pub accept: bool,
}

impl AutoAnswer {
    pub fn accept() -> Self {
        Self { accept: true }
    }

    pub fn reject() -> Self {
        Self { accept: false }
    }
}

#[async_trait]
impl SessionObserver for AutoAnswer {
    async fn confirm_incoming_call(&self, _from: &str) -> bool {
        self.accept
    }
}

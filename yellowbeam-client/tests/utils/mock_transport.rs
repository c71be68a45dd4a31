use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use yellowbeam_client::{SignalingTransport, TransportError};
use yellowbeam_core::{SignalMessage, decode};

/// Mock SignalingTransport that captures every outbound frame.
#[derive(Clone)]
pub struct MockTransport {
    sent: Arc<Mutex<Vec<String>>>,
    open: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    /// All frames sent so far, decoded.
    pub async fn sent_messages(&self) -> Vec<SignalMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|text| decode(text).expect("client sent an undecodable frame"))
            .collect()
    }

    pub async fn count_sent(&self, pred: impl Fn(&SignalMessage) -> bool) -> usize {
        self.sent_messages().await.iter().filter(|m| pred(*m)).count()
    }

    /// Wait until at least `count` sent frames match `pred`.
    pub async fn wait_for_sent(
        &self,
        pred: impl Fn(&SignalMessage) -> bool,
        count: usize,
        timeout_ms: u64,
    ) -> bool {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        while start.elapsed() < timeout {
            if self.count_sent(&pred).await >= count {
                return true;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        false
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalingTransport for MockTransport {
    async fn send_text(&self, text: String) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::NotOpen);
        }
        tracing::debug!("[MockTransport] send {text}");
        self.sent.lock().await.push(text);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    async fn close(&self) {
        self.open.store(false, Ordering::Release);
    }
}

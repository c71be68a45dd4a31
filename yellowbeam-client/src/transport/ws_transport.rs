use crate::transport::{SignalingTransport, TransportError};
use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::MaybeTlsStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

type WsStream = tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

const INBOUND_CAPACITY: usize = 100;

/// WebSocket signaling connection over `tokio-tungstenite`.
///
/// Text frames from the server are forwarded to the receiver returned by
/// [`WsTransport::connect`]; the receiver ends when the connection does.
#[derive(Clone)]
pub struct WsTransport {
    writer: Arc<Mutex<SplitSink<WsStream, Message>>>,
    open: Arc<AtomicBool>,
}

impl std::fmt::Debug for WsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsTransport")
            .field("open", &self.is_open())
            .finish()
    }
}

impl WsTransport {
    pub async fn connect(url: &str) -> Result<(Self, mpsc::Receiver<String>), TransportError> {
        info!("Connecting to signaling server at {url}");

        let (ws_stream, response) =
            tokio_tungstenite::connect_async(url)
                .await
                .map_err(|e| TransportError::Connect {
                    url: url.to_owned(),
                    reason: e.to_string(),
                })?;

        info!("Signaling connection open (HTTP {})", response.status());

        let (writer, mut reader) = ws_stream.split();
        let open = Arc::new(AtomicBool::new(true));
        let transport = Self {
            writer: Arc::new(Mutex::new(writer)),
            open: open.clone(),
        };

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);
        tokio::spawn(async move {
            while let Some(frame) = reader.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        if inbound_tx.send(text.as_str().to_owned()).await.is_err() {
                            debug!("Inbound channel closed, stopping reader");
                            break;
                        }
                    }
                    Ok(Message::Binary(data)) => {
                        debug!("Ignoring binary frame ({} bytes)", data.len());
                    }
                    Ok(Message::Close(frame)) => {
                        info!("Signaling server closed the connection: {frame:?}");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Signaling connection error: {e}");
                        break;
                    }
                }
            }
            open.store(false, Ordering::Release);
            debug!("Signaling reader finished");
        });

        Ok((transport, inbound_rx))
    }
}

#[async_trait]
impl SignalingTransport for WsTransport {
    async fn send_text(&self, text: String) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::NotOpen);
        }
        self.writer
            .lock()
            .await
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    async fn close(&self) {
        if !self.open.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Err(e) = self.writer.lock().await.close().await {
            debug!("Error while closing signaling connection: {e}");
        }
    }
}

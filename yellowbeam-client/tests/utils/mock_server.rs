use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Minimal signaling server on `/call` that accepts every registration,
/// answers every call and knows no streams.
pub struct MockServer {
    pub url: String,
    received: Arc<Mutex<Vec<Value>>>,
}

impl MockServer {
    pub async fn spawn() -> anyhow::Result<Self> {
        let received = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/call", get(ws_handler))
            .with_state(received.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            url: format!("ws://{addr}/call"),
            received,
        })
    }

    pub async fn received_ids(&self) -> Vec<String> {
        self.received
            .lock()
            .await
            .iter()
            .filter_map(|v| v["id"].as_str().map(str::to_owned))
            .collect()
    }

    pub async fn received(&self) -> Vec<Value> {
        self.received.lock().await.clone()
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(received): State<Arc<Mutex<Vec<Value>>>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, received))
}

async fn handle_socket(mut socket: WebSocket, received: Arc<Mutex<Vec<Value>>>) {
    while let Some(Ok(msg)) = socket.recv().await {
        let Message::Text(text) = msg else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        received.lock().await.push(value.clone());

        let reply = match value["id"].as_str() {
            Some("register") => json!({ "id": "registerResponse", "response": "accepted" }),
            Some("call") => json!({
                "id": "callResponse",
                "response": "accepted",
                "sdpAnswer": format!("answer-to-{}", value["sdpOffer"].as_str().unwrap_or_default()),
            }),
            Some("discoverStreams") => json!({
                "id": "discoverStreamResponse",
                "response": "rejected",
                "message": "Unkown Stream Identifier",
            }),
            _ => continue,
        };

        if socket
            .send(Message::Text(reply.to_string().into()))
            .await
            .is_err()
        {
            break;
        }
    }
}

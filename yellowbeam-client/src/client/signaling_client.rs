use crate::client::peer_worker::{PeerOp, PeerWorker};
use crate::client::{ClientCommand, ClientConfig, ClientHandle, SessionObserver, SessionRequest};
use crate::peer::{PeerConnector, PeerEvent};
use crate::session::{
    Generation, PeerCommand, Session, SessionEffect, SessionError, SessionSnapshot,
};
use crate::transport::{SignalingTransport, TransportError, WsTransport};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};
use yellowbeam_core::{SignalMessage, encode};

const COMMAND_CAPACITY: usize = 64;

type Reply = (oneshot::Sender<Result<(), SessionError>>, Result<(), SessionError>);

/// Event loop that owns a [`Session`] and performs its effects.
///
/// Server frames, user commands and peer events are applied one at a time;
/// after each, the queued effects are executed in order and a fresh
/// [`SessionSnapshot`] is published.
pub struct SignalingClient {
    session: Session,
    config: ClientConfig,
    transport: Arc<dyn SignalingTransport>,
    inbound_rx: mpsc::Receiver<String>,
    command_rx: mpsc::Receiver<ClientCommand>,
    command_tx: mpsc::WeakSender<ClientCommand>,
    peer_event_rx: mpsc::UnboundedReceiver<PeerEvent>,
    peer_event_tx: mpsc::UnboundedSender<PeerEvent>,
    connector: Arc<dyn PeerConnector>,
    observer: Arc<dyn SessionObserver>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    peer: Option<PeerWorker>,
}

impl SignalingClient {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn SignalingTransport>,
        inbound_rx: mpsc::Receiver<String>,
        connector: Arc<dyn PeerConnector>,
        observer: Arc<dyn SessionObserver>,
    ) -> (Self, ClientHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (peer_event_tx, peer_event_rx) = mpsc::unbounded_channel();
        let session = Session::new();
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

        let client = Self {
            session,
            config,
            transport,
            inbound_rx,
            command_rx,
            command_tx: command_tx.downgrade(),
            peer_event_rx,
            peer_event_tx,
            connector,
            observer,
            snapshot_tx,
            peer: None,
        };

        (client, ClientHandle::new(command_tx, snapshot_rx))
    }

    /// Opens a WebSocket to `config.server_url` and builds a client on it.
    pub async fn connect(
        config: ClientConfig,
        connector: Arc<dyn PeerConnector>,
        observer: Arc<dyn SessionObserver>,
    ) -> Result<(Self, ClientHandle), TransportError> {
        let (transport, inbound_rx) = WsTransport::connect(config.server_url.as_str()).await?;
        Ok(Self::new(
            config,
            Arc::new(transport),
            inbound_rx,
            connector,
            observer,
        ))
    }

    pub async fn run(mut self) {
        info!("Signaling client loop started");
        self.observer.on_controls(self.session.controls());

        let transport_lost = loop {
            let mut reply = None;

            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(ClientCommand::Shutdown) => {
                            info!("Shutdown requested");
                            break false;
                        }
                        Some(c) => reply = self.handle_command(c),
                        None => {
                            info!("All client handles dropped. Shutting down.");
                            break false;
                        }
                    }
                }

                frame = self.inbound_rx.recv() => {
                    match frame {
                        Some(text) => {
                            debug!("Received message: {text}");
                            self.session.handle_frame(&text);
                        }
                        None => {
                            warn!("Signaling connection closed");
                            break true;
                        }
                    }
                }

                Some(event) = self.peer_event_rx.recv() => {
                    self.session.handle_peer_event(event);
                }
            }

            self.flush_effects().await;

            if let Some((tx, result)) = reply {
                let _ = tx.send(result);
            }
        };

        if !transport_lost {
            self.session.request_stop();
        }
        self.session.handle_transport_closed();
        self.flush_effects().await;
        self.transport.close().await;
        info!("Signaling client loop finished");
    }

    fn handle_command(&mut self, cmd: ClientCommand) -> Option<Reply> {
        match cmd {
            ClientCommand::Request { request, reply } => {
                let result = self.apply_request(request);
                if let Err(e) = &result {
                    warn!("Request refused: {e}");
                }
                Some((reply, result))
            }
            ClientCommand::AnswerIncomingCall { from, accept } => {
                if self.session.pending_caller() != Some(from.as_str()) {
                    debug!(from, "Ignoring stale answer to an incoming call");
                    return None;
                }
                let result = if accept {
                    self.session.accept_incoming_call()
                } else {
                    self.session
                        .reject_incoming_call(&self.config.decline_message)
                };
                if let Err(e) = result {
                    warn!("Failed to answer incoming call: {e}");
                }
                None
            }
            ClientCommand::Shutdown => None,
        }
    }

    fn apply_request(&mut self, request: SessionRequest) -> Result<(), SessionError> {
        match request {
            SessionRequest::Register(name) => self.session.request_register(&name),
            SessionRequest::Call(peer) => self.session.request_call(&peer),
            SessionRequest::AcceptIncomingCall => self.session.accept_incoming_call(),
            SessionRequest::RejectIncomingCall(reason) => {
                let reason = reason.unwrap_or_else(|| self.config.decline_message.clone());
                self.session.reject_incoming_call(&reason)
            }
            SessionRequest::Stop => {
                self.session.request_stop();
                Ok(())
            }
            SessionRequest::StartStreaming(stream) => {
                self.session.request_start_streaming(&stream)
            }
            SessionRequest::StopStreaming => self.session.request_stop_streaming(),
            SessionRequest::DiscoverStreams(stream) => {
                self.session.request_discover_streams(&stream)
            }
            SessionRequest::EnterStream(stream) => self.session.request_enter_stream(&stream),
        }
    }

    async fn flush_effects(&mut self) {
        while let Some(effect) = self.session.poll_effect() {
            match effect {
                SessionEffect::Send(msg) => self.send(msg).await,
                SessionEffect::Peer(command) => self.execute_peer_command(command),
                SessionEffect::Controls(controls) => self.observer.on_controls(controls),
                SessionEffect::PromptIncomingCall { from } => self.spawn_prompt(from),
                SessionEffect::Notice(notice) => self.observer.on_notice(&notice),
            }
        }

        let snapshot = self.session.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }

    async fn send(&self, msg: SignalMessage) {
        let id = msg.id();
        let text = match encode(&msg) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to encode {id}: {e}");
                return;
            }
        };

        debug!("Sending message: {text}");
        if let Err(e) = self.transport.send_text(text).await {
            warn!("Dropping outbound {id}: {e}");
        }
    }

    fn execute_peer_command(&mut self, command: PeerCommand) {
        match command {
            PeerCommand::Create { generation, config } => {
                if let Some(previous) = self.peer.take() {
                    previous.dispose();
                }
                self.peer = Some(PeerWorker::spawn(
                    generation,
                    config,
                    self.connector.clone(),
                    self.peer_event_tx.clone(),
                ));
            }
            PeerCommand::GenerateOffer { generation } => {
                self.submit(generation, PeerOp::GenerateOffer)
            }
            PeerCommand::ProcessAnswer {
                generation,
                sdp_answer,
            } => self.submit(generation, PeerOp::ProcessAnswer(sdp_answer)),
            PeerCommand::AddIceCandidate {
                generation,
                candidate,
            } => self.submit(generation, PeerOp::AddIceCandidate(candidate)),
            PeerCommand::Dispose { generation } => {
                if let Some(peer) = self.peer.take_if(|p| p.generation() == generation) {
                    peer.dispose();
                }
            }
        }
    }

    fn submit(&self, generation: Generation, op: PeerOp) {
        match &self.peer {
            Some(peer) if peer.generation() == generation => peer.submit(op),
            _ => debug!(%generation, "No live peer for operation, dropping it"),
        }
    }

    fn spawn_prompt(&self, from: String) {
        let observer = self.observer.clone();
        let command_tx = self.command_tx.clone();

        tokio::spawn(async move {
            let accept = observer.confirm_incoming_call(&from).await;
            let Some(tx) = command_tx.upgrade() else {
                return;
            };
            let _ = tx
                .send(ClientCommand::AnswerIncomingCall { from, accept })
                .await;
        });
    }
}

use crate::peer::{
    MediaDirection, NegotiationError, PeerConfig, PeerConnector, PeerEventSink, PeerNegotiator,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use yellowbeam_core::{IceCandidate, IceServerConfig};

/// Builds [`WebRtcPeer`]s against a fixed set of ICE servers.
#[derive(Debug, Clone)]
pub struct WebRtcConnector {
    ice_servers: Vec<IceServerConfig>,
}

impl WebRtcConnector {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self { ice_servers }
    }
}

#[async_trait]
impl PeerConnector for WebRtcConnector {
    async fn create(
        &self,
        config: PeerConfig,
        sink: PeerEventSink,
    ) -> Result<Box<dyn PeerNegotiator>, NegotiationError> {
        let peer = WebRtcPeer::new(&self.ice_servers, &config, sink)
            .await
            .map_err(|e| NegotiationError::Create(format!("{e:#}")))?;
        Ok(Box::new(peer))
    }
}

pub struct WebRtcPeer {
    peer_connection: Arc<RTCPeerConnection>,
    /// Remote candidates received before the remote description was set.
    pending_candidates: Mutex<Vec<RTCIceCandidateInit>>,
    closed: AtomicBool,
}

impl WebRtcPeer {
    pub async fn new(
        ice_servers: &[IceServerConfig],
        config: &PeerConfig,
        sink: PeerEventSink,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers.iter().map(rtc_ice_server).collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let direction = transceiver_direction(config.direction);
        if config.audio {
            peer_connection
                .add_transceiver_from_kind(
                    RTPCodecType::Audio,
                    Some(RTCRtpTransceiverInit {
                        direction,
                        send_encodings: vec![],
                    }),
                )
                .await
                .context("Failed to add audio transceiver")?;
        }
        for _ in 0..config.video_sinks {
            peer_connection
                .add_transceiver_from_kind(
                    RTPCodecType::Video,
                    Some(RTCRtpTransceiverInit {
                        direction,
                        send_encodings: vec![],
                    }),
                )
                .await
                .context("Failed to add video transceiver")?;
        }

        let state_sink = sink.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let sink = state_sink.clone();

                Box::pin(async move {
                    info!(generation = %sink.generation(), "Peer connection state changed: {s}");
                    if s == RTCPeerConnectionState::Failed {
                        sink.failed(NegotiationError::Connection(s.to_string()));
                    }
                })
            },
        ));

        let ice_sink = sink;
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let sink = ice_sink.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                sink.candidate(IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                });
            })
        }));

        Ok(Self {
            peer_connection,
            pending_candidates: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl PeerNegotiator for WebRtcPeer {
    async fn generate_offer(&self) -> Result<String, NegotiationError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(|e| NegotiationError::Offer(e.to_string()))?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .map_err(|e| NegotiationError::Offer(e.to_string()))?;
        Ok(offer.sdp)
    }

    async fn process_answer(&self, sdp_answer: String) -> Result<(), NegotiationError> {
        // Held until the queue is drained; add_ice_candidate checks the
        // remote description under the same lock.
        let mut pending = self.pending_candidates.lock().await;

        let answer = RTCSessionDescription::answer(sdp_answer)
            .map_err(|e| NegotiationError::Answer(e.to_string()))?;
        self.peer_connection
            .set_remote_description(answer)
            .await
            .map_err(|e| NegotiationError::Answer(e.to_string()))?;

        for candidate in pending.drain(..) {
            if let Err(e) = self.peer_connection.add_ice_candidate(candidate).await {
                warn!("Failed to add queued ICE candidate: {e}");
            }
        }
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), NegotiationError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: None,
        };

        let mut pending = self.pending_candidates.lock().await;
        if self.peer_connection.remote_description().await.is_none() {
            debug!("Remote description not set yet, queueing ICE candidate");
            pending.push(init);
            return Ok(());
        }
        drop(pending);

        self.peer_connection
            .add_ice_candidate(init)
            .await
            .map_err(|e| NegotiationError::Candidate(e.to_string()))
    }

    async fn dispose(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Err(e) = self.peer_connection.close().await {
            warn!("Failed to close peer connection: {e}");
        }
    }
}

fn rtc_ice_server(server: &IceServerConfig) -> RTCIceServer {
    RTCIceServer {
        urls: server.urls.clone(),
        username: server.username.clone().unwrap_or_default(),
        credential: server.credential.clone().unwrap_or_default(),
    }
}

fn transceiver_direction(direction: MediaDirection) -> RTCRtpTransceiverDirection {
    match direction {
        MediaDirection::SendRecv => RTCRtpTransceiverDirection::Sendrecv,
        MediaDirection::SendOnly => RTCRtpTransceiverDirection::Sendonly,
        MediaDirection::RecvOnly => RTCRtpTransceiverDirection::Recvonly,
    }
}

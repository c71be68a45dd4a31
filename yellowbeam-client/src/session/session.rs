use crate::peer::{NegotiationError, PeerEvent};
use crate::session::{
    CallState, Controls, Generation, Negotiation, NegotiationPhase, NegotiationPurpose,
    NegotiationRole, Notice, PeerCommand, RegistrationState, SessionEffect, SessionError,
    SessionSnapshot, StreamingState,
};
use std::collections::VecDeque;
use tracing::{debug, error, info, warn};
use yellowbeam_core::utils::BUSY_REASON;
use yellowbeam_core::{CallDecision, IceCandidate, ResponseStatus, SignalMessage, decode};

const UNKNOWN_REASON: &str = "Unknown reason";

/// Client side of the signaling protocol.
///
/// Holds the registration, call and streaming states plus at most one peer
/// negotiation. Inputs are user requests, decoded server frames and peer
/// events; outputs are queued [`SessionEffect`]s drained with
/// [`Session::poll_effect`]. No I/O happens here.
#[derive(Debug, Default)]
pub struct Session {
    registration: RegistrationState,
    call: CallState,
    streaming: StreamingState,
    local_name: Option<String>,
    remote_peer: Option<String>,
    pending_caller: Option<String>,
    pending_discovery: Option<String>,
    negotiation: Option<Negotiation>,
    last_generation: u64,
    effects: VecDeque<SessionEffect>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registration(&self) -> RegistrationState {
        self.registration
    }

    pub fn call(&self) -> CallState {
        self.call
    }

    pub fn streaming(&self) -> StreamingState {
        self.streaming
    }

    pub fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    pub fn remote_peer_name(&self) -> Option<&str> {
        self.remote_peer.as_deref()
    }

    /// True when `generation` belongs to the current negotiation.
    pub fn is_live(&self, generation: Generation) -> bool {
        self.negotiation
            .as_ref()
            .is_some_and(|n| n.generation() == generation)
    }

    pub fn controls(&self) -> Controls {
        Controls::from_states(self.registration, self.call, self.streaming)
    }

    pub fn negotiation(&self) -> Option<&Negotiation> {
        self.negotiation.as_ref()
    }

    /// Caller whose incoming call is waiting for the user's answer.
    pub fn pending_caller(&self) -> Option<&str> {
        self.pending_caller.as_deref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            registration: self.registration,
            call: self.call,
            streaming: self.streaming,
            local_name: self.local_name.clone(),
            remote_peer: self.remote_peer.clone(),
            negotiation: self.negotiation.as_ref().map(Negotiation::role),
        }
    }

    pub fn poll_effect(&mut self) -> Option<SessionEffect> {
        self.effects.pop_front()
    }

    pub fn drain_effects(&mut self) -> Vec<SessionEffect> {
        self.effects.drain(..).collect()
    }

    // ---- user requests ----

    pub fn request_register(&mut self, name: &str) -> Result<(), SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }
        if self.registration != RegistrationState::NotRegistered {
            return Err(SessionError::AlreadyRegistered);
        }

        info!(name, "registering");
        self.local_name = Some(name.to_owned());
        self.set_registration_state(RegistrationState::Registering);
        self.send(SignalMessage::Register {
            name: name.to_owned(),
        });
        Ok(())
    }

    pub fn request_call(&mut self, peer: &str) -> Result<(), SessionError> {
        let peer = peer.trim();
        if peer.is_empty() {
            return Err(SessionError::EmptyPeerName);
        }
        if self.registration != RegistrationState::Registered {
            return Err(SessionError::NotRegistered);
        }
        if self.is_busy() {
            return Err(SessionError::Busy);
        }

        info!(peer, "calling");
        self.set_call_state(CallState::ProcessingCall);
        self.remote_peer = Some(peer.to_owned());
        self.begin_negotiation(NegotiationPurpose::OutgoingCall {
            to: peer.to_owned(),
        });
        Ok(())
    }

    pub fn accept_incoming_call(&mut self) -> Result<(), SessionError> {
        if self.negotiation.is_some() {
            return Err(SessionError::Busy);
        }
        let Some(from) = self.pending_caller.take() else {
            return Err(SessionError::NoIncomingCall);
        };

        info!(from, "accepting incoming call");
        self.begin_negotiation(NegotiationPurpose::IncomingCall { from });
        Ok(())
    }

    pub fn reject_incoming_call(&mut self, reason: &str) -> Result<(), SessionError> {
        let Some(from) = self.pending_caller.take() else {
            return Err(SessionError::NoIncomingCall);
        };

        info!(from, reason, "rejecting incoming call");
        self.send(SignalMessage::IncomingCallResponse {
            from,
            call_response: CallDecision::Reject,
            message: Some(reason.to_owned()),
            sdp_offer: None,
        });
        self.stop(false);
        Ok(())
    }

    /// Hangs up whatever is in progress. Always allowed.
    pub fn request_stop(&mut self) {
        info!("stopping");
        self.pending_discovery = None;
        self.stop(true);
    }

    pub fn request_start_streaming(&mut self, stream: &str) -> Result<(), SessionError> {
        let stream = stream.trim();
        if stream.is_empty() {
            return Err(SessionError::EmptyStreamName);
        }
        if self.streaming != StreamingState::NoStreaming {
            return Err(SessionError::StreamingInProgress);
        }

        info!(stream, "starting streaming");
        self.set_streaming_state(StreamingState::ProcessingStreaming);
        self.send(SignalMessage::InitStream {
            stream: stream.to_owned(),
        });
        Ok(())
    }

    pub fn request_stop_streaming(&mut self) -> Result<(), SessionError> {
        if self.streaming != StreamingState::InStreaming {
            return Err(SessionError::NotStreaming);
        }

        info!("stopping streaming");
        self.set_streaming_state(StreamingState::NoStreaming);
        self.send(SignalMessage::StopStream);
        Ok(())
    }

    pub fn request_discover_streams(&mut self, stream: &str) -> Result<(), SessionError> {
        let stream = stream.trim();
        if stream.is_empty() {
            return Err(SessionError::EmptyStreamName);
        }
        if self.is_busy() || self.pending_discovery.is_some() {
            return Err(SessionError::Busy);
        }

        info!(stream, "discovering stream");
        self.pending_discovery = Some(stream.to_owned());
        self.send(SignalMessage::DiscoverStreams {
            stream: stream.to_owned(),
        });
        Ok(())
    }

    pub fn request_enter_stream(&mut self, stream: &str) -> Result<(), SessionError> {
        let stream = stream.trim();
        if stream.is_empty() {
            return Err(SessionError::EmptyStreamName);
        }
        if self.is_busy() {
            return Err(SessionError::Busy);
        }

        info!(stream, "entering stream");
        self.begin_negotiation(NegotiationPurpose::EnterStream {
            stream: stream.to_owned(),
        });
        Ok(())
    }

    // ---- inbound ----

    /// Decodes one text frame and applies it. Frames that do not decode are
    /// logged and dropped without touching any state.
    pub fn handle_frame(&mut self, text: &str) {
        match decode(text) {
            Ok(msg) => self.handle_message(msg),
            Err(e) if e.is_forward_compatible() => {
                debug!("Unrecognized message dropped: {e}");
            }
            Err(e) => warn!("Dropping malformed signaling frame: {e}"),
        }
    }

    pub fn handle_message(&mut self, msg: SignalMessage) {
        debug!(id = msg.id(), "handling server message");

        match msg {
            SignalMessage::RegisterResponse { response, message } => {
                self.on_register_response(response, message)
            }
            SignalMessage::CallResponse {
                response,
                sdp_answer,
                message,
            } => self.on_call_response(response, sdp_answer, message),
            SignalMessage::IncomingCall { from } => self.on_incoming_call(from),
            SignalMessage::StartCommunication { sdp_answer } => {
                self.on_start_communication(sdp_answer)
            }
            SignalMessage::StopCommunication => {
                info!("communication ended by remote peer");
                self.stop(false);
                self.notify(Notice::RemoteHangup);
            }
            SignalMessage::ViewerRequest { from } => self.on_viewer_request(from),
            SignalMessage::IceCandidate { candidate } => self.on_remote_candidate(candidate),
            SignalMessage::InitStreamResponse { response, message } => {
                self.on_init_stream_response(response, message)
            }
            SignalMessage::DiscoverStreamResponse {
                response,
                videos,
                message,
            } => self.on_discover_response("discoverStreamResponse", response, videos, message),
            SignalMessage::DiscoverStreamsResponse {
                response,
                videos,
                message,
            } => self.on_discover_response("discoverStreamsResponse", response, videos, message),
            SignalMessage::StreamResponse {
                response,
                sdp_answer,
                message,
            } => self.on_stream_response(response, sdp_answer, message),

            other @ (SignalMessage::Register { .. }
            | SignalMessage::Call { .. }
            | SignalMessage::IncomingCallResponse { .. }
            | SignalMessage::Stop
            | SignalMessage::DiscoverStreams { .. }
            | SignalMessage::InitStream { .. }
            | SignalMessage::StopStream
            | SignalMessage::ViewerResponse { .. }
            | SignalMessage::OnIceCandidate { .. }
            | SignalMessage::EnterStream { .. }
            | SignalMessage::StreamRequest { .. }
            | SignalMessage::Error { .. }
            | SignalMessage::StopViewing) => {
                warn!(id = other.id(), "ignoring server-bound message echoed by the server");
            }
        }
    }

    pub fn handle_peer_event(&mut self, event: PeerEvent) {
        let generation = event.generation();
        if !self.is_live(generation) {
            debug!(%generation, "ignoring event from a disposed peer");
            return;
        }

        match event {
            PeerEvent::Created { result: Ok(()), .. } => self.on_peer_created(),
            PeerEvent::OfferGenerated { result: Ok(sdp), .. } => self.on_offer_generated(sdp),
            PeerEvent::AnswerProcessed { result: Ok(()), .. } => {
                info!(%generation, "remote answer applied");
            }
            PeerEvent::CandidateAdded { result, .. } => {
                if let Err(e) = result {
                    warn!(%generation, "failed to add remote ICE candidate: {e}");
                }
            }
            PeerEvent::LocalCandidate { candidate, .. } => {
                debug!(%generation, "sending local ICE candidate");
                self.send(SignalMessage::OnIceCandidate { candidate });
            }
            PeerEvent::Created { result: Err(e), .. }
            | PeerEvent::OfferGenerated { result: Err(e), .. }
            | PeerEvent::AnswerProcessed { result: Err(e), .. }
            | PeerEvent::Failed { error: e, .. } => self.fail_negotiation(e),
        }
    }

    /// The signaling connection is gone; nothing can be negotiated anymore.
    pub fn handle_transport_closed(&mut self) {
        warn!("signaling transport closed, resetting session");
        self.pending_discovery = None;
        self.stop(false);
        if self.streaming != StreamingState::NoStreaming {
            self.set_streaming_state(StreamingState::NoStreaming);
        }
        if self.registration != RegistrationState::NotRegistered {
            self.local_name = None;
            self.set_registration_state(RegistrationState::NotRegistered);
        }
    }

    // ---- server message handlers ----

    fn on_register_response(&mut self, response: ResponseStatus, message: Option<String>) {
        if self.registration != RegistrationState::Registering {
            debug!("ignoring registerResponse outside of registration");
            return;
        }

        if response.is_accepted() {
            info!(name = ?self.local_name, "registered");
            self.set_registration_state(RegistrationState::Registered);
            return;
        }

        let reason = rejection_reason(&response, message);
        warn!(reason, "registration rejected");
        self.local_name = None;
        self.set_registration_state(RegistrationState::NotRegistered);
        self.notify(Notice::RegistrationRejected { reason });
    }

    fn on_call_response(
        &mut self,
        response: ResponseStatus,
        sdp_answer: Option<String>,
        message: Option<String>,
    ) {
        let calling = self.call == CallState::ProcessingCall
            && self.role() == Some(NegotiationRole::Caller);
        if !calling {
            debug!("ignoring callResponse without an outgoing call");
            return;
        }

        if !response.is_accepted() {
            let reason = rejection_reason(&response, message);
            info!(reason, "call not accepted by peer");
            self.notify(Notice::CallRejected { reason });
            self.stop(true);
            return;
        }

        match sdp_answer {
            Some(sdp) => {
                self.apply_answer(sdp);
                self.set_call_state(CallState::InCall);
            }
            None => self.fail_negotiation(NegotiationError::MissingAnswer),
        }
    }

    fn on_incoming_call(&mut self, from: String) {
        if self.is_busy() {
            info!(from, "busy, rejecting incoming call");
            self.send(SignalMessage::IncomingCallResponse {
                from,
                call_response: CallDecision::Reject,
                message: Some(BUSY_REASON.to_owned()),
                sdp_offer: None,
            });
            return;
        }

        info!(from, "incoming call");
        self.set_call_state(CallState::ProcessingCall);
        self.remote_peer = Some(from.clone());
        self.pending_caller = Some(from.clone());
        self.effects
            .push_back(SessionEffect::PromptIncomingCall { from });
    }

    fn on_start_communication(&mut self, sdp_answer: String) {
        let awaiting = self
            .negotiation
            .as_ref()
            .is_some_and(|n| n.phase() == NegotiationPhase::AwaitingAnswer);

        match self.role() {
            Some(NegotiationRole::Callee) if awaiting => {
                self.apply_answer(sdp_answer);
                self.set_call_state(CallState::InCall);
            }
            Some(NegotiationRole::Broadcaster) if awaiting => self.apply_answer(sdp_answer),
            _ => debug!("ignoring startCommunication without a pending answer"),
        }
    }

    fn on_viewer_request(&mut self, from: String) {
        if self.is_busy() {
            info!(from, "busy, rejecting viewer");
            self.send(SignalMessage::ViewerResponse {
                call_response: CallDecision::Reject,
                from: Some(from),
                sdp_offer: None,
            });
            return;
        }

        info!(viewer = from, "serving viewer");
        self.begin_negotiation(NegotiationPurpose::ServeViewer { viewer: from });
    }

    fn on_remote_candidate(&mut self, candidate: IceCandidate) {
        let Some(negotiation) = self.negotiation.as_mut() else {
            warn!("ICE candidate arrived before any negotiation, dropping it");
            return;
        };

        if negotiation.phase() == NegotiationPhase::Creating {
            debug!("peer not created yet, queueing remote ICE candidate");
            negotiation.queue_candidate(candidate);
            return;
        }

        let generation = negotiation.generation();
        self.peer(PeerCommand::AddIceCandidate {
            generation,
            candidate,
        });
    }

    fn on_init_stream_response(&mut self, response: ResponseStatus, message: Option<String>) {
        if self.streaming != StreamingState::ProcessingStreaming {
            debug!("ignoring initStreamResponse outside of stream setup");
            return;
        }

        if response.is_accepted() {
            info!("streaming started");
            self.set_streaming_state(StreamingState::InStreaming);
            return;
        }

        let reason = rejection_reason(&response, message);
        warn!(reason, "streaming rejected");
        self.set_streaming_state(StreamingState::NoStreaming);
        self.notify(Notice::StreamingRejected { reason });
    }

    fn on_discover_response(
        &mut self,
        dialect: &'static str,
        response: ResponseStatus,
        videos: Option<Vec<String>>,
        message: Option<String>,
    ) {
        let Some(stream) = self.pending_discovery.take() else {
            debug!(dialect, "ignoring unsolicited discovery reply");
            return;
        };
        debug!(dialect, stream, "discovery reply");

        if !response.is_accepted() {
            let reason = rejection_reason(&response, message);
            warn!(stream, reason, "stream discovery rejected");
            self.notify(Notice::DiscoveryRejected { stream, reason });
            return;
        }

        let videos = videos.unwrap_or_default();
        self.notify(Notice::StreamsDiscovered {
            stream: stream.clone(),
            videos: videos.clone(),
        });

        if videos.is_empty() {
            info!(stream, "stream publishes no videos");
            return;
        }
        if self.is_busy() {
            warn!(stream, "a call or negotiation started meanwhile, not viewing");
            return;
        }

        self.begin_negotiation(NegotiationPurpose::ViewStream { stream, videos });
    }

    fn on_stream_response(
        &mut self,
        response: Option<ResponseStatus>,
        sdp_answer: Option<String>,
        message: Option<String>,
    ) {
        let Some(phase) = self
            .negotiation
            .as_ref()
            .filter(|n| n.role() == NegotiationRole::Viewer)
            .map(Negotiation::phase)
        else {
            debug!("ignoring streamResponse without a viewer negotiation");
            return;
        };

        if let Some(status) = response.filter(|s| !s.is_accepted()) {
            let reason = rejection_reason(&status, message);
            warn!(reason, "stream request rejected");
            self.notify(Notice::StreamRejected { reason });
            self.stop(true);
            return;
        }

        match (phase, sdp_answer) {
            (NegotiationPhase::AwaitingAnswer, Some(sdp)) => self.apply_answer(sdp),
            (NegotiationPhase::AwaitingAnswer, None) => {
                self.fail_negotiation(NegotiationError::MissingAnswer)
            }
            (NegotiationPhase::Answered, _) => {
                debug!("viewer answer already applied, ignoring further streamResponse");
            }
            (phase, _) => debug!(?phase, "ignoring streamResponse before the offer was sent"),
        }
    }

    // ---- peer event handlers ----

    fn on_peer_created(&mut self) {
        let Some(negotiation) = self.negotiation.as_mut() else {
            return;
        };
        let generation = negotiation.generation();
        let queued = negotiation.peer_created();

        debug!(%generation, queued = queued.len(), "peer created, generating offer");
        self.peer(PeerCommand::GenerateOffer { generation });
        for candidate in queued {
            self.peer(PeerCommand::AddIceCandidate {
                generation,
                candidate,
            });
        }
    }

    fn on_offer_generated(&mut self, sdp: String) {
        let Some(negotiation) = self.negotiation.as_mut() else {
            return;
        };
        negotiation.offer_generated(sdp.clone());
        let purpose = negotiation.purpose().clone();

        match purpose {
            NegotiationPurpose::OutgoingCall { to } => {
                let from = self.local_name.clone().unwrap_or_default();
                self.send(SignalMessage::Call {
                    from,
                    to,
                    sdp_offer: sdp,
                });
            }
            NegotiationPurpose::IncomingCall { from } => {
                self.send(SignalMessage::IncomingCallResponse {
                    from,
                    call_response: CallDecision::Accept,
                    message: None,
                    sdp_offer: Some(sdp),
                });
            }
            NegotiationPurpose::ViewStream { stream, videos } => {
                for video in videos {
                    self.send(SignalMessage::StreamRequest {
                        stream: stream.clone(),
                        video,
                        sdp_offer: sdp.clone(),
                    });
                }
            }
            NegotiationPurpose::EnterStream { stream } => {
                self.send(SignalMessage::EnterStream {
                    stream,
                    sdp_offer: sdp,
                });
            }
            NegotiationPurpose::ServeViewer { viewer } => {
                self.send(SignalMessage::ViewerResponse {
                    call_response: CallDecision::Accept,
                    from: Some(viewer),
                    sdp_offer: Some(sdp),
                });
            }
        }
    }

    // ---- helpers ----

    fn is_busy(&self) -> bool {
        self.call != CallState::NoCall || self.negotiation.is_some()
    }

    fn role(&self) -> Option<NegotiationRole> {
        self.negotiation.as_ref().map(Negotiation::role)
    }

    fn begin_negotiation(&mut self, purpose: NegotiationPurpose) {
        self.last_generation += 1;
        let generation = Generation(self.last_generation);
        let config = purpose.peer_config();

        info!(%generation, role = ?purpose.role(), "creating peer");
        self.negotiation = Some(Negotiation::new(generation, purpose));
        self.peer(PeerCommand::Create { generation, config });
    }

    fn apply_answer(&mut self, sdp_answer: String) {
        let Some(negotiation) = self.negotiation.as_mut() else {
            return;
        };
        negotiation.answer_received(sdp_answer.clone());
        let generation = negotiation.generation();
        self.peer(PeerCommand::ProcessAnswer {
            generation,
            sdp_answer,
        });
    }

    fn fail_negotiation(&mut self, error: NegotiationError) {
        let Some(role) = self.role() else {
            return;
        };
        error!(?role, "negotiation failed: {error}");

        if role == NegotiationRole::Viewer {
            self.send(SignalMessage::Error {
                message: error.to_string(),
            });
        }
        self.stop(true);
        self.notify(Notice::NegotiationFailed { role, error });
    }

    /// Returns to `NoCall`, disposing the negotiation if there is one.
    /// `notify_server` controls whether the matching stop frame is sent.
    fn stop(&mut self, notify_server: bool) {
        self.pending_caller = None;
        self.set_call_state(CallState::NoCall);

        let Some(negotiation) = self.negotiation.take() else {
            return;
        };
        let generation = negotiation.generation();
        debug!(%generation, "disposing peer");
        self.peer(PeerCommand::Dispose { generation });
        if notify_server {
            self.send(negotiation.role().stop_message());
        }
    }

    fn set_registration_state(&mut self, next: RegistrationState) {
        self.registration = next;
        self.controls_changed();
        if matches!(
            next,
            RegistrationState::NotRegistered | RegistrationState::Registered
        ) && self.call != CallState::NoCall
        {
            self.set_call_state(CallState::NoCall);
        }
    }

    fn set_call_state(&mut self, next: CallState) {
        self.call = next;
        if next == CallState::NoCall {
            self.remote_peer = None;
        }
        self.controls_changed();
    }

    fn set_streaming_state(&mut self, next: StreamingState) {
        self.streaming = next;
        self.controls_changed();
    }

    fn controls_changed(&mut self) {
        let controls = self.controls();
        self.effects.push_back(SessionEffect::Controls(controls));
    }

    fn send(&mut self, msg: SignalMessage) {
        self.effects.push_back(SessionEffect::Send(msg));
    }

    fn peer(&mut self, command: PeerCommand) {
        self.effects.push_back(SessionEffect::Peer(command));
    }

    fn notify(&mut self, notice: Notice) {
        self.effects.push_back(SessionEffect::Notice(notice));
    }
}

fn rejection_reason(response: &ResponseStatus, message: Option<String>) -> String {
    message
        .or_else(|| response.reason().map(str::to_owned))
        .unwrap_or_else(|| UNKNOWN_REASON.to_owned())
}

use crate::session::NegotiationRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationState {
    #[default]
    NotRegistered,
    Registering,
    Registered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallState {
    #[default]
    NoCall,
    ProcessingCall,
    InCall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamingState {
    #[default]
    NoStreaming,
    ProcessingStreaming,
    InStreaming,
}

/// Which user actions are currently available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub register: bool,
    pub call: bool,
    pub terminate: bool,
    pub start_streaming: bool,
    pub stop_streaming: bool,
}

impl Controls {
    pub fn from_states(
        registration: RegistrationState,
        call: CallState,
        streaming: StreamingState,
    ) -> Self {
        Self {
            register: registration == RegistrationState::NotRegistered,
            call: call == CallState::NoCall,
            terminate: call == CallState::InCall,
            start_streaming: streaming == StreamingState::NoStreaming,
            stop_streaming: streaming == StreamingState::InStreaming,
        }
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::from_states(
            RegistrationState::default(),
            CallState::default(),
            StreamingState::default(),
        )
    }
}

/// Read-only view of a session, published after every processed input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub registration: RegistrationState,
    pub call: CallState,
    pub streaming: StreamingState,
    pub local_name: Option<String>,
    pub remote_peer: Option<String>,
    pub negotiation: Option<NegotiationRole>,
}

impl SessionSnapshot {
    pub fn controls(&self) -> Controls {
        Controls::from_states(self.registration, self.call, self.streaming)
    }
}

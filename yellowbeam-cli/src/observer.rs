use async_trait::async_trait;
use colored::*;
use dialoguer::Confirm;
use tracing::{debug, warn};
use yellowbeam::client::{Controls, Notice, SessionObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerPolicy {
    Ask,
    Accept,
    Reject,
}

/// Prints session notices and asks on the terminal about incoming calls.
pub struct TerminalObserver {
    policy: AnswerPolicy,
}

impl TerminalObserver {
    pub fn new(policy: AnswerPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl SessionObserver for TerminalObserver {
    async fn confirm_incoming_call(&self, from: &str) -> bool {
        println!("{}", format!("📞 Incoming call from {from}").cyan().bold());

        match self.policy {
            AnswerPolicy::Accept => true,
            AnswerPolicy::Reject => false,
            AnswerPolicy::Ask => {
                let prompt = format!("User {from} is calling you. Do you accept the call?");
                let answer = tokio::task::spawn_blocking(move || {
                    Confirm::new().with_prompt(prompt).default(true).interact()
                })
                .await;

                match answer {
                    Ok(Ok(accept)) => accept,
                    Ok(Err(e)) => {
                        warn!("Prompt failed, declining call: {e}");
                        false
                    }
                    Err(e) => {
                        warn!("Prompt task failed, declining call: {e}");
                        false
                    }
                }
            }
        }
    }

    fn on_controls(&self, controls: Controls) {
        debug!(?controls, "Controls changed");
    }

    fn on_notice(&self, notice: &Notice) {
        match notice {
            Notice::RegistrationRejected { reason } => {
                println!("{}", format!("❌ Registration rejected: {reason}").red());
            }
            Notice::CallRejected { reason } => {
                println!("{}", format!("❌ Call not accepted: {reason}").red());
            }
            Notice::RemoteHangup => println!("{}", "👋 The other side hung up".yellow()),
            Notice::StreamingRejected { reason } => {
                println!("{}", format!("❌ Streaming rejected: {reason}").red());
            }
            Notice::StreamsDiscovered { stream, videos } => {
                println!(
                    "{}",
                    format!("🔎 Stream {stream} publishes {}", videos.join(", ")).cyan()
                );
            }
            Notice::DiscoveryRejected { stream, reason } => {
                println!("{}", format!("❌ Stream {stream} not found: {reason}").red());
            }
            Notice::StreamRejected { reason } => {
                println!("{}", format!("❌ Stream request rejected: {reason}").red());
            }
            Notice::NegotiationFailed { role, error } => {
                println!(
                    "{}",
                    format!("💥 {role:?} negotiation failed: {error}").red().bold()
                );
            }
        }
    }
}

use sentinel::protocol::reply_message;
use sentinel::{ValidateReply, verify_message};
use sentinel_store::NewTick;
use tracing::{debug, error, info, warn};

use super::Hub;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    BadSignature,
    MissingValidatorId,
    ValidatorMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    Recorded { tick_id: String },
    /// No outstanding callback: unknown, expired or already answered
    UnknownCallback,
    Rejected(RejectReason),
    /// Accepted but the store write failed; nothing was persisted
    PersistFailed,
}

impl Hub {
    /// Match a reply to its callback and persist the tick with its reward
    ///
    /// The callback is consumed whatever the verdict, so a reply can never
    /// be credited twice.
    pub async fn handle_validate_reply(&self, reply: ValidateReply) -> CompletionOutcome {
        let Some(pending) = self.callbacks.resolve(&reply.callback_id).await else {
            debug!("Ignoring reply for unknown callback {}", reply.callback_id);
            return CompletionOutcome::UnknownCallback;
        };

        let expected = reply_message(&reply.callback_id);
        if !verify_message(&expected, &pending.public_key, &reply.signed_message) {
            warn!(
                "Reply for {} from validator {} failed signature verification",
                reply.callback_id, pending.validator_id
            );
            return CompletionOutcome::Rejected(RejectReason::BadSignature);
        }

        match reply.validator_id.as_deref() {
            None => {
                warn!("Reply for {} carries no validator id", reply.callback_id);
                return CompletionOutcome::Rejected(RejectReason::MissingValidatorId);
            }
            Some(id) if id != pending.validator_id => {
                warn!(
                    "Reply for {} claims validator {} but was issued to {}",
                    reply.callback_id, id, pending.validator_id
                );
                return CompletionOutcome::Rejected(RejectReason::ValidatorMismatch);
            }
            Some(_) => {}
        }

        if reply.target_id != pending.target_id {
            debug!(
                "Reply for {} names target {}, recording against {}",
                reply.callback_id, reply.target_id, pending.target_id
            );
        }

        let tick = NewTick::now(
            &pending.target_id,
            &pending.validator_id,
            reply.status,
            reply.latency,
        );

        match self.store.record_tick(tick, self.reward_per_tick).await {
            Ok(tick) => {
                info!(
                    "Recorded {} tick for {} ({}) from validator {} ({} ms)",
                    tick.status, tick.target_id, pending.url, tick.validator_id, tick.latency
                );
                CompletionOutcome::Recorded { tick_id: tick.id }
            }
            Err(e) => {
                error!(
                    "Failed to record tick for {} from validator {}: {}",
                    pending.target_id, pending.validator_id, e
                );
                CompletionOutcome::PersistFailed
            }
        }
    }
}

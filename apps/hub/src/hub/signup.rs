use sentinel::protocol::signup_message;
use sentinel::{HubMessage, SignupAck, SignupRequest, verify_message};
use sentinel_store::{NewValidator, Validator};
use tracing::{error, info, warn};

use super::{ActiveConnection, ConnectionHandle, Hub};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupOutcome {
    /// Acknowledged and added to the active pool
    Registered { validator_id: String, created: bool },
    /// The identity proof did not verify; nothing was written or sent
    Rejected,
    /// Verified, but the store or the connection failed us
    Failed,
}

impl Hub {
    /// Admit a validator whose signup proves control of its public key
    pub async fn handle_signup(
        &self,
        handle: &ConnectionHandle,
        request: SignupRequest,
    ) -> SignupOutcome {
        let expected = signup_message(&request.callback_id, &request.public_key);
        if !verify_message(&expected, &request.public_key, &request.signed_message) {
            warn!("Signup over {} failed signature verification", handle.id());
            return SignupOutcome::Rejected;
        }

        let (validator, created) = match self.find_or_create_validator(&request).await {
            Ok(found) => found,
            Err(e) => {
                error!("Failed to look up validator for signup over {}: {}", handle.id(), e);
                return SignupOutcome::Failed;
            }
        };

        let ack = HubMessage::Signup(SignupAck {
            validator_id: validator.id.clone(),
            callback_id: request.callback_id,
        });

        // A connection that closed while we were in the store can no longer
        // be acked, and must not end up in the registry.
        if let Err(e) = handle.send(ack) {
            warn!("Could not acknowledge validator {} over {}: {}", validator.id, handle.id(), e);
            return SignupOutcome::Failed;
        }

        let replaced = self
            .registry
            .add(ActiveConnection {
                handle: handle.clone(),
                validator_id: validator.id.clone(),
                public_key: validator.public_key,
            })
            .await;
        if let Some(previous) = replaced {
            info!("Connection {} re-signed up, replacing {}", handle.id(), previous.validator_id);
        }

        info!(
            "Validator {} active over {} ({} connections)",
            validator.id,
            handle.id(),
            self.registry.len().await
        );
        SignupOutcome::Registered { validator_id: validator.id, created }
    }

    async fn find_or_create_validator(
        &self,
        request: &SignupRequest,
    ) -> sentinel_store::Result<(Validator, bool)> {
        if let Some(validator) = self.store.find_validator_by_public_key(&request.public_key).await? {
            info!("Validator already registered: {}", validator.id);
            return Ok((validator, false));
        }

        let validator = self
            .store
            .create_validator(&NewValidator::from_signup(&request.public_key, &request.ip))
            .await?;
        info!("Registered new validator {} from {}", validator.id, validator.ip);
        Ok((validator, true))
    }
}

use std::collections::VecDeque;

use sentinel::crypto::sign_message;
use sentinel::protocol::{reply_message, signup_message};
use sentinel::{HubMessage, KeyPair, Prober, SignupRequest, ValidateReply, ValidateRequest, ValidatorMessage};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    Disconnected,
    /// Signup sent, waiting for the hub to assign an id
    AwaitingIdentity { callback_id: String },
    Active { validator_id: String },
}

/// A probe request that can run now that the node knows its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeJob {
    pub request: ValidateRequest,
    pub validator_id: String,
}

/// Protocol state of one validator node across connections
pub struct ValidatorNode {
    keypair: KeyPair,
    ip: String,
    state: NodeState,
    pending: VecDeque<ValidateRequest>,
}

impl ValidatorNode {
    pub fn new(keypair: KeyPair, ip: impl Into<String>) -> Self {
        Self { keypair, ip: ip.into(), state: NodeState::Disconnected, pending: VecDeque::new() }
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    /// Build a signed signup under a fresh callback id and start waiting
    /// for its acknowledgement
    pub fn begin_signup(&mut self) -> ValidatorMessage {
        let callback_id = Uuid::new_v4().to_string();
        let public_key = self.keypair.public_key_hex();
        let signed_message = sign_message(&signup_message(&callback_id, &public_key), &self.keypair);

        self.state = NodeState::AwaitingIdentity { callback_id: callback_id.clone() };
        debug!("Sent signup {}, awaiting identity", callback_id);

        ValidatorMessage::Signup(SignupRequest {
            ip: self.ip.clone(),
            public_key,
            signed_message,
            callback_id,
        })
    }

    /// Feed one hub message; returns the probes that may run now
    pub fn handle(&mut self, message: HubMessage) -> Vec<ProbeJob> {
        match message {
            HubMessage::Signup(ack) => {
                let NodeState::AwaitingIdentity { callback_id } = &self.state else {
                    warn!("Ignoring signup ack {} outside of signup", ack.callback_id);
                    return Vec::new();
                };
                if *callback_id != ack.callback_id {
                    warn!("Ignoring signup ack for foreign callback {}", ack.callback_id);
                    return Vec::new();
                }

                info!("Signed up as validator {}", ack.validator_id);
                self.state = NodeState::Active { validator_id: ack.validator_id.clone() };

                self.pending
                    .drain(..)
                    .map(|request| ProbeJob { request, validator_id: ack.validator_id.clone() })
                    .collect()
            }
            HubMessage::Validate(request) => match &self.state {
                NodeState::Active { validator_id } => {
                    vec![ProbeJob { request, validator_id: validator_id.clone() }]
                }
                NodeState::AwaitingIdentity { .. } => {
                    debug!("Queueing probe {} until signup completes", request.callback_id);
                    self.pending.push_back(request);
                    Vec::new()
                }
                NodeState::Disconnected => {
                    debug!("Dropping probe {} received while disconnected", request.callback_id);
                    Vec::new()
                }
            },
        }
    }

    /// The connection is gone; queued probes belong to it and are dropped
    pub fn on_disconnect(&mut self) {
        if !self.pending.is_empty() {
            info!("Dropping {} queued probes on disconnect", self.pending.len());
        }
        self.pending.clear();
        self.state = NodeState::Disconnected;
    }
}

/// Probe the job's url and build the signed reply
pub async fn run_probe(prober: &dyn Prober, keypair: &KeyPair, job: ProbeJob) -> ValidateReply {
    let outcome = prober.probe(&job.request.url).await;
    debug!(
        "Probed {} for {}: {} in {} ms",
        job.request.url, job.request.callback_id, outcome.status, outcome.latency_ms
    );

    ValidateReply {
        signed_message: sign_message(&reply_message(&job.request.callback_id), keypair),
        callback_id: job.request.callback_id,
        status: outcome.status,
        latency: outcome.latency_ms,
        target_id: job.request.target_id,
        validator_id: Some(job.validator_id),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use sentinel::crypto::generate_keypair;
    use sentinel::{ProbeOutcome, ProbeStatus, SignupAck, verify_message};

    use super::*;

    struct FixedProber(ProbeOutcome);

    #[async_trait]
    impl Prober for FixedProber {
        async fn probe(&self, _url: &str) -> ProbeOutcome {
            self.0
        }
    }

    fn request(callback_id: &str) -> ValidateRequest {
        ValidateRequest {
            url: "https://example.com".into(),
            callback_id: callback_id.into(),
            target_id: "t1".into(),
        }
    }

    fn signup_callback(message: &ValidatorMessage) -> String {
        match message {
            ValidatorMessage::Signup(signup) => signup.callback_id.clone(),
            other => panic!("expected signup, got {other:?}"),
        }
    }

    #[test]
    fn test_signup_is_signed_over_template() {
        let mut node = ValidatorNode::new(generate_keypair(), "10.0.0.9");
        let ValidatorMessage::Signup(signup) = node.begin_signup() else {
            panic!("expected signup");
        };

        assert_eq!(signup.ip, "10.0.0.9");
        let expected = signup_message(&signup.callback_id, &signup.public_key);
        assert!(verify_message(&expected, &signup.public_key, &signup.signed_message));
        assert_eq!(
            node.state(),
            &NodeState::AwaitingIdentity { callback_id: signup.callback_id.clone() }
        );
    }

    #[test]
    fn test_requests_before_identity_are_replayed_in_order() {
        let mut node = ValidatorNode::new(generate_keypair(), "127.0.0.1");
        let callback_id = signup_callback(&node.begin_signup());

        assert!(node.handle(HubMessage::Validate(request("a"))).is_empty());
        assert!(node.handle(HubMessage::Validate(request("b"))).is_empty());

        let jobs = node.handle(HubMessage::Signup(SignupAck {
            validator_id: "v1".into(),
            callback_id,
        }));
        let order: Vec<_> = jobs.iter().map(|job| job.request.callback_id.as_str()).collect();
        assert_eq!(order, ["a", "b"]);
        assert!(jobs.iter().all(|job| job.validator_id == "v1"));
        assert_eq!(node.state(), &NodeState::Active { validator_id: "v1".into() });

        let jobs = node.handle(HubMessage::Validate(request("c")));
        assert_eq!(jobs.len(), 1);
    }

    #[test]
    fn test_ack_for_other_callback_is_ignored() {
        let mut node = ValidatorNode::new(generate_keypair(), "127.0.0.1");
        node.begin_signup();

        let jobs = node.handle(HubMessage::Signup(SignupAck {
            validator_id: "v1".into(),
            callback_id: "not-ours".into(),
        }));
        assert!(jobs.is_empty());
        assert!(matches!(node.state(), NodeState::AwaitingIdentity { .. }));
    }

    #[test]
    fn test_disconnect_drops_queue_and_resignup_starts_fresh() {
        let mut node = ValidatorNode::new(generate_keypair(), "127.0.0.1");
        let first = signup_callback(&node.begin_signup());
        node.handle(HubMessage::Validate(request("queued")));

        node.on_disconnect();
        assert_eq!(node.state(), &NodeState::Disconnected);
        assert!(node.handle(HubMessage::Validate(request("lost"))).is_empty());

        let second = signup_callback(&node.begin_signup());
        assert_ne!(first, second);
        let jobs = node.handle(HubMessage::Signup(SignupAck {
            validator_id: "v1".into(),
            callback_id: second,
        }));
        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn test_run_probe_signs_reply() {
        let keypair = generate_keypair();
        let prober = FixedProber(ProbeOutcome { status: ProbeStatus::Good, latency_ms: 42 });
        let job = ProbeJob { request: request("cb-1"), validator_id: "v1".into() };

        let reply = run_probe(&prober, &keypair, job).await;

        assert_eq!(reply.status, ProbeStatus::Good);
        assert_eq!(reply.latency, 42);
        assert_eq!(reply.target_id, "t1");
        assert_eq!(reply.validator_id.as_deref(), Some("v1"));
        assert!(verify_message(&reply_message("cb-1"), &keypair.public_key_hex(), &reply.signed_message));
    }

    #[tokio::test]
    async fn test_run_probe_reports_unreachable_as_bad() {
        let keypair = generate_keypair();
        let prober = FixedProber(ProbeOutcome::unreachable());
        let job = ProbeJob { request: request("cb-2"), validator_id: "v1".into() };

        let reply = run_probe(&prober, &keypair, job).await;
        assert_eq!(reply.status, ProbeStatus::Bad);
        assert_eq!(reply.latency, sentinel::probe::FALLBACK_LATENCY_MS);
    }
}

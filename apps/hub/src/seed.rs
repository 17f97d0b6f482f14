use chrono::{Duration, Utc};
use sentinel::ProbeStatus;
use sentinel_store::{NewTick, NewValidator, Store, User};
use tracing::info;

pub const DEMO_USER_ID: &str = "demo-user";
const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_TARGET_URL: &str = "https://example.com";
const DEMO_VALIDATOR_KEY: &str = "demo-validator-public-key";

/// Populate an empty database with a demo user, one target and a validator
/// with a short tick history. Does nothing if the demo user already owns
/// targets.
pub async fn seed(store: &dyn Store) -> anyhow::Result<()> {
    store
        .create_user(&User { id: DEMO_USER_ID.into(), email: DEMO_EMAIL.into() })
        .await?;

    if !store.list_targets_for_user(DEMO_USER_ID).await?.is_empty() {
        info!("Demo data already present, skipping seed");
        return Ok(());
    }

    let target = store.create_target(DEMO_USER_ID, DEMO_TARGET_URL).await?;
    let validator = store
        .create_validator(&NewValidator {
            public_key: DEMO_VALIDATOR_KEY.into(),
            ip: "127.0.0.1".into(),
            location: "Delhi".into(),
        })
        .await?;

    let now = Utc::now();
    let history = [
        (ProbeStatus::Good, Duration::zero()),
        (ProbeStatus::Good, Duration::minutes(10)),
        (ProbeStatus::Bad, Duration::minutes(20)),
    ];
    for (status, age) in history {
        store
            .create_observation_tick(NewTick {
                target_id: target.id.clone(),
                validator_id: validator.id.clone(),
                status,
                latency: 100,
                created_at: now - age,
            })
            .await?;
    }

    info!("Seeded demo target {} for user {}", target.id, DEMO_USER_ID);
    Ok(())
}

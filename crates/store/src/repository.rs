use async_trait::async_trait;
use libsql::{Connection, Row, params};
use sentinel::ProbeStatus;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::models::{
    MonitoredTarget, NewTick, NewValidator, ObservationTick, TargetWithTicks, User, Validator,
    millis_to_datetime, truncate_to_millis,
};
use crate::pool::{LibsqlManager, LibsqlPool};

/// Store trait for abstracting persistence operations
#[async_trait]
pub trait Store: Send + Sync {
    /// Look a validator up by its public key
    async fn find_validator_by_public_key(&self, public_key: &str) -> Result<Option<Validator>>;

    /// Create a validator; if the public key is already registered the
    /// existing row is returned unchanged
    async fn create_validator(&self, validator: &NewValidator) -> Result<Validator>;

    /// Get a validator by id
    async fn get_validator(&self, id: &str) -> Result<Option<Validator>>;

    /// Add `amount` to a validator's pending payouts
    async fn increment_pending_payouts(&self, validator_id: &str, amount: i64) -> Result<()>;

    /// Insert a single tick
    async fn create_observation_tick(&self, tick: NewTick) -> Result<ObservationTick>;

    /// Insert a tick and credit its validator in one transaction; either
    /// both writes land or neither does
    async fn record_tick(&self, tick: NewTick, reward: i64) -> Result<ObservationTick>;

    /// All targets that are not disabled
    async fn list_active_targets(&self) -> Result<Vec<MonitoredTarget>>;

    /// Ticks recorded for a target, newest first
    async fn list_ticks_for_target(&self, target_id: &str) -> Result<Vec<ObservationTick>>;

    /// Register a new target for a user
    async fn create_target(&self, user_id: &str, url: &str) -> Result<MonitoredTarget>;

    /// A user's non-disabled target with its ticks
    async fn get_target_with_ticks(
        &self,
        user_id: &str,
        target_id: &str,
    ) -> Result<Option<TargetWithTicks>>;

    /// A user's non-disabled targets with their ticks
    async fn list_targets_for_user(&self, user_id: &str) -> Result<Vec<TargetWithTicks>>;

    /// Soft-delete a user's target; returns false when nothing matched
    async fn disable_target(&self, user_id: &str, target_id: &str) -> Result<bool>;

    /// Insert a user
    async fn create_user(&self, user: &User) -> Result<()>;
}

/// LibSQL store implementation
pub struct StoreImpl {
    pool: LibsqlPool,
}

impl StoreImpl {
    /// Create a new store instance from a pool
    pub fn new_from_pool(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool
    async fn get_conn(&self) -> Result<deadpool::managed::Object<LibsqlManager>> {
        Ok(self.pool.get().await?)
    }

    async fn ticks_for(conn: &Connection, target_id: &str) -> Result<Vec<ObservationTick>> {
        let mut rows = conn
            .query(
                "SELECT id, target_id, validator_id, status, latency, created_at FROM ticks WHERE target_id = ? ORDER BY created_at DESC",
                params![target_id],
            )
            .await?;

        let mut ticks = Vec::new();
        while let Some(row) = rows.next().await? {
            ticks.push(tick_from_row(&row)?);
        }
        Ok(ticks)
    }
}

fn validator_from_row(row: &Row) -> Result<Validator> {
    Ok(Validator {
        id: row.get(0)?,
        public_key: row.get(1)?,
        ip: row.get(2)?,
        location: row.get(3)?,
        pending_payouts: row.get(4)?,
    })
}

fn target_from_row(row: &Row) -> Result<MonitoredTarget> {
    let created_at: i64 = row.get(4)?;
    Ok(MonitoredTarget {
        id: row.get(0)?,
        url: row.get(1)?,
        user_id: row.get(2)?,
        disabled: row.get::<i64>(3)? != 0,
        created_at: millis_to_datetime(created_at)
            .ok_or_else(|| StoreError::Corrupt(format!("target timestamp {created_at}")))?,
    })
}

fn tick_from_row(row: &Row) -> Result<ObservationTick> {
    let status: String = row.get(3)?;
    let latency: i64 = row.get(4)?;
    let created_at: i64 = row.get(5)?;
    Ok(ObservationTick {
        id: row.get(0)?,
        target_id: row.get(1)?,
        validator_id: row.get(2)?,
        status: status.parse::<ProbeStatus>().map_err(StoreError::Corrupt)?,
        latency: u64::try_from(latency)
            .map_err(|_| StoreError::Corrupt(format!("negative latency {latency}")))?,
        created_at: millis_to_datetime(created_at)
            .ok_or_else(|| StoreError::Corrupt(format!("tick timestamp {created_at}")))?,
    })
}

async fn insert_tick(conn: &Connection, tick: NewTick) -> Result<ObservationTick> {
    let latency =
        i64::try_from(tick.latency).map_err(|_| StoreError::LatencyOutOfRange(tick.latency))?;
    let tick = tick.into_tick();
    conn.execute(
        "INSERT INTO ticks (id, target_id, validator_id, status, latency, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        params![
            tick.id.clone(),
            tick.target_id.clone(),
            tick.validator_id.clone(),
            tick.status.as_str(),
            latency,
            tick.created_at.timestamp_millis()
        ],
    )
    .await?;
    Ok(tick)
}

async fn add_payout(conn: &Connection, validator_id: &str, amount: i64) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE validators SET pending_payouts = pending_payouts + ? WHERE id = ?",
            params![amount, validator_id],
        )
        .await?;

    if updated == 0 {
        return Err(StoreError::ValidatorNotFound(validator_id.to_string()));
    }
    Ok(())
}

#[async_trait]
impl Store for StoreImpl {
    async fn find_validator_by_public_key(&self, public_key: &str) -> Result<Option<Validator>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                "SELECT id, public_key, ip, location, pending_payouts FROM validators WHERE public_key = ?",
                params![public_key],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(validator_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn create_validator(&self, validator: &NewValidator) -> Result<Validator> {
        {
            let conn = self.get_conn().await?;
            conn.execute(
                "INSERT INTO validators (id, public_key, ip, location, pending_payouts) VALUES (?, ?, ?, ?, 0) ON CONFLICT(public_key) DO NOTHING",
                params![
                    Uuid::new_v4().to_string(),
                    validator.public_key.clone(),
                    validator.ip.clone(),
                    validator.location.clone()
                ],
            )
            .await?;
        }

        self.find_validator_by_public_key(&validator.public_key)
            .await?
            .ok_or_else(|| StoreError::ValidatorNotFound(validator.public_key.clone()))
    }

    async fn get_validator(&self, id: &str) -> Result<Option<Validator>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                "SELECT id, public_key, ip, location, pending_payouts FROM validators WHERE id = ?",
                params![id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(validator_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn increment_pending_payouts(&self, validator_id: &str, amount: i64) -> Result<()> {
        let conn = self.get_conn().await?;
        add_payout(&conn, validator_id, amount).await
    }

    async fn create_observation_tick(&self, tick: NewTick) -> Result<ObservationTick> {
        let conn = self.get_conn().await?;
        insert_tick(&conn, tick).await
    }

    async fn record_tick(&self, tick: NewTick, reward: i64) -> Result<ObservationTick> {
        let conn = self.get_conn().await?;
        let tx = conn.transaction().await?;

        let validator_id = tick.validator_id.clone();
        let written = match insert_tick(&tx, tick).await {
            Ok(written) => add_payout(&tx, &validator_id, reward).await.map(|()| written),
            Err(e) => Err(e),
        };

        match written {
            Ok(tick) => {
                tx.commit().await?;
                Ok(tick)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!("Rollback after failed tick write also failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn list_active_targets(&self) -> Result<Vec<MonitoredTarget>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                "SELECT id, url, user_id, disabled, created_at FROM targets WHERE disabled = 0 ORDER BY created_at",
                (),
            )
            .await?;

        let mut targets = Vec::new();
        while let Some(row) = rows.next().await? {
            targets.push(target_from_row(&row)?);
        }
        Ok(targets)
    }

    async fn list_ticks_for_target(&self, target_id: &str) -> Result<Vec<ObservationTick>> {
        let conn = self.get_conn().await?;
        Self::ticks_for(&conn, target_id).await
    }

    async fn create_target(&self, user_id: &str, url: &str) -> Result<MonitoredTarget> {
        let conn = self.get_conn().await?;
        let target = MonitoredTarget {
            id: Uuid::new_v4().to_string(),
            url: url.to_string(),
            user_id: user_id.to_string(),
            disabled: false,
            created_at: truncate_to_millis(chrono::Utc::now()),
        };

        conn.execute(
            "INSERT INTO targets (id, url, user_id, disabled, created_at) VALUES (?, ?, ?, 0, ?)",
            params![
                target.id.clone(),
                target.url.clone(),
                target.user_id.clone(),
                target.created_at.timestamp_millis()
            ],
        )
        .await?;

        Ok(target)
    }

    async fn get_target_with_ticks(
        &self,
        user_id: &str,
        target_id: &str,
    ) -> Result<Option<TargetWithTicks>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                "SELECT id, url, user_id, disabled, created_at FROM targets WHERE id = ? AND user_id = ? AND disabled = 0",
                params![target_id, user_id],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let target = target_from_row(&row)?;
        let ticks = Self::ticks_for(&conn, &target.id).await?;

        Ok(Some(TargetWithTicks { target, ticks }))
    }

    async fn list_targets_for_user(&self, user_id: &str) -> Result<Vec<TargetWithTicks>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                "SELECT id, url, user_id, disabled, created_at FROM targets WHERE user_id = ? AND disabled = 0 ORDER BY created_at",
                params![user_id],
            )
            .await?;

        let mut targets = Vec::new();
        while let Some(row) = rows.next().await? {
            targets.push(target_from_row(&row)?);
        }

        let mut result = Vec::with_capacity(targets.len());
        for target in targets {
            let ticks = Self::ticks_for(&conn, &target.id).await?;
            result.push(TargetWithTicks { target, ticks });
        }
        Ok(result)
    }

    async fn disable_target(&self, user_id: &str, target_id: &str) -> Result<bool> {
        let conn = self.get_conn().await?;
        let updated = conn
            .execute(
                "UPDATE targets SET disabled = 1 WHERE id = ? AND user_id = ?",
                params![target_id, user_id],
            )
            .await?;
        Ok(updated > 0)
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            "INSERT INTO users (id, email) VALUES (?, ?) ON CONFLICT(id) DO NOTHING",
            params![user.id.clone(), user.email.clone()],
        )
        .await?;
        Ok(())
    }
}

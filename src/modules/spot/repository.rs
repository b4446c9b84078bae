use super::error::KeyError;
use super::model::{AccessKey, User};
use crate::infrastructure::db::pool::DbPool;
use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Key to write on issue/extend. `value` is only stored when no
/// unexpired key exists for the recording.
#[derive(Debug, Clone)]
pub struct NewKey {
    pub value: String,
    pub recording_id: u64,
    pub user_id: u64,
    pub tenant_id: u64,
    pub expiration: u64,
    pub now: OffsetDateTime,
    pub expired_at: OffsetDateTime,
}

#[async_trait]
pub trait KeyRepository: Send + Sync {
    async fn expire(&self, recording_id: u64, now: OffsetDateTime) -> Result<(), KeyError>;

    async fn upsert(&self, key: &NewKey) -> Result<AccessKey, KeyError>;

    async fn find_by_recording(
        &self,
        recording_id: u64,
        tenant_id: u64,
    ) -> Result<Option<AccessKey>, KeyError>;

    async fn find_by_value(&self, value: &str) -> Result<Option<AccessKey>, KeyError>;

    /// Users with `deleted_at` set are treated as absent.
    async fn find_active_user(&self, user_id: u64) -> Result<Option<User>, KeyError>;
}

#[derive(FromRow)]
struct KeyRow {
    spot_key: String,
    spot_id: i64,
    user_id: i64,
    tenant_id: i64,
    expiration: i64,
    expired_at: OffsetDateTime,
}

impl From<KeyRow> for AccessKey {
    fn from(row: KeyRow) -> Self {
        Self {
            value: row.spot_key,
            recording_id: row.spot_id as u64,
            user_id: row.user_id as u64,
            tenant_id: row.tenant_id as u64,
            expiration: row.expiration as u64,
            expired_at: row.expired_at,
        }
    }
}

#[derive(FromRow)]
struct UserRow {
    user_id: i64,
    tenant_id: i64,
    name: String,
    email: String,
}

fn db_id(id: u64) -> Result<i64, KeyError> {
    i64::try_from(id).map_err(|_| KeyError::InvalidRecordingId)
}

fn db_user_id(id: u64) -> Result<i64, KeyError> {
    i64::try_from(id).map_err(|_| KeyError::UserNotFound)
}

#[derive(Clone)]
pub struct PgKeyRepository {
    pool: DbPool,
}

impl PgKeyRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyRepository for PgKeyRepository {
    async fn expire(&self, recording_id: u64, now: OffsetDateTime) -> Result<(), KeyError> {
        sqlx::query("UPDATE spots_keys SET expired_at = $1, expiration = 0 WHERE spot_id = $2")
            .bind(now)
            .bind(db_id(recording_id)?)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert(&self, key: &NewKey) -> Result<AccessKey, KeyError> {
        // Single statement: update-in-place (token replaced only when
        // expired) or insert when the recording has no key row yet.
        let row = sqlx::query_as::<_, KeyRow>(
            r#"
            WITH updated AS (
                UPDATE spots_keys
                SET
                    spot_key = CASE
                        WHEN expired_at <= $1 THEN $2
                        ELSE spot_key
                    END,
                    user_id = $3,
                    expiration = $4,
                    expired_at = $5,
                    updated_at = $1
                WHERE spot_id = $6
                RETURNING spot_key, spot_id, user_id, tenant_id, expiration, expired_at
            ),
            inserted AS (
                INSERT INTO spots_keys (spot_key, spot_id, user_id, tenant_id, expiration, created_at, expired_at)
                SELECT $2, $6, $3, $7, $4, $1, $5
                WHERE NOT EXISTS (SELECT 1 FROM updated)
                RETURNING spot_key, spot_id, user_id, tenant_id, expiration, expired_at
            )
            SELECT spot_key, spot_id, user_id, tenant_id, expiration, expired_at FROM updated
            UNION ALL
            SELECT spot_key, spot_id, user_id, tenant_id, expiration, expired_at FROM inserted
            "#,
        )
        .bind(key.now)
        .bind(&key.value)
        .bind(db_user_id(key.user_id)?)
        .bind(key.expiration as i64)
        .bind(key.expired_at)
        .bind(db_id(key.recording_id)?)
        .bind(db_user_id(key.tenant_id)?)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_recording(
        &self,
        recording_id: u64,
        tenant_id: u64,
    ) -> Result<Option<AccessKey>, KeyError> {
        let row = sqlx::query_as::<_, KeyRow>(
            r#"
            SELECT spot_key, spot_id, user_id, tenant_id, expiration, expired_at
            FROM spots_keys
            WHERE spot_id = $1 AND tenant_id = $2
            "#,
        )
        .bind(db_id(recording_id)?)
        .bind(db_user_id(tenant_id)?)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AccessKey::from))
    }

    async fn find_by_value(&self, value: &str) -> Result<Option<AccessKey>, KeyError> {
        let row = sqlx::query_as::<_, KeyRow>(
            r#"
            SELECT spot_key, spot_id, user_id, tenant_id, expiration, expired_at
            FROM spots_keys
            WHERE spot_key = $1
            "#,
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AccessKey::from))
    }

    async fn find_active_user(&self, user_id: u64) -> Result<Option<User>, KeyError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, tenant_id, name, email
            FROM public.users
            WHERE user_id = $1 AND deleted_at IS NULL
            LIMIT 1
            "#,
        )
        .bind(db_user_id(user_id)?)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| User {
            id: r.user_id as u64,
            name: r.name,
            email: r.email,
            tenant_id: r.tenant_id as u64,
        }))
    }
}

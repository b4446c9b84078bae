use super::error::KeyError;
use super::model::{AccessKey, KeyOutcome, User};
use super::repository::{KeyRepository, NewKey};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tracing::{error, info};
use uuid::Uuid;

/// Longest lifetime a public key may be issued for (7 days).
pub const MAX_KEY_EXPIRATION_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Clone)]
pub struct KeyService {
    repo: Arc<dyn KeyRepository>,
}

impl KeyService {
    pub fn new(repo: Arc<dyn KeyRepository>) -> Self {
        Self { repo }
    }

    pub async fn issue_or_extend(
        &self,
        recording_id: u64,
        expiration: u64,
        user: &User,
    ) -> Result<KeyOutcome, KeyError> {
        if recording_id == 0 {
            return Err(KeyError::InvalidRecordingId);
        }
        if expiration > MAX_KEY_EXPIRATION_SECS {
            return Err(KeyError::DurationTooLong {
                requested: expiration,
                max: MAX_KEY_EXPIRATION_SECS,
            });
        }

        let now = OffsetDateTime::now_utc();
        if expiration == 0 {
            self.repo.expire(recording_id, now).await.inspect_err(|e| {
                error!("failed to revoke key for spot {}: {}", recording_id, e)
            })?;
            info!("🔒 Revoked public key for spot {}", recording_id);
            return Ok(KeyOutcome::Revoked);
        }

        let new_key = NewKey {
            value: Uuid::new_v4().simple().to_string(),
            recording_id,
            user_id: user.id,
            tenant_id: user.tenant_id,
            expiration,
            now,
            expired_at: now + Duration::seconds(expiration as i64),
        };

        let stored = self.repo.upsert(&new_key).await.inspect_err(|e| {
            error!("failed to set key for spot {}: {}", recording_id, e)
        })?;

        if stored.value == new_key.value {
            info!("🔑 Issued public key for spot {}", recording_id);
            Ok(KeyOutcome::Issued(stored))
        } else {
            info!("🔑 Extended public key for spot {}", recording_id);
            Ok(KeyOutcome::Extended(stored))
        }
    }

    /// Current key for the user's tenant, with `expiration` set to the
    /// remaining lifetime.
    pub async fn fetch(&self, recording_id: u64, user: &User) -> Result<AccessKey, KeyError> {
        if recording_id == 0 {
            return Err(KeyError::InvalidRecordingId);
        }

        let mut key = self
            .repo
            .find_by_recording(recording_id, user.tenant_id)
            .await?
            .ok_or(KeyError::NotFound)?;

        let now = OffsetDateTime::now_utc();
        if key.is_expired_at(now) {
            return Err(KeyError::Expired);
        }
        key.expiration = (key.expired_at - now).whole_seconds().max(0) as u64;
        Ok(key)
    }

    /// Resolves a bearer key to the user who generated it.
    pub async fn validate(&self, value: &str) -> Result<User, KeyError> {
        let key = self.live_key(value).await?;
        self.active_user(key.user_id).await
    }

    /// Like [`validate`](Self::validate), but the key must belong to `recording_id`.
    pub async fn validate_for(&self, value: &str, recording_id: u64) -> Result<User, KeyError> {
        let key = self.live_key(value).await?;
        if key.recording_id != recording_id {
            return Err(KeyError::WrongRecording(recording_id));
        }
        self.active_user(key.user_id).await
    }

    async fn live_key(&self, value: &str) -> Result<AccessKey, KeyError> {
        if value.is_empty() {
            return Err(KeyError::MissingKey);
        }

        let key = self
            .repo
            .find_by_value(value)
            .await?
            .ok_or(KeyError::NotFound)?;

        if key.is_expired_at(OffsetDateTime::now_utc()) {
            return Err(KeyError::Expired);
        }
        Ok(key)
    }

    pub async fn active_user(&self, user_id: u64) -> Result<User, KeyError> {
        self.repo
            .find_active_user(user_id)
            .await?
            .ok_or(KeyError::UserNotFound)
    }
}

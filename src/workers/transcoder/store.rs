use super::error::TranscodeError;
use crate::infrastructure::db::pool::DbPool;
use async_trait::async_trait;
use time::OffsetDateTime;

#[async_trait]
pub trait ManifestStore: Send + Sync {
    /// Insert-or-replace both manifests for a recording in one statement.
    async fn save(
        &self,
        recording_id: u64,
        original: &str,
        rewritten: &str,
    ) -> Result<(), TranscodeError>;

    /// Rewritten manifest of a successfully transcoded recording.
    async fn load(&self, recording_id: u64) -> Result<String, TranscodeError>;
}

pub(crate) fn db_id(recording_id: u64) -> Result<i64, TranscodeError> {
    i64::try_from(recording_id).map_err(|_| TranscodeError::InvalidRecordingId(recording_id))
}

#[derive(Clone)]
pub struct PgManifestStore {
    pool: DbPool,
}

impl PgManifestStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ManifestStore for PgManifestStore {
    async fn save(
        &self,
        recording_id: u64,
        original: &str,
        rewritten: &str,
    ) -> Result<(), TranscodeError> {
        sqlx::query(
            r#"
            INSERT INTO spots_streams (spot_id, original_playlist, modified_playlist, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (spot_id) DO UPDATE
            SET original_playlist = EXCLUDED.original_playlist,
                modified_playlist = EXCLUDED.modified_playlist,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(db_id(recording_id)?)
        .bind(original)
        .bind(rewritten)
        .bind(OffsetDateTime::now_utc())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn load(&self, recording_id: u64) -> Result<String, TranscodeError> {
        // Ids that cannot be stored were never transcoded.
        let spot_id = db_id(recording_id).map_err(|_| TranscodeError::NotFound(recording_id))?;

        let playlist: Option<String> =
            sqlx::query_scalar("SELECT modified_playlist FROM spots_streams WHERE spot_id = $1")
                .bind(spot_id)
                .fetch_optional(&self.pool)
                .await?;

        playlist.ok_or(TranscodeError::NotFound(recording_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn unconnected_store() -> PgManifestStore {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://spots@127.0.0.1:1/spots")
            .unwrap();
        PgManifestStore::new(pool)
    }

    #[tokio::test]
    async fn load_of_unstorable_id_is_not_found() {
        let store = unconnected_store();

        assert!(matches!(
            store.load(u64::MAX).await,
            Err(TranscodeError::NotFound(u64::MAX))
        ));
    }

    #[tokio::test]
    async fn save_of_unstorable_id_is_rejected() {
        let store = unconnected_store();

        assert!(matches!(
            store.save(u64::MAX, "#EXTM3U", "#EXTM3U").await,
            Err(TranscodeError::InvalidRecordingId(u64::MAX))
        ));
    }
}

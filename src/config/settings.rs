use crate::config::env::{self, EnvKey};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub database_url: String,
    pub minio_url: String,
    pub minio_bucket: String,
    pub minio_access_key: String,
    pub minio_secret_key: String,
    pub jwt_secret: String,
    pub fs_dir: String,
    pub spots_dir: String,
    pub ffmpeg_path: String,
    pub presign_expiry_secs: u64,
}

impl AppConfig {
    pub fn new() -> Result<Self, std::env::VarError> {
        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            database_url: env::get(EnvKey::DatabaseUrl)?,
            minio_url: env::get(EnvKey::MinioUrl)?,
            minio_bucket: env::get(EnvKey::MinioBucket)?,
            minio_access_key: env::get(EnvKey::MinioAccessKey)?,
            minio_secret_key: env::get(EnvKey::MinioSecretKey)?,
            jwt_secret: env::get(EnvKey::JwtSecret)?,
            fs_dir: env::get_or(EnvKey::FsDir, "/tmp/spots"),
            spots_dir: env::get_or(EnvKey::SpotsDir, ""),
            ffmpeg_path: env::get_or(EnvKey::FfmpegPath, "ffmpeg"),
            presign_expiry_secs: env::get_parsed(EnvKey::PresignExpirySecs, 86_400),
        })
    }

    /// Root under which per-recording staging directories are created.
    pub fn staging_root(&self) -> PathBuf {
        let mut root = PathBuf::from(&self.fs_dir);
        if !self.spots_dir.is_empty() {
            root.push(&self.spots_dir);
        }
        root
    }
}

use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub tenant_id: u64,
}

/// Public access key for one recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessKey {
    pub value: String,
    pub recording_id: u64,
    /// Who generated (or last extended) the key.
    pub user_id: u64,
    pub tenant_id: u64,
    /// Lifetime in seconds. On fetch, the remaining lifetime.
    pub expiration: u64,
    pub expired_at: OffsetDateTime,
}

impl AccessKey {
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expired_at <= now
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// A new token was generated.
    Issued(AccessKey),
    /// The unexpired token was kept and its lifetime moved.
    Extended(AccessKey),
    /// Zero duration: the existing key now expires immediately.
    Revoked,
}

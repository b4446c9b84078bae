use super::model::{AccessKey, KeyOutcome};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateKeyRequest {
    /// Lifetime in seconds; 0 revokes the current key.
    #[validate(range(max = 604_800, message = "expiration should be less than 7 days"))]
    pub expiration: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct KeyResponse {
    pub value: String,
    pub expiration: u64,
}

impl From<AccessKey> for KeyResponse {
    fn from(key: AccessKey) -> Self {
        Self {
            value: key.value,
            expiration: key.expiration,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct KeyOutcomeResponse {
    /// One of `issued`, `extended`, `revoked`.
    pub status: String,
    pub key: Option<KeyResponse>,
}

impl From<KeyOutcome> for KeyOutcomeResponse {
    fn from(outcome: KeyOutcome) -> Self {
        let (status, key) = match outcome {
            KeyOutcome::Issued(key) => ("issued", Some(key.into())),
            KeyOutcome::Extended(key) => ("extended", Some(key.into())),
            KeyOutcome::Revoked => ("revoked", None),
        };
        Self {
            status: status.to_string(),
            key,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct KeyQuery {
    /// Public access key, as an alternative to a bearer token.
    pub key: Option<String>,
}

use crate::common::response::ApiError;
use crate::modules::spot::dto::KeyQuery;
use crate::modules::spot::error::KeyError;
use crate::modules::spot::model::User;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    #[serde(rename = "userId")]
    pub user_id: u64,
    #[serde(rename = "tenantId")]
    pub tenant_id: u64,
    pub exp: usize,
    pub iat: usize,
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|auth_header| auth_header.to_str().ok())
        .and_then(|auth_value| auth_value.strip_prefix("Bearer "))
        .map(str::to_owned)
}

pub fn decode_claims(token: &str, secret: &str) -> Result<TokenClaims, ApiError> {
    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| {
        ApiError(
            "Unauthorized: Invalid token signature".to_string(),
            StatusCode::UNAUTHORIZED,
        )
    })
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    // 1. Extract token from header
    let token = bearer_token(headers).ok_or_else(|| {
        ApiError(
            "Unauthorized: Missing or invalid token".to_string(),
            StatusCode::UNAUTHORIZED,
        )
    })?;

    // 2. Verify JWT
    let claims = decode_claims(&token, &state.config.jwt_secret)?;

    // 3. Load the (non-deleted) user
    let user = state
        .keys
        .active_user(claims.user_id)
        .await
        .map_err(|_| {
            ApiError(
                "Unauthorized: User not found".to_string(),
                StatusCode::UNAUTHORIZED,
            )
        })?;

    if user.tenant_id != claims.tenant_id {
        return Err(ApiError(
            "Unauthorized: Tenant mismatch".to_string(),
            StatusCode::UNAUTHORIZED,
        ));
    }

    Ok(user)
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, req.headers()).await?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Accepts a public `?key=` in place of a session token. The key must have
/// been issued for the spot named in the path.
pub async fn key_or_auth_middleware(
    State(state): State<AppState>,
    Path(spot_id): Path<u64>,
    Query(query): Query<KeyQuery>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = match query.key {
        Some(key) => state
            .keys
            .validate_for(&key, spot_id)
            .await
            .map_err(key_rejection)?,
        None => authenticate(&state, req.headers()).await?,
    };
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

fn key_rejection(err: KeyError) -> ApiError {
    let (prefix, status) = match err {
        KeyError::WrongRecording(_) => ("Forbidden", StatusCode::FORBIDDEN),
        _ => ("Unauthorized", StatusCode::UNAUTHORIZED),
    };
    let ApiError(message, _) = ApiError::from(err);
    ApiError(format!("{}: {}", prefix, message), status)
}

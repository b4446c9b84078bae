use crate::modules::spot::dto::*;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::spot::handler::spot_uploaded,
        crate::modules::spot::handler::get_spot_playlist,
        crate::modules::spot::handler::update_public_key,
        crate::modules::spot::handler::get_public_key,
    ),
    components(
        schemas(UpdateKeyRequest, KeyResponse, KeyOutcomeResponse)
    ),
    tags(
        (name = "Spots", description = "Spot streaming and public keys")
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// --- File: crates/services/tably_backend/src/doc.rs ---
#![cfg(feature = "openapi")]
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::schemas::{
    ClientResponse, CreateOrderBody, HealthResponse, OrderLine, RequestOtpBody, SessionsResponse,
    SuccessResponse, VerifyOtpBody, VerifyOtpResponse,
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tably API",
        version = "0.1.0",
        description = "Phone login, sessions and POS proxy"
    ),
    paths(
        handlers::health,
        handlers::auth::request_otp,
        handlers::auth::verify_otp,
        handlers::auth::current_client,
        handlers::auth::list_sessions,
        handlers::clients::update_client,
        handlers::menu::categories,
        handlers::menu::products,
        handlers::menu::product,
        handlers::orders::create_order,
    ),
    components(schemas(
        RequestOtpBody,
        VerifyOtpBody,
        CreateOrderBody,
        OrderLine,
        SuccessResponse,
        VerifyOtpResponse,
        ClientResponse,
        SessionsResponse,
        HealthResponse,
    )),
    modifiers(&BearerAuth),
    servers((url = "/api", description = "Main API Prefix")),
)]
pub struct ApiDoc;

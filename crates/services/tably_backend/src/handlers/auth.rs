// --- File: crates/services/tably_backend/src/handlers/auth.rs ---
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use tably_auth::{phone, SessionRecord};
use tably_common::{field_error, not_found, TablyError};
use tably_pos::NewClient;
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::extract::{AuthClient, ValidatedJson};
use crate::schemas::{
    ClientResponse, RequestOtpBody, SessionsResponse, SuccessResponse, VerifyOtpBody,
    VerifyOtpResponse,
};

/// Sends a login code to the phone, registering the client with the POS on
/// first contact.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/auth/request-otp",
    request_body = RequestOtpBody,
    responses(
        (status = 200, description = "Code sent", body = SuccessResponse),
        (status = 400, description = "Validation error"),
        (status = 500, description = "SMS could not be sent")
    ),
    tag = "Auth"
))]
pub async fn request_otp(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<RequestOtpBody>,
) -> Result<Json<SuccessResponse>, TablyError> {
    let phone = phone::normalize(&body.phone)?;
    let masked = phone::mask(&phone);

    if state.pos.find_client_by_phone(&phone).await?.is_none() {
        let new_client = NewClient::new(phone.clone())
            .with_name(body.name)
            .with_email(body.email);
        let created = state.pos.create_client(new_client).await?;
        info!(phone = %masked, client_id = %created.client_id, "registered new client");
    }

    let code = state.otp.generate();
    state.otp.store(&phone, &code).await?;

    if let Err(err) = state.pos.send_sms(&phone, &state.sms_text(&code)).await {
        if state.rollback_otp_on_sms_failure {
            if let Err(discard_err) = state.otp.discard(&phone).await {
                warn!(phone = %masked, "failed to discard undelivered code: {}", discard_err);
            }
        }
        return Err(err.into());
    }

    info!(phone = %masked, "verification code sent");
    Ok(Json(SuccessResponse { success: true }))
}

/// Exchanges a valid code for a session token.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/auth/verify-otp",
    request_body = VerifyOtpBody,
    responses(
        (status = 200, description = "Token issued", body = VerifyOtpResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid or expired code"),
        (status = 404, description = "No client for this phone")
    ),
    tag = "Auth"
))]
pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<VerifyOtpBody>,
) -> Result<Json<VerifyOtpResponse>, TablyError> {
    let phone = phone::normalize(&body.phone)?;
    let expected = state.otp.code_length();
    if body.code.chars().count() != expected {
        return Err(field_error(
            "code",
            format!("Code must be exactly {} characters", expected),
        ));
    }

    state.otp.verify(&phone, &body.code).await?;

    let client = state
        .pos
        .find_client_by_phone(&phone)
        .await?
        .ok_or_else(|| not_found("Client not found"))?;

    let token = state.tokens.sign(&client.client_id)?;
    state
        .sessions
        .append(
            &client.client_id,
            SessionRecord::new(token.clone(), body.session_name),
        )
        .await?;

    info!(phone = %phone::mask(&phone), client_id = %client.client_id, "session issued");
    Ok(Json(VerifyOtpResponse { token, client }))
}

/// The authenticated client's POS record.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/auth/self",
    responses(
        (status = 200, description = "Current client", body = ClientResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Client no longer exists")
    ),
    security(("bearer" = [])),
    tag = "Auth"
))]
pub async fn current_client(
    State(state): State<Arc<AppState>>,
    AuthClient(client_id): AuthClient,
) -> Result<Json<ClientResponse>, TablyError> {
    let client = state
        .pos
        .get_client_by_id(&client_id)
        .await?
        .ok_or_else(|| not_found("Client not found"))?;
    Ok(Json(ClientResponse { client }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/auth/sessions",
    responses(
        (status = 200, description = "Sessions issued to the current client", body = SessionsResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "Auth"
))]
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    AuthClient(client_id): AuthClient,
) -> Result<Json<SessionsResponse>, TablyError> {
    let sessions = state.sessions.list(&client_id).await?;
    Ok(Json(SessionsResponse { sessions }))
}

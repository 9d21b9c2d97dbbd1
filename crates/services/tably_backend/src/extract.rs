// --- File: crates/services/tably_backend/src/extract.rs ---
use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use tably_auth::authenticate;
use tably_common::{validation_error, FieldErrors, TablyError};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::app_state::AppState;

/// JSON body that has been deserialized and passed its `Validate` rules.
/// Malformed JSON, missing fields and rule violations are all 400s.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = TablyError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| validation_error(rejection.body_text(), FieldErrors::new()))?;
        value.validate().map_err(into_validation_error)?;
        Ok(Self(value))
    }
}

pub fn into_validation_error(errors: ValidationErrors) -> TablyError {
    let mut fields = FieldErrors::new();
    collect_field_errors("", &errors, &mut fields);
    validation_error("Request validation failed", fields)
}

/// Flattens nested errors into paths such as `products[0].count`.
fn collect_field_errors(prefix: &str, errors: &ValidationErrors, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                let messages = out.entry(path).or_default();
                for error in list {
                    messages.push(
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("failed '{}' check", error.code)),
                    );
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

/// The client id of an authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthClient(pub String);

impl FromRequestParts<Arc<AppState>> for AuthClient {
    type Rejection = TablyError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let client_id = authenticate(&parts.headers, &state.cookie_name, &state.tokens)?;
        Ok(Self(client_id))
    }
}

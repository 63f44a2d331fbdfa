use axum::{
    RequestPartsExt,
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use review_server_domain::{ServiceError, account::AuthenticatedUser};

use crate::{ApiState, error::ApiError, jwt::validate_jwt};

pub const TOKEN_COOKIE: &str = "token";

/// The logged in user of a request, taken from a bearer token or the
/// session cookie.
pub struct Auth(pub AuthenticatedUser);

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|part| {
            let (name, token) = part.trim().split_once('=')?;
            (name == TOKEN_COOKIE && !token.is_empty()).then(|| token.to_string())
        })
}

fn not_logged_in() -> ApiError {
    ServiceError::Unauthorized("Please log in to continue".to_string()).into()
}

impl FromRequestParts<ApiState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let token = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
            Ok(TypedHeader(Authorization(bearer))) => Some(bearer.token().to_string()),
            Err(_) => cookie_token(&parts.headers),
        };
        let Some(token) = token else {
            return Err(not_logged_in());
        };
        let Some(user_id) = validate_jwt(&state.keys, &token) else {
            return Err(not_logged_in());
        };

        match state.app.account_service.find_user(user_id).await {
            Ok(user) => Ok(Auth(user)),
            Err(ServiceError::Unauthorized(_)) => Err(not_logged_in()),
            Err(e) => Err(e.into()),
        }
    }
}

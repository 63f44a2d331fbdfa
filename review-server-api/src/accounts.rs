use axum::{
    Form, Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use review_server_domain::UserId;

use crate::{
    ApiState,
    auth::TOKEN_COOKIE,
    error::ApiResult,
    jwt::generate_jwt,
};

#[derive(serde::Deserialize)]
pub struct CredentialsForm {
    username: String,
    password: String,
}

#[derive(serde::Serialize)]
pub struct JsonRegistered {
    id: UserId,
    message: &'static str,
}

#[derive(serde::Serialize)]
pub struct JsonLogin {
    token: String,
    username: String,
    message: &'static str,
}

pub async fn register(
    State(state): State<ApiState>,
    Form(form): Form<CredentialsForm>,
) -> ApiResult<(StatusCode, Json<JsonRegistered>)> {
    let id = state
        .app
        .account_service
        .register(&form.username, &form.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(JsonRegistered {
            id,
            message: "Registration successful, please log in",
        }),
    ))
}

pub async fn login(
    State(state): State<ApiState>,
    Form(form): Form<CredentialsForm>,
) -> ApiResult<Response> {
    let user = state
        .app
        .account_service
        .login(&form.username, &form.password)
        .await?;
    let token = generate_jwt(&state.keys, &user)?;

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        TOKEN_COOKIE, token
    );
    let body = Json(JsonLogin {
        token,
        username: user.username,
        message: "Logged in successfully",
    });
    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

pub async fn logout() -> Response {
    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        TOKEN_COOKIE
    );
    (
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({ "message": "You have been logged out" })),
    )
        .into_response()
}

use axum::{
    extract::State,
    routing::{get, post},
    Form, Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            ForgotPasswordRequest, LoginForm, LoginResponse, MessageResponse, PublicUser,
            RegisterRequest, ResetPasswordRequest, VerifyTokenRequest, VerifyTokenResponse,
            FORGOT_PASSWORD_MESSAGE, RESET_SUCCESS_MESSAGE,
        },
        jwt::AuthUser,
        service,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/verify-reset-token", post(verify_reset_token))
        .route("/auth/reset-password", post(reset_password))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = service::register(&state, payload).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (token, user) = service::login(&state, &form.username, &form.password).await?;
    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "bearer",
        username: user.username,
        role: user.role,
    }))
}

#[instrument(skip_all)]
pub async fn me(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(user.into())
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    service::forgot_password(&state, &payload.email).await?;
    Ok(Json(MessageResponse {
        message: FORGOT_PASSWORD_MESSAGE,
    }))
}

#[instrument(skip(state, payload))]
pub async fn verify_reset_token(
    State(state): State<AppState>,
    Json(payload): Json<VerifyTokenRequest>,
) -> Result<Json<VerifyTokenResponse>, ApiError> {
    let email = service::verify_reset_token(&state, &payload.token).await?;
    Ok(Json(VerifyTokenResponse { valid: true, email }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    service::reset_password(&state, &payload.token, &payload.new_password).await?;
    Ok(Json(MessageResponse {
        message: RESET_SUCCESS_MESSAGE,
    }))
}

use axum::extract::FromRef;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::RegisterRequest,
        jwt::JwtKeys,
        password, policy, reset,
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

/// Register a new user. Uniqueness is checked username first, then email,
/// so a duplicate-email failure tells the caller it was the email that
/// collided. The credential policy runs before any hashing.
pub async fn register(state: &AppState, req: RegisterRequest) -> Result<User, ApiError> {
    if User::find_by_username(&state.db, &req.username)
        .await
        .map_err(ApiError::Internal)?
        .is_some()
    {
        return Err(ApiError::Conflict("Username already registered".into()));
    }

    if User::find_by_email(&state.db, &req.email)
        .await
        .map_err(ApiError::Internal)?
        .is_some()
    {
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    if let Some(violation) = policy::first_violation(&req.password) {
        return Err(ApiError::PolicyViolation(violation.into()));
    }

    let hash = password::hash_password(&req.password).map_err(ApiError::Internal)?;
    let role = req.role.unwrap_or_default();

    let user = User::create(&state.db, &req.username, &req.email, &hash, role)
        .await
        .map_err(ApiError::Internal)?;

    info!(user_id = %user.id, username = %user.username, role = %user.role, "user registered");
    Ok(user)
}

/// Authenticate by email and issue a session token.
///
/// The two failure messages are deliberately distinct and must never be
/// swapped: "Account not exist" for an unknown email, "Invalid Password"
/// for a bad credential. This mirrors the observed behavior of the system
/// even though it leaks account existence at the login endpoint.
pub async fn login(state: &AppState, email: &str, plain: &str) -> Result<(String, User), ApiError> {
    let user = User::find_by_email(&state.db, email)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| {
            warn!(%email, "login for unknown account");
            ApiError::Unauthorized("Account not exist".into())
        })?;

    if !password::verify_password(plain, &user.hashed_password) {
        warn!(%email, user_id = %user.id, "login with invalid password");
        return Err(ApiError::Unauthorized("Invalid Password".into()));
    }

    let keys = JwtKeys::from_ref(state);
    let token = keys.sign(&user.username).map_err(ApiError::Internal)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok((token, user))
}

/// Start a password-reset flow. Always succeeds from the caller's point of
/// view; whether the email exists is never revealed. The token write is
/// committed before the send, and a failed send is logged and swallowed.
pub async fn forgot_password(state: &AppState, email: &str) -> Result<(), ApiError> {
    let user = User::find_by_email(&state.db, email)
        .await
        .map_err(ApiError::Internal)?;

    if let Some(user) = user {
        let token = reset::generate_reset_token();
        let expires = reset::reset_token_expiry();
        User::set_reset_token(&state.db, user.id, &token, expires)
            .await
            .map_err(ApiError::Internal)?;

        if let Err(e) = state.mailer.send_reset_email(&user.email, &token).await {
            warn!(error = %e, user_id = %user.id, "reset email send failed");
        }
    }

    Ok(())
}

/// Check a reset token without consuming it. Returns the associated email.
pub async fn verify_reset_token(state: &AppState, token: &str) -> Result<String, ApiError> {
    let user = User::find_by_reset_token(&state.db, token)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::InvalidToken)?;

    match user.reset_token_expires {
        Some(expires) if OffsetDateTime::now_utc() < expires => Ok(user.email),
        _ => Err(ApiError::ExpiredToken),
    }
}

/// Replace the password using a valid reset token. The update is a single
/// conditional statement that clears the token as it writes the hash, so a
/// token can only ever be consumed once. The new password is not run back
/// through the credential policy; that matches the source behavior.
pub async fn reset_password(state: &AppState, token: &str, new_plain: &str) -> Result<(), ApiError> {
    let hash = password::hash_password(new_plain).map_err(ApiError::Internal)?;
    let now = OffsetDateTime::now_utc();

    match User::consume_reset_token(&state.db, token, &hash, now)
        .await
        .map_err(ApiError::Internal)?
    {
        Some(email) => {
            info!(%email, "password reset completed");
            Ok(())
        }
        None => {
            // Token did not qualify; decide which failure to report.
            let holder = User::find_by_reset_token(&state.db, token)
                .await
                .map_err(ApiError::Internal)?;
            match holder {
                Some(_) => Err(ApiError::ExpiredToken),
                None => Err(ApiError::InvalidToken),
            }
        }
    }
}

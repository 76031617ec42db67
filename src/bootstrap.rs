use tracing::info;

use crate::{
    auth::{password, rbac::Role, repo::User},
    state::AppState,
};

/// Seed exactly one admin account if the users table is empty. Runs once at
/// startup, after migrations; a populated table makes this a no-op.
pub async fn ensure_admin(state: &AppState) -> anyhow::Result<()> {
    if User::count(&state.db).await? > 0 {
        return Ok(());
    }

    let admin = &state.config.admin;
    let hash = password::hash_password(&admin.password)?;
    let user = User::create(&state.db, &admin.username, &admin.email, &hash, Role::Admin).await?;
    info!(user_id = %user.id, username = %user.username, "bootstrap admin created");
    Ok(())
}

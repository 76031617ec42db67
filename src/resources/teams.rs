use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{
        jwt::AuthUser,
        rbac::{self, Action, Resource},
    },
    error::ApiError,
    state::AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub leader: String,
    pub members_count: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateTeam {
    pub name: String,
    pub leader: String,
    #[serde(default)]
    pub members_count: i32,
}

/// Explicit patch: only the listed fields are mutable, and absent fields
/// leave the row untouched.
#[derive(Debug, Deserialize)]
pub struct TeamPatch {
    pub name: Option<String>,
    pub leader: Option<String>,
    pub members_count: Option<i32>,
}

impl Team {
    pub fn apply(&mut self, patch: TeamPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(leader) = patch.leader {
            self.leader = leader;
        }
        if let Some(members_count) = patch.members_count {
            self.members_count = members_count;
        }
    }

    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Team>> {
        let rows = sqlx::query_as::<_, Team>(
            "SELECT id, name, leader, members_count FROM teams ORDER BY name",
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Team>> {
        let row = sqlx::query_as::<_, Team>(
            "SELECT id, name, leader, members_count FROM teams WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn insert(db: &PgPool, new: CreateTeam) -> anyhow::Result<Team> {
        let row = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (name, leader, members_count)
            VALUES ($1, $2, $3)
            RETURNING id, name, leader, members_count
            "#,
        )
        .bind(new.name)
        .bind(new.leader)
        .bind(new.members_count)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, db: &PgPool) -> anyhow::Result<()> {
        sqlx::query("UPDATE teams SET name = $1, leader = $2, members_count = $3 WHERE id = $4")
            .bind(&self.name)
            .bind(&self.leader)
            .bind(self.members_count)
            .bind(self.id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/teams", get(list_teams).post(create_team))
        .route("/teams/:id", put(update_team).delete(delete_team))
}

#[instrument(skip(state))]
pub async fn list_teams(State(state): State<AppState>) -> Result<Json<Vec<Team>>, ApiError> {
    let teams = Team::list(&state.db).await.map_err(ApiError::Internal)?;
    Ok(Json(teams))
}

#[instrument(skip(state, payload))]
pub async fn create_team(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateTeam>,
) -> Result<Json<Team>, ApiError> {
    rbac::check(user.role, Resource::Team, Action::Create)?;
    let team = Team::insert(&state.db, payload)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(team))
}

#[instrument(skip(state, patch))]
pub async fn update_team(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<TeamPatch>,
) -> Result<Json<Team>, ApiError> {
    rbac::check(user.role, Resource::Team, Action::Update)?;
    let mut team = Team::get(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Team"))?;
    team.apply(patch);
    team.update(&state.db).await.map_err(ApiError::Internal)?;
    Ok(Json(team))
}

#[instrument(skip(state))]
pub async fn delete_team(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    rbac::check(user.role, Resource::Team, Action::Delete)?;
    if !Team::delete(&state.db, id).await.map_err(ApiError::Internal)? {
        return Err(ApiError::NotFound("Team"));
    }
    Ok(Json(json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_applies_only_present_fields() {
        let mut team = Team {
            id: Uuid::new_v4(),
            name: "Mechanics".into(),
            leader: "John Doe".into(),
            members_count: 5,
        };
        team.apply(TeamPatch {
            name: None,
            leader: Some("Sarah Sparks".into()),
            members_count: None,
        });
        assert_eq!(team.name, "Mechanics");
        assert_eq!(team.leader, "Sarah Sparks");
        assert_eq!(team.members_count, 5);
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let mut team = Team {
            id: Uuid::new_v4(),
            name: "IT Support".into(),
            leader: "Alan Turing".into(),
            members_count: 4,
        };
        let before = team.clone();
        team.apply(serde_json::from_str("{}").unwrap());
        assert_eq!(team.name, before.name);
        assert_eq!(team.leader, before.leader);
        assert_eq!(team.members_count, before.members_count);
    }
}

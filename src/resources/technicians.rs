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
pub struct Technician {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
    pub team_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTechnician {
    pub name: String,
    pub avatar: String,
    pub team_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct TechnicianPatch {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub team_id: Option<Uuid>,
}

impl Technician {
    pub fn apply(&mut self, patch: TechnicianPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = avatar;
        }
        if let Some(team_id) = patch.team_id {
            self.team_id = Some(team_id);
        }
    }

    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Technician>> {
        let rows = sqlx::query_as::<_, Technician>(
            "SELECT id, name, avatar, team_id FROM technicians ORDER BY name",
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Technician>> {
        let row = sqlx::query_as::<_, Technician>(
            "SELECT id, name, avatar, team_id FROM technicians WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn insert(db: &PgPool, new: CreateTechnician) -> anyhow::Result<Technician> {
        let row = sqlx::query_as::<_, Technician>(
            r#"
            INSERT INTO technicians (name, avatar, team_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, avatar, team_id
            "#,
        )
        .bind(new.name)
        .bind(new.avatar)
        .bind(new.team_id)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, db: &PgPool) -> anyhow::Result<()> {
        sqlx::query("UPDATE technicians SET name = $1, avatar = $2, team_id = $3 WHERE id = $4")
            .bind(&self.name)
            .bind(&self.avatar)
            .bind(self.team_id)
            .bind(self.id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM technicians WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/technicians", get(list_technicians).post(create_technician))
        .route(
            "/technicians/:id",
            put(update_technician).delete(delete_technician),
        )
}

#[instrument(skip(state))]
pub async fn list_technicians(
    State(state): State<AppState>,
) -> Result<Json<Vec<Technician>>, ApiError> {
    let technicians = Technician::list(&state.db)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(technicians))
}

#[instrument(skip(state, payload))]
pub async fn create_technician(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateTechnician>,
) -> Result<Json<Technician>, ApiError> {
    rbac::check(user.role, Resource::Technician, Action::Create)?;
    let technician = Technician::insert(&state.db, payload)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(technician))
}

#[instrument(skip(state, patch))]
pub async fn update_technician(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<TechnicianPatch>,
) -> Result<Json<Technician>, ApiError> {
    rbac::check(user.role, Resource::Technician, Action::Update)?;
    let mut technician = Technician::get(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Technician"))?;
    technician.apply(patch);
    technician
        .update(&state.db)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(technician))
}

#[instrument(skip(state))]
pub async fn delete_technician(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    rbac::check(user.role, Resource::Technician, Action::Delete)?;
    if !Technician::delete(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
    {
        return Err(ApiError::NotFound("Technician"));
    }
    Ok(Json(json!({ "ok": true })))
}

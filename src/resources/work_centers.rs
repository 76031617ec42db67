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
pub struct WorkCenter {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub tag: Option<String>,
    pub alternative_workcenters: Option<String>,
    pub cost_per_hour: f64,
    pub capacity_time: f64,
    pub time_efficiency: f64,
    pub oee_target: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkCenter {
    pub name: String,
    pub code: String,
    pub tag: Option<String>,
    pub alternative_workcenters: Option<String>,
    #[serde(default)]
    pub cost_per_hour: f64,
    #[serde(default = "default_capacity_time")]
    pub capacity_time: f64,
    #[serde(default = "default_time_efficiency")]
    pub time_efficiency: f64,
    #[serde(default = "default_oee_target")]
    pub oee_target: f64,
}

fn default_capacity_time() -> f64 {
    100.0
}
fn default_time_efficiency() -> f64 {
    100.0
}
fn default_oee_target() -> f64 {
    85.0
}

#[derive(Debug, Deserialize)]
pub struct WorkCenterPatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub tag: Option<String>,
    pub alternative_workcenters: Option<String>,
    pub cost_per_hour: Option<f64>,
    pub capacity_time: Option<f64>,
    pub time_efficiency: Option<f64>,
    pub oee_target: Option<f64>,
}

impl WorkCenter {
    pub fn apply(&mut self, patch: WorkCenterPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(code) = patch.code {
            self.code = code;
        }
        if let Some(tag) = patch.tag {
            self.tag = Some(tag);
        }
        if let Some(alt) = patch.alternative_workcenters {
            self.alternative_workcenters = Some(alt);
        }
        if let Some(cost) = patch.cost_per_hour {
            self.cost_per_hour = cost;
        }
        if let Some(capacity) = patch.capacity_time {
            self.capacity_time = capacity;
        }
        if let Some(efficiency) = patch.time_efficiency {
            self.time_efficiency = efficiency;
        }
        if let Some(oee) = patch.oee_target {
            self.oee_target = oee;
        }
    }

    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<WorkCenter>> {
        let rows = sqlx::query_as::<_, WorkCenter>(
            r#"
            SELECT id, name, code, tag, alternative_workcenters, cost_per_hour,
                   capacity_time, time_efficiency, oee_target
            FROM work_centers
            ORDER BY code
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<WorkCenter>> {
        let row = sqlx::query_as::<_, WorkCenter>(
            r#"
            SELECT id, name, code, tag, alternative_workcenters, cost_per_hour,
                   capacity_time, time_efficiency, oee_target
            FROM work_centers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn insert(db: &PgPool, new: CreateWorkCenter) -> anyhow::Result<WorkCenter> {
        let row = sqlx::query_as::<_, WorkCenter>(
            r#"
            INSERT INTO work_centers
                (name, code, tag, alternative_workcenters, cost_per_hour,
                 capacity_time, time_efficiency, oee_target)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, code, tag, alternative_workcenters, cost_per_hour,
                      capacity_time, time_efficiency, oee_target
            "#,
        )
        .bind(new.name)
        .bind(new.code)
        .bind(new.tag)
        .bind(new.alternative_workcenters)
        .bind(new.cost_per_hour)
        .bind(new.capacity_time)
        .bind(new.time_efficiency)
        .bind(new.oee_target)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, db: &PgPool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE work_centers
            SET name = $1, code = $2, tag = $3, alternative_workcenters = $4,
                cost_per_hour = $5, capacity_time = $6, time_efficiency = $7, oee_target = $8
            WHERE id = $9
            "#,
        )
        .bind(&self.name)
        .bind(&self.code)
        .bind(&self.tag)
        .bind(&self.alternative_workcenters)
        .bind(self.cost_per_hour)
        .bind(self.capacity_time)
        .bind(self.time_efficiency)
        .bind(self.oee_target)
        .bind(self.id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM work_centers WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/work-centers", get(list_work_centers).post(create_work_center))
        .route(
            "/work-centers/:id",
            put(update_work_center).delete(delete_work_center),
        )
}

#[instrument(skip(state))]
pub async fn list_work_centers(
    State(state): State<AppState>,
) -> Result<Json<Vec<WorkCenter>>, ApiError> {
    let centers = WorkCenter::list(&state.db)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(centers))
}

#[instrument(skip(state, payload))]
pub async fn create_work_center(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateWorkCenter>,
) -> Result<Json<WorkCenter>, ApiError> {
    rbac::check(user.role, Resource::WorkCenter, Action::Create)?;
    let center = WorkCenter::insert(&state.db, payload)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(center))
}

#[instrument(skip(state, patch))]
pub async fn update_work_center(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<WorkCenterPatch>,
) -> Result<Json<WorkCenter>, ApiError> {
    rbac::check(user.role, Resource::WorkCenter, Action::Update)?;
    let mut center = WorkCenter::get(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Work Center"))?;
    center.apply(patch);
    center.update(&state.db).await.map_err(ApiError::Internal)?;
    Ok(Json(center))
}

#[instrument(skip(state))]
pub async fn delete_work_center(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    rbac::check(user.role, Resource::WorkCenter, Action::Delete)?;
    if !WorkCenter::delete(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
    {
        return Err(ApiError::NotFound("Work Center"));
    }
    Ok(Json(json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_match_the_model() {
        let new: CreateWorkCenter =
            serde_json::from_str(r#"{"name":"Assembly 1","code":"ASSEM/01"}"#).unwrap();
        assert_eq!(new.cost_per_hour, 0.0);
        assert_eq!(new.capacity_time, 100.0);
        assert_eq!(new.time_efficiency, 100.0);
        assert_eq!(new.oee_target, 85.0);
    }
}

use axum::{
    extract::{Path, Query, State},
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
    resources::equipment::Equipment,
    state::AppState,
};

pub const STAGE_SCRAP: &str = "Scrap";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MaintenanceRequest {
    pub id: Uuid,
    pub subject: String,
    pub equipment_id: Option<Uuid>,
    pub work_center_id: Option<Uuid>,
    #[sqlx(rename = "type")]
    pub r#type: String,
    pub stage: String,
    pub scheduled_date: String,
    pub duration: f64,
    pub technician_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub priority: String,
    pub company: Option<String>,
    pub worksheet_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMaintenanceRequest {
    pub subject: String,
    pub equipment_id: Option<Uuid>,
    pub work_center_id: Option<Uuid>,
    pub r#type: String,
    #[serde(default = "default_stage")]
    pub stage: String,
    pub scheduled_date: String,
    #[serde(default)]
    pub duration: f64,
    pub technician_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    #[serde(default = "default_priority")]
    pub priority: String,
    pub company: Option<String>,
    pub worksheet_notes: Option<String>,
}

fn default_stage() -> String {
    "New".to_string()
}
fn default_priority() -> String {
    "Medium".to_string()
}

#[derive(Debug, Deserialize)]
pub struct MaintenanceRequestPatch {
    pub subject: Option<String>,
    pub equipment_id: Option<Uuid>,
    pub work_center_id: Option<Uuid>,
    pub r#type: Option<String>,
    pub stage: Option<String>,
    pub scheduled_date: Option<String>,
    pub duration: Option<f64>,
    pub technician_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub priority: Option<String>,
    pub company: Option<String>,
    pub worksheet_notes: Option<String>,
}

/// Stage transitions arrive as a query parameter: PUT /requests/:id/stage?stage=...
#[derive(Debug, Deserialize)]
pub struct StageQuery {
    pub stage: String,
}

impl MaintenanceRequest {
    pub fn apply(&mut self, patch: MaintenanceRequestPatch) {
        if let Some(subject) = patch.subject {
            self.subject = subject;
        }
        if let Some(equipment_id) = patch.equipment_id {
            self.equipment_id = Some(equipment_id);
        }
        if let Some(work_center_id) = patch.work_center_id {
            self.work_center_id = Some(work_center_id);
        }
        if let Some(kind) = patch.r#type {
            self.r#type = kind;
        }
        if let Some(stage) = patch.stage {
            self.stage = stage;
        }
        if let Some(scheduled_date) = patch.scheduled_date {
            self.scheduled_date = scheduled_date;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(technician_id) = patch.technician_id {
            self.technician_id = Some(technician_id);
        }
        if let Some(team_id) = patch.team_id {
            self.team_id = Some(team_id);
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(company) = patch.company {
            self.company = Some(company);
        }
        if let Some(notes) = patch.worksheet_notes {
            self.worksheet_notes = Some(notes);
        }
    }

    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<MaintenanceRequest>> {
        let rows = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            SELECT id, subject, equipment_id, work_center_id, type, stage,
                   scheduled_date, duration, technician_id, team_id, priority,
                   company, worksheet_notes
            FROM maintenance_requests
            ORDER BY scheduled_date
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<MaintenanceRequest>> {
        let row = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            SELECT id, subject, equipment_id, work_center_id, type, stage,
                   scheduled_date, duration, technician_id, team_id, priority,
                   company, worksheet_notes
            FROM maintenance_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn insert(db: &PgPool, new: CreateMaintenanceRequest) -> anyhow::Result<Self> {
        let row = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            INSERT INTO maintenance_requests
                (subject, equipment_id, work_center_id, type, stage, scheduled_date,
                 duration, technician_id, team_id, priority, company, worksheet_notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, subject, equipment_id, work_center_id, type, stage,
                      scheduled_date, duration, technician_id, team_id, priority,
                      company, worksheet_notes
            "#,
        )
        .bind(new.subject)
        .bind(new.equipment_id)
        .bind(new.work_center_id)
        .bind(new.r#type)
        .bind(new.stage)
        .bind(new.scheduled_date)
        .bind(new.duration)
        .bind(new.technician_id)
        .bind(new.team_id)
        .bind(new.priority)
        .bind(new.company)
        .bind(new.worksheet_notes)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, db: &PgPool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE maintenance_requests
            SET subject = $1, equipment_id = $2, work_center_id = $3, type = $4,
                stage = $5, scheduled_date = $6, duration = $7, technician_id = $8,
                team_id = $9, priority = $10, company = $11, worksheet_notes = $12
            WHERE id = $13
            "#,
        )
        .bind(&self.subject)
        .bind(self.equipment_id)
        .bind(self.work_center_id)
        .bind(&self.r#type)
        .bind(&self.stage)
        .bind(&self.scheduled_date)
        .bind(self.duration)
        .bind(self.technician_id)
        .bind(self.team_id)
        .bind(&self.priority)
        .bind(&self.company)
        .bind(&self.worksheet_notes)
        .bind(self.id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM maintenance_requests WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/requests", get(list_requests).post(create_request))
        .route("/requests/:id", put(update_request).delete(delete_request))
        .route("/requests/:id/stage", put(update_stage))
}

#[instrument(skip(state))]
pub async fn list_requests(
    State(state): State<AppState>,
) -> Result<Json<Vec<MaintenanceRequest>>, ApiError> {
    let requests = MaintenanceRequest::list(&state.db)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(requests))
}

/// Any authenticated caller may open a maintenance request.
#[instrument(skip(state, payload))]
pub async fn create_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateMaintenanceRequest>,
) -> Result<Json<MaintenanceRequest>, ApiError> {
    rbac::check(user.role, Resource::MaintenanceRequest, Action::Create)?;
    let request = MaintenanceRequest::insert(&state.db, payload)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(request))
}

#[instrument(skip(state, patch))]
pub async fn update_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<MaintenanceRequestPatch>,
) -> Result<Json<MaintenanceRequest>, ApiError> {
    rbac::check(user.role, Resource::MaintenanceRequest, Action::Update)?;
    let mut request = MaintenanceRequest::get(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Request"))?;
    request.apply(patch);
    request.update(&state.db).await.map_err(ApiError::Internal)?;
    Ok(Json(request))
}

/// Stage transition. Moving a request to "Scrap" also marks its equipment
/// as scrapped.
#[instrument(skip(state))]
pub async fn update_stage(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<StageQuery>,
) -> Result<Json<MaintenanceRequest>, ApiError> {
    rbac::check(user.role, Resource::MaintenanceRequest, Action::Update)?;
    let mut request = MaintenanceRequest::get(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Request"))?;

    request.stage = query.stage;

    if request.stage == STAGE_SCRAP {
        if let Some(equipment_id) = request.equipment_id {
            Equipment::mark_scrapped(&state.db, equipment_id)
                .await
                .map_err(ApiError::Internal)?;
        }
    }

    request.update(&state.db).await.map_err(ApiError::Internal)?;
    Ok(Json(request))
}

#[instrument(skip(state))]
pub async fn delete_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    rbac::check(user.role, Resource::MaintenanceRequest, Action::Delete)?;
    if !MaintenanceRequest::delete(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
    {
        return Err(ApiError::NotFound("Request"));
    }
    Ok(Json(json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_stage_and_priority() {
        let new: CreateMaintenanceRequest = serde_json::from_str(
            r#"{
                "subject": "Leaking hydraulics",
                "type": "Corrective",
                "scheduled_date": "2026-09-01"
            }"#,
        )
        .unwrap();
        assert_eq!(new.stage, "New");
        assert_eq!(new.priority, "Medium");
        assert_eq!(new.duration, 0.0);
    }

    #[test]
    fn patch_merges_stage_and_notes() {
        let mut request = MaintenanceRequest {
            id: Uuid::new_v4(),
            subject: "Leaking hydraulics".into(),
            equipment_id: None,
            work_center_id: None,
            r#type: "Corrective".into(),
            stage: "New".into(),
            scheduled_date: "2026-09-01".into(),
            duration: 0.0,
            technician_id: None,
            team_id: None,
            priority: "Medium".into(),
            company: None,
            worksheet_notes: None,
        };
        request.apply(MaintenanceRequestPatch {
            subject: None,
            equipment_id: None,
            work_center_id: None,
            r#type: None,
            stage: Some("In Progress".into()),
            scheduled_date: None,
            duration: None,
            technician_id: None,
            team_id: None,
            priority: None,
            company: None,
            worksheet_notes: Some("Replaced seal".into()),
        });
        assert_eq!(request.stage, "In Progress");
        assert_eq!(request.worksheet_notes.as_deref(), Some("Replaced seal"));
        assert_eq!(request.subject, "Leaking hydraulics");
    }
}

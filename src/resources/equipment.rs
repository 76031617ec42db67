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

pub const STATUS_OPERATIONAL: &str = "operational";
pub const STATUS_SCRAPPED: &str = "scrapped";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Equipment {
    pub id: Uuid,
    pub name: String,
    pub serial_number: String,
    pub purchase_date: String,
    pub warranty: String,
    pub location: String,
    pub department: String,
    pub employee: String,
    pub status: String,
    pub health: i32,
    pub team_id: Option<Uuid>,
    pub technician_id: Option<Uuid>,
    pub company: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEquipment {
    pub name: String,
    pub serial_number: String,
    pub purchase_date: String,
    pub warranty: String,
    pub location: String,
    pub department: String,
    pub employee: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_health")]
    pub health: i32,
    pub team_id: Option<Uuid>,
    pub technician_id: Option<Uuid>,
    pub company: Option<String>,
    pub category_id: Option<Uuid>,
}

fn default_status() -> String {
    STATUS_OPERATIONAL.to_string()
}
fn default_health() -> i32 {
    100
}

#[derive(Debug, Deserialize)]
pub struct EquipmentPatch {
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<String>,
    pub warranty: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub employee: Option<String>,
    pub status: Option<String>,
    pub health: Option<i32>,
    pub team_id: Option<Uuid>,
    pub technician_id: Option<Uuid>,
    pub company: Option<String>,
    pub category_id: Option<Uuid>,
}

impl Equipment {
    pub fn apply(&mut self, patch: EquipmentPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(serial_number) = patch.serial_number {
            self.serial_number = serial_number;
        }
        if let Some(purchase_date) = patch.purchase_date {
            self.purchase_date = purchase_date;
        }
        if let Some(warranty) = patch.warranty {
            self.warranty = warranty;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(department) = patch.department {
            self.department = department;
        }
        if let Some(employee) = patch.employee {
            self.employee = employee;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(health) = patch.health {
            self.health = health;
        }
        if let Some(team_id) = patch.team_id {
            self.team_id = Some(team_id);
        }
        if let Some(technician_id) = patch.technician_id {
            self.technician_id = Some(technician_id);
        }
        if let Some(company) = patch.company {
            self.company = Some(company);
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = Some(category_id);
        }
    }

    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>(
            r#"
            SELECT id, name, serial_number, purchase_date, warranty, location,
                   department, employee, status, health, team_id, technician_id,
                   company, category_id
            FROM equipment
            ORDER BY name
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Equipment>> {
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            SELECT id, name, serial_number, purchase_date, warranty, location,
                   department, employee, status, health, team_id, technician_id,
                   company, category_id
            FROM equipment
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn insert(db: &PgPool, new: CreateEquipment) -> anyhow::Result<Equipment> {
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment
                (name, serial_number, purchase_date, warranty, location, department,
                 employee, status, health, team_id, technician_id, company, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, name, serial_number, purchase_date, warranty, location,
                      department, employee, status, health, team_id, technician_id,
                      company, category_id
            "#,
        )
        .bind(new.name)
        .bind(new.serial_number)
        .bind(new.purchase_date)
        .bind(new.warranty)
        .bind(new.location)
        .bind(new.department)
        .bind(new.employee)
        .bind(new.status)
        .bind(new.health)
        .bind(new.team_id)
        .bind(new.technician_id)
        .bind(new.company)
        .bind(new.category_id)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, db: &PgPool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE equipment
            SET name = $1, serial_number = $2, purchase_date = $3, warranty = $4,
                location = $5, department = $6, employee = $7, status = $8, health = $9,
                team_id = $10, technician_id = $11, company = $12, category_id = $13
            WHERE id = $14
            "#,
        )
        .bind(&self.name)
        .bind(&self.serial_number)
        .bind(&self.purchase_date)
        .bind(&self.warranty)
        .bind(&self.location)
        .bind(&self.department)
        .bind(&self.employee)
        .bind(&self.status)
        .bind(self.health)
        .bind(self.team_id)
        .bind(self.technician_id)
        .bind(&self.company)
        .bind(self.category_id)
        .bind(self.id)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Used by the scrap stage transition on maintenance requests.
    pub async fn mark_scrapped(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE equipment SET status = $1 WHERE id = $2")
            .bind(STATUS_SCRAPPED)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/equipment", get(list_equipment).post(create_equipment))
        .route("/equipment/:id", put(update_equipment).delete(delete_equipment))
}

#[instrument(skip(state))]
pub async fn list_equipment(
    State(state): State<AppState>,
) -> Result<Json<Vec<Equipment>>, ApiError> {
    let equipment = Equipment::list(&state.db).await.map_err(ApiError::Internal)?;
    Ok(Json(equipment))
}

#[instrument(skip(state, payload))]
pub async fn create_equipment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateEquipment>,
) -> Result<Json<Equipment>, ApiError> {
    rbac::check(user.role, Resource::Equipment, Action::Create)?;
    let equipment = Equipment::insert(&state.db, payload)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(equipment))
}

#[instrument(skip(state, patch))]
pub async fn update_equipment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<EquipmentPatch>,
) -> Result<Json<Equipment>, ApiError> {
    rbac::check(user.role, Resource::Equipment, Action::Update)?;
    let mut equipment = Equipment::get(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Equipment"))?;
    equipment.apply(patch);
    equipment.update(&state.db).await.map_err(ApiError::Internal)?;
    Ok(Json(equipment))
}

#[instrument(skip(state))]
pub async fn delete_equipment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    rbac::check(user.role, Resource::Equipment, Action::Delete)?;
    if !Equipment::delete(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
    {
        return Err(ApiError::NotFound("Equipment"));
    }
    Ok(Json(json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_to_operational_full_health() {
        let new: CreateEquipment = serde_json::from_str(
            r#"{
                "name": "CNC Machine 01",
                "serial_number": "MT/125/222",
                "purchase_date": "2022-05-10",
                "warranty": "2025-05-10",
                "location": "Shop Floor A",
                "department": "Production",
                "employee": "Tejas Modi"
            }"#,
        )
        .unwrap();
        assert_eq!(new.status, STATUS_OPERATIONAL);
        assert_eq!(new.health, 100);
    }
}

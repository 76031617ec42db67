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
pub struct EquipmentCategory {
    pub id: Uuid,
    pub name: String,
    pub responsible_user_id: Option<Uuid>,
    pub company: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEquipmentCategory {
    pub name: String,
    pub responsible_user_id: Option<Uuid>,
    pub company: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EquipmentCategoryPatch {
    pub name: Option<String>,
    pub responsible_user_id: Option<Uuid>,
    pub company: Option<String>,
}

impl EquipmentCategory {
    pub fn apply(&mut self, patch: EquipmentCategoryPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(user_id) = patch.responsible_user_id {
            self.responsible_user_id = Some(user_id);
        }
        if let Some(company) = patch.company {
            self.company = Some(company);
        }
    }

    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<EquipmentCategory>> {
        let rows = sqlx::query_as::<_, EquipmentCategory>(
            r#"
            SELECT id, name, responsible_user_id, company
            FROM equipment_categories
            ORDER BY name
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<EquipmentCategory>> {
        let row = sqlx::query_as::<_, EquipmentCategory>(
            r#"
            SELECT id, name, responsible_user_id, company
            FROM equipment_categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn insert(db: &PgPool, new: CreateEquipmentCategory) -> anyhow::Result<Self> {
        let row = sqlx::query_as::<_, EquipmentCategory>(
            r#"
            INSERT INTO equipment_categories (name, responsible_user_id, company)
            VALUES ($1, $2, $3)
            RETURNING id, name, responsible_user_id, company
            "#,
        )
        .bind(new.name)
        .bind(new.responsible_user_id)
        .bind(new.company)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, db: &PgPool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE equipment_categories
            SET name = $1, responsible_user_id = $2, company = $3
            WHERE id = $4
            "#,
        )
        .bind(&self.name)
        .bind(self.responsible_user_id)
        .bind(&self.company)
        .bind(self.id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM equipment_categories WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/equipment-categories",
            get(list_categories).post(create_category),
        )
        .route(
            "/equipment-categories/:id",
            put(update_category).delete(delete_category),
        )
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<EquipmentCategory>>, ApiError> {
    let categories = EquipmentCategory::list(&state.db)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(categories))
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateEquipmentCategory>,
) -> Result<Json<EquipmentCategory>, ApiError> {
    rbac::check(user.role, Resource::EquipmentCategory, Action::Create)?;
    let category = EquipmentCategory::insert(&state.db, payload)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(category))
}

#[instrument(skip(state, patch))]
pub async fn update_category(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<EquipmentCategoryPatch>,
) -> Result<Json<EquipmentCategory>, ApiError> {
    rbac::check(user.role, Resource::EquipmentCategory, Action::Update)?;
    let mut category = EquipmentCategory::get(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Category"))?;
    category.apply(patch);
    category.update(&state.db).await.map_err(ApiError::Internal)?;
    Ok(Json(category))
}

#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    rbac::check(user.role, Resource::EquipmentCategory, Action::Delete)?;
    if !EquipmentCategory::delete(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
    {
        return Err(ApiError::NotFound("Category"));
    }
    Ok(Json(json!({ "ok": true })))
}

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::{DeleteResponse, HabitWithProgress};
use crate::error::{AppError, AppResult};
use crate::models::habit::{CreateHabitRequest, Habit, UpdateHabitRequest};
use crate::services::progress::{calculate_progress, Progress};
use crate::AppState;

pub async fn list_habits(State(state): State<AppState>) -> AppResult<Json<Vec<HabitWithProgress>>> {
    // One anchor for the whole batch
    let now = Utc::now();

    let habits = sqlx::query_as::<_, Habit>("SELECT * FROM habits ORDER BY created_at ASC")
        .fetch_all(&state.db)
        .await?;

    let habit_ids: Vec<Uuid> = habits.iter().map(|habit| habit.id).collect();
    let rows = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
        "SELECT habit_id, completed_date FROM habit_completions WHERE habit_id = ANY($1)",
    )
    .bind(&habit_ids)
    .fetch_all(&state.db)
    .await?;

    let mut completions: HashMap<Uuid, Vec<DateTime<Utc>>> = HashMap::new();
    for (habit_id, completed_date) in rows {
        completions.entry(habit_id).or_default().push(completed_date);
    }

    let result = habits
        .into_iter()
        .map(|habit| {
            let dates = completions.remove(&habit.id).unwrap_or_default();
            HabitWithProgress::new(habit, &dates, now)
        })
        .collect();

    Ok(Json(result))
}

pub async fn get_habit(
    State(state): State<AppState>,
    Path(habit_id): Path<Uuid>,
) -> AppResult<Json<HabitWithProgress>> {
    let habit = fetch_habit(&state.db, habit_id).await?;
    let dates = fetch_completion_dates(&state.db, habit_id).await?;

    Ok(Json(HabitWithProgress::new(habit, &dates, Utc::now())))
}

pub async fn get_progress(
    State(state): State<AppState>,
    Path(habit_id): Path<Uuid>,
) -> AppResult<Json<Progress>> {
    let habit = fetch_habit(&state.db, habit_id).await?;
    let dates = fetch_completion_dates(&state.db, habit_id).await?;

    Ok(Json(calculate_progress(
        habit.frequency,
        habit.created_at,
        &dates,
        Utc::now(),
    )))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(body): Json<CreateHabitRequest>,
) -> AppResult<(StatusCode, Json<Habit>)> {
    body.validate()?;
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Habit name is required".into()));
    }

    let habit = sqlx::query_as::<_, Habit>(
        r#"
        INSERT INTO habits (id, name, description, frequency)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(&body.description)
    .bind(body.frequency.as_str())
    .fetch_one(&state.db)
    .await?;

    tracing::info!(habit_id = %habit.id, frequency = %habit.frequency, "Habit created");

    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(habit_id): Path<Uuid>,
    Json(body): Json<UpdateHabitRequest>,
) -> AppResult<Json<Habit>> {
    body.validate()?;
    let name = body.name.as_deref().map(str::trim);
    if name == Some("") {
        return Err(AppError::Validation("Habit name is required".into()));
    }

    let habit = sqlx::query_as::<_, Habit>(
        r#"
        UPDATE habits SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            frequency = COALESCE($4, frequency),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(habit_id)
    .bind(name)
    .bind(&body.description)
    .bind(body.frequency.map(|frequency| frequency.as_str()))
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Habit not found".into()))?;

    Ok(Json(habit))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(habit_id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    // Completions go with it (ON DELETE CASCADE)
    let result = sqlx::query("DELETE FROM habits WHERE id = $1")
        .bind(habit_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Habit not found".into()));
    }

    tracing::info!(%habit_id, "Habit deleted");

    Ok(Json(DeleteResponse {
        deleted: true,
        id: habit_id,
    }))
}

pub(crate) async fn fetch_habit(db: &PgPool, habit_id: Uuid) -> AppResult<Habit> {
    sqlx::query_as::<_, Habit>("SELECT * FROM habits WHERE id = $1")
        .bind(habit_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound("Habit not found".into()))
}

async fn fetch_completion_dates(db: &PgPool, habit_id: Uuid) -> AppResult<Vec<DateTime<Utc>>> {
    let dates = sqlx::query_scalar::<_, DateTime<Utc>>(
        "SELECT completed_date FROM habit_completions WHERE habit_id = $1",
    )
    .bind(habit_id)
    .fetch_all(db)
    .await?;

    Ok(dates)
}

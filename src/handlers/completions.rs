use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::dto::DeleteResponse;
use crate::error::{AppError, AppResult};
use crate::handlers::habits::fetch_habit;
use crate::models::completion::{Completion, CompletionQuery, CreateCompletionRequest};
use crate::models::habit::Frequency;
use crate::AppState;

pub async fn create_completion(
    State(state): State<AppState>,
    Path(habit_id): Path<Uuid>,
    Json(body): Json<CreateCompletionRequest>,
) -> AppResult<(StatusCode, Json<Completion>)> {
    body.validate()?;
    let habit = fetch_habit(&state.db, habit_id).await?;

    let completed_date = body.completed_date.unwrap_or_else(Utc::now);
    let day = completed_date.date_naive();

    if let Frequency::SpecificWeekday(target) = habit.frequency {
        if day.weekday() != target {
            // Accepted, but it will not count toward the streak
            tracing::debug!(
                %habit_id,
                %day,
                frequency = %habit.frequency,
                "Completion recorded off the habit's weekday"
            );
        }
    }

    // One completion per habit per day
    let already_completed = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM habit_completions
            WHERE habit_id = $1 AND (completed_date AT TIME ZONE 'UTC')::date = $2
        )
        "#,
    )
    .bind(habit_id)
    .bind(day)
    .fetch_one(&state.db)
    .await?;

    if already_completed {
        return Err(duplicate_completion(day));
    }

    let completion = sqlx::query_as::<_, Completion>(
        r#"
        INSERT INTO habit_completions (id, habit_id, completed_date, note)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(habit_id)
    .bind(completed_date)
    .bind(&body.note)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        // Lost a race against a concurrent insert for the same day
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return duplicate_completion(day);
            }
        }
        AppError::Database(e)
    })?;

    tracing::info!(%habit_id, completion_id = %completion.id, %day, "Completion recorded");

    Ok((StatusCode::CREATED, Json(completion)))
}

pub async fn list_completions(
    State(state): State<AppState>,
    Path(habit_id): Path<Uuid>,
    Query(query): Query<CompletionQuery>,
) -> AppResult<Json<Vec<Completion>>> {
    query.validate_range().map_err(AppError::Validation)?;
    fetch_habit(&state.db, habit_id).await?;

    let completions = sqlx::query_as::<_, Completion>(
        r#"
        SELECT * FROM habit_completions
        WHERE habit_id = $1
          AND ($2::date IS NULL OR (completed_date AT TIME ZONE 'UTC')::date >= $2)
          AND ($3::date IS NULL OR (completed_date AT TIME ZONE 'UTC')::date <= $3)
        ORDER BY completed_date DESC
        "#,
    )
    .bind(habit_id)
    .bind(query.start)
    .bind(query.end)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(completions))
}

pub async fn delete_completion(
    State(state): State<AppState>,
    Path(completion_id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    let habit_id = sqlx::query_scalar::<_, Uuid>(
        "DELETE FROM habit_completions WHERE id = $1 RETURNING habit_id",
    )
    .bind(completion_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Completion not found".into()))?;

    tracing::info!(%habit_id, %completion_id, "Completion deleted");

    Ok(Json(DeleteResponse {
        deleted: true,
        id: completion_id,
    }))
}

fn duplicate_completion(day: chrono::NaiveDate) -> AppError {
    AppError::Conflict(format!("Habit already completed on {day}"))
}

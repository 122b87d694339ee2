//! Response shapes shared by the handlers.
//!
//! Request bodies live next to their models (`models::habit`,
//! `models::completion`); this module holds what goes back to the dashboard.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::habit::Habit;
use crate::services::progress::{calculate_progress, Progress};

// ============================================================================
// Common
// ============================================================================

/// Standard delete confirmation
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: Uuid,
}

// ============================================================================
// Habits
// ============================================================================

/// GET /api/habits and GET /api/habits/{id}: stored fields merged with
/// derived progress
#[derive(Debug, Serialize)]
pub struct HabitWithProgress {
    #[serde(flatten)]
    pub habit: Habit,
    #[serde(flatten)]
    pub progress: Progress,
}

impl HabitWithProgress {
    pub fn new(habit: Habit, completions: &[DateTime<Utc>], now: DateTime<Utc>) -> Self {
        let progress = calculate_progress(habit.frequency, habit.created_at, completions, now);
        Self { habit, progress }
    }
}

// ============================================================================
// System
// ============================================================================

/// GET /health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// GET /readyz
#[derive(Debug, Serialize)]
pub struct ReadyzResponse {
    pub status: &'static str,
    pub checks: ReadyzChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadyzChecks {
    pub database: &'static str,
}

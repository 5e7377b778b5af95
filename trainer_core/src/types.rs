//! Core domain types for the AI Trainer system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises parsed from a workout plan
//! - Live per-exercise session tracking records
//! - Plan-level statistics
//! - The session summary emitted when a session finishes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default number of sets when a plan does not state one
pub const DEFAULT_SETS: u32 = 3;

/// Default rep prescription when a plan does not state one
pub const DEFAULT_REPS: &str = "8-12";

/// Default rest between sets, in seconds
pub const DEFAULT_REST_SECONDS: u32 = 60;

// ============================================================================
// Exercise Types
// ============================================================================

/// A single named movement with prescribed sets/reps/rest, parsed once
/// from a workout plan. Immutable after parsing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    /// Exercise title, from a level-3 heading
    pub name: String,
    /// Nearest preceding level-2 heading (e.g. "Warm-up"); "Workout" if none
    pub section: String,
    /// Number of sets; always > 0 for a materialized exercise
    pub sets: u32,
    /// Free-form rep prescription (e.g. "8-12", "30 seconds")
    pub reps: String,
    /// Rest between sets, in seconds
    pub rest_seconds: u32,
    /// Reference video URL, from an inline markdown link
    pub video_link: Option<String>,
}

impl Exercise {
    /// Create an exercise with the documented defaults for everything
    /// but name and section.
    pub fn with_defaults(name: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            section: section.into(),
            sets: DEFAULT_SETS,
            reps: DEFAULT_REPS.into(),
            rest_seconds: DEFAULT_REST_SECONDS,
            video_link: None,
        }
    }
}

/// A live, mutable tracking record for one exercise during an active
/// session. `completed_sets.len()` equals `exercise.sets` for the whole
/// life of the record; entries flip, the length never changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionExercise {
    pub exercise: Exercise,
    pub completed_sets: Vec<bool>,
}

impl SessionExercise {
    /// Build a fresh tracking record with every set unchecked
    pub fn new(exercise: Exercise) -> Self {
        let sets = exercise.sets as usize;
        Self {
            exercise,
            completed_sets: vec![false; sets],
        }
    }

    /// Number of checked sets
    pub fn completed_count(&self) -> usize {
        self.completed_sets.iter().filter(|c| **c).count()
    }

    /// True when every set is checked
    pub fn is_complete(&self) -> bool {
        self.completed_sets.iter().all(|c| *c)
    }
}

// ============================================================================
// Plan Statistics
// ============================================================================

/// Aggregate statistics for a parsed plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutStats {
    pub total_exercises: usize,
    pub total_sets: u32,
    /// Rough duration estimate: 30s per set plus rest between sets
    pub estimated_minutes: u32,
}

// ============================================================================
// Session Summary
// ============================================================================

/// Snapshot of a finished (or abandoned) session, suitable for display
/// or JSON output.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_exercises: usize,
    pub total_sets: u32,
    pub completed_sets: u32,
    pub workout_complete: bool,
}

//! Workout plan parser.
//!
//! Plans arrive as semi-structured markdown produced by an upstream text
//! generator. Expected dialect:
//!
//! ```text
//! # Workout Title
//! ## Section (e.g., Warm-up, Main Workout)
//! ### Exercise Name
//! - Sets: 3
//! - Reps: 8-10
//! - Rest: 60 seconds
//! - [Video guide](https://example.com/watch)
//! ```
//!
//! Parsing never fails: malformed or missing structure degrades to a
//! shorter (possibly empty) exercise list.

use crate::config::PlanDefaults;
use crate::types::{Exercise, WorkoutStats};
use once_cell::sync::Lazy;
use regex::Regex;

static SETS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)sets?[:\s]+(\d+)").expect("sets pattern"));

// Capture stops at a dash so trailing annotations like "- per side" are
// dropped along with anything after them.
static REPS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)reps?[:\s]+([^\n-]+)").expect("reps pattern"));

static REST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)rest[:\s]+(\d+)\s*(s|sec|second|seconds|min|minute|minutes)?")
        .expect("rest pattern")
});

static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link pattern"));

/// Parse a markdown workout plan into an ordered exercise list using the
/// built-in defaults.
pub fn parse_workout(markdown: &str) -> Vec<Exercise> {
    parse_workout_with(markdown, &PlanDefaults::default())
}

/// Parse a markdown workout plan with configurable fallback values for
/// sets, reps and rest.
///
/// Single forward scan threading two accumulators: the current section
/// heading and the currently open exercise. An open exercise is committed
/// when the next level-3 heading or end of input is reached, but only if
/// its set count is nonzero — `Sets: 0` acts as a validity filter.
pub fn parse_workout_with(markdown: &str, defaults: &PlanDefaults) -> Vec<Exercise> {
    let mut exercises: Vec<Exercise> = Vec::new();
    let mut current: Option<Exercise> = None;
    let mut section: Option<String> = None;

    for raw in markdown.lines() {
        let line = raw.trim();

        if line.is_empty() {
            continue;
        }

        // Section header
        if let Some(title) = line.strip_prefix("## ") {
            section = Some(title.trim().to_string());
            continue;
        }

        // Exercise header
        if let Some(name) = line.strip_prefix("### ") {
            if let Some(ex) = current.take() {
                if ex.sets > 0 {
                    exercises.push(ex);
                }
            }

            current = Some(Exercise {
                name: name.trim().to_string(),
                section: section.clone().unwrap_or_else(|| "Workout".into()),
                sets: defaults.sets,
                reps: defaults.reps.clone(),
                rest_seconds: defaults.rest_seconds,
                video_link: None,
            });
            continue;
        }

        if let Some(ex) = current.as_mut() {
            // Attribute bullets. The three patterns are scanned
            // independently, not as mutually exclusive branches.
            if let Some(detail) = line.strip_prefix("- ") {
                let detail = detail.trim();

                if let Some(caps) = SETS_RE.captures(detail) {
                    if let Ok(sets) = caps[1].parse::<u32>() {
                        ex.sets = sets;
                    }
                }

                if let Some(caps) = REPS_RE.captures(detail) {
                    ex.reps = caps[1].trim().to_string();
                }

                if let Some(caps) = REST_RE.captures(detail) {
                    if let Ok(mut rest) = caps[1].parse::<u32>() {
                        // Ordered alternation captures "min" even for
                        // "minutes", so a prefix check is enough.
                        if caps
                            .get(2)
                            .map(|m| m.as_str().to_lowercase().starts_with("min"))
                            .unwrap_or(false)
                        {
                            rest = rest.saturating_mul(60);
                        }
                        ex.rest_seconds = rest;
                    }
                }
            }

            // Video link may appear on any line while an exercise is open;
            // the last match wins.
            if let Some(caps) = LINK_RE.captures(line) {
                ex.video_link = Some(caps[2].to_string());
            }
        }
    }

    // Commit the trailing exercise
    if let Some(ex) = current {
        if ex.sets > 0 {
            exercises.push(ex);
        }
    }

    tracing::debug!("parsed {} exercises from plan", exercises.len());
    exercises
}

/// Aggregate plan statistics: set counts and a rough time estimate
/// (30 seconds of work per set, plus the configured rest between sets).
pub fn workout_stats(exercises: &[Exercise]) -> WorkoutStats {
    let total_sets: u32 = exercises.iter().map(|ex| ex.sets).sum();

    let total_seconds: u32 = exercises
        .iter()
        .map(|ex| {
            let work = ex.sets.saturating_mul(30);
            let rest = ex.sets.saturating_sub(1).saturating_mul(ex.rest_seconds);
            work + rest
        })
        .sum();

    WorkoutStats {
        total_exercises: exercises.len(),
        total_sets,
        estimated_minutes: total_seconds.div_ceil(60),
    }
}

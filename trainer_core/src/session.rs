//! Workout session engine.
//!
//! Drives one live session over a parsed exercise list: per-set completion
//! tracking, automatic rest countdowns, cursor advancement and completion
//! detection. All operations are discrete events (a toggled checkbox, a
//! one-second tick, a skip command) that run to completion; the engine
//! holds no clock and spawns nothing.

use crate::timer::RestTimer;
use crate::types::{Exercise, SessionExercise, SessionSummary};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Current focus of a session.
///
/// The tagged layout keeps illegal combinations (e.g. resting while
/// complete) unrepresentable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Not started
    Idle,
    /// In progress; the cursor identifies the set eligible for an
    /// auto-started rest countdown
    Active {
        exercise: usize,
        set: usize,
        resting: bool,
    },
    /// Every path out of the last set lands here
    Complete,
}

/// Stateful controller for one workout session.
///
/// Each engine owns its exercise list exclusively; there is no shared
/// mutable state between sessions.
pub struct SessionEngine {
    id: Uuid,
    exercises: Vec<SessionExercise>,
    phase: SessionPhase,
    timer: Option<RestTimer>,
    /// Rest countdown finished; waiting for the user to acknowledge
    /// before the cursor advances
    rest_alert: bool,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl SessionEngine {
    /// Create an idle engine with no exercises loaded
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            exercises: Vec::new(),
            phase: SessionPhase::Idle,
            timer: None,
            rest_alert: false,
            started_at: None,
            completed_at: None,
        }
    }

    /// Begin a session over the given exercises.
    ///
    /// Refuses an empty list with [`Error::EmptyPlan`] — callers branch on
    /// that outcome instead of entering an active session with nothing to
    /// do. Restarting an already-started engine is an error.
    pub fn start(&mut self, exercises: Vec<Exercise>) -> Result<()> {
        if self.phase != SessionPhase::Idle {
            return Err(Error::Session("session already started".into()));
        }
        if exercises.is_empty() {
            return Err(Error::EmptyPlan);
        }

        tracing::info!(session = %self.id, exercises = exercises.len(), "starting session");

        self.exercises = exercises.into_iter().map(SessionExercise::new).collect();
        self.phase = SessionPhase::Active {
            exercise: 0,
            set: 0,
            resting: false,
        };
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Flip the completion flag of one set.
    ///
    /// Checking a set that is not the exercise's last moves the cursor to
    /// it and starts that exercise's rest countdown; checking the last set
    /// starts no timer. Either way, checking the final remaining set of
    /// the whole session transitions straight to Complete. Unchecking
    /// never starts a timer and never reverses a declared completion.
    pub fn toggle_set(&mut self, exercise: usize, set: usize) -> Result<()> {
        if self.phase == SessionPhase::Idle {
            return Err(Error::Session("session not started".into()));
        }
        let ex = self
            .exercises
            .get_mut(exercise)
            .ok_or_else(|| Error::Session(format!("no exercise at index {exercise}")))?;
        let slot = ex
            .completed_sets
            .get_mut(set)
            .ok_or_else(|| Error::Session(format!("no set at index {set}")))?;

        let was_unchecked = !*slot;
        *slot = !*slot;

        if !was_unchecked || self.phase == SessionPhase::Complete {
            return Ok(());
        }

        // Auto-start rest unless this was the exercise's last set
        let ex = &self.exercises[exercise];
        if set + 1 < ex.exercise.sets as usize {
            let rest = ex.exercise.rest_seconds;
            tracing::debug!(exercise, set, rest, "set checked, starting rest");

            self.phase = SessionPhase::Active {
                exercise,
                set,
                resting: true,
            };
            self.rest_alert = false;
            match self.timer.as_mut() {
                Some(timer) => timer.restart(rest),
                None => self.timer = Some(RestTimer::new(rest)),
            }
            // A zero-second rest is already over
            if self.timer.as_ref().is_some_and(|t| t.is_elapsed()) {
                self.timer_elapsed();
            }
        } else {
            tracing::debug!(exercise, set, "last set checked, no rest");
        }

        // Completion detection runs only on the checking transition
        if self.exercises.iter().all(SessionExercise::is_complete) {
            self.complete();
        }

        Ok(())
    }

    /// Advance the rest countdown by one second. Call once per elapsed
    /// second while a rest is running.
    pub fn tick(&mut self) {
        if let Some(timer) = self.timer.as_mut() {
            if timer.tick() {
                self.timer_elapsed();
            }
        }
    }

    /// The rest countdown reached zero: stop resting and raise the
    /// rest-complete alert. The cursor only advances once the alert is
    /// acknowledged, so a UI can show a blocking prompt in between.
    pub fn timer_elapsed(&mut self) {
        if let SessionPhase::Active { resting, .. } = &mut self.phase {
            if *resting {
                *resting = false;
                self.rest_alert = true;
                self.timer = None;
                tracing::debug!("rest finished, awaiting acknowledgment");
            }
        }
    }

    /// Dismiss the rest-complete alert and advance the cursor
    pub fn acknowledge_rest(&mut self) {
        if self.rest_alert {
            self.rest_alert = false;
            self.advance_cursor();
        }
    }

    /// Abort the current rest (mid-countdown or at the alert) and advance
    /// immediately, bypassing the acknowledgment prompt
    pub fn skip_rest(&mut self) {
        if matches!(self.phase, SessionPhase::Active { resting: true, .. }) {
            if let Some(timer) = self.timer.as_mut() {
                timer.skip();
            }
            self.timer = None;
            if let SessionPhase::Active { resting, .. } = &mut self.phase {
                *resting = false;
            }
            self.advance_cursor();
        } else if self.rest_alert {
            self.rest_alert = false;
            self.advance_cursor();
        }
    }

    /// Pause the running rest countdown, if any
    pub fn pause_timer(&mut self) {
        if let Some(timer) = self.timer.as_mut() {
            timer.pause();
        }
    }

    /// Resume a paused rest countdown, if any
    pub fn resume_timer(&mut self) {
        if let Some(timer) = self.timer.as_mut() {
            timer.resume();
        }
    }

    fn advance_cursor(&mut self) {
        let SessionPhase::Active { exercise, set, .. } = self.phase else {
            return;
        };

        let sets = self.exercises[exercise].exercise.sets as usize;
        if set + 1 < sets {
            self.phase = SessionPhase::Active {
                exercise,
                set: set + 1,
                resting: false,
            };
        } else if exercise + 1 < self.exercises.len() {
            self.phase = SessionPhase::Active {
                exercise: exercise + 1,
                set: 0,
                resting: false,
            };
        } else {
            self.complete();
        }
    }

    fn complete(&mut self) {
        tracing::info!(session = %self.id, "workout complete");
        self.phase = SessionPhase::Complete;
        self.timer = None;
        self.rest_alert = false;
        self.completed_at = Some(Utc::now());
    }

    // ========================================================================
    // Derived views
    // ========================================================================

    /// Completed fraction of all sets, in `0.0..=1.0`
    pub fn overall_progress(&self) -> f64 {
        let total = self.total_sets();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.completed_sets_count()) / f64::from(total)
    }

    /// Display order: exercises with any incomplete set first, fully
    /// completed ones after, original order preserved within each group.
    /// Returns original indices.
    pub fn display_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.exercises.len()).collect();
        // Stable sort on the all-complete key only
        order.sort_by_key(|&idx| self.exercises[idx].is_complete());
        order
    }

    /// Whether this set is the visually "active" one: at the cursor, not
    /// resting, not yet checked
    pub fn is_active_set(&self, exercise: usize, set: usize) -> bool {
        let SessionPhase::Active {
            exercise: cur_ex,
            set: cur_set,
            resting,
        } = self.phase
        else {
            return false;
        };

        cur_ex == exercise
            && cur_set == set
            && !resting
            && !self.is_set_checked(exercise, set)
    }

    /// Whether this set displays as completed. A checked set at the cursor
    /// keeps its pre-rest highlight while its own rest countdown is still
    /// in flight; everywhere else checked means completed.
    pub fn shows_completed(&self, exercise: usize, set: usize) -> bool {
        if !self.is_set_checked(exercise, set) {
            return false;
        }
        match self.phase {
            SessionPhase::Active {
                exercise: cur_ex,
                set: cur_set,
                resting,
            } => exercise != cur_ex || set < cur_set || !resting,
            _ => true,
        }
    }

    fn is_set_checked(&self, exercise: usize, set: usize) -> bool {
        self.exercises
            .get(exercise)
            .and_then(|ex| ex.completed_sets.get(set))
            .copied()
            .unwrap_or(false)
    }

    // ========================================================================
    // Observable state
    // ========================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn exercises(&self) -> &[SessionExercise] {
        &self.exercises
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// Cursor position while active
    pub fn cursor(&self) -> Option<(usize, usize)> {
        match self.phase {
            SessionPhase::Active { exercise, set, .. } => Some((exercise, set)),
            _ => None,
        }
    }

    pub fn is_resting(&self) -> bool {
        matches!(self.phase, SessionPhase::Active { resting: true, .. })
    }

    /// Rest finished but not yet acknowledged
    pub fn rest_alert(&self) -> bool {
        self.rest_alert
    }

    pub fn workout_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    /// The running rest countdown, if any
    pub fn timer(&self) -> Option<&RestTimer> {
        self.timer.as_ref()
    }

    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|ex| ex.exercise.sets).sum()
    }

    pub fn completed_sets_count(&self) -> u32 {
        self.exercises
            .iter()
            .map(|ex| ex.completed_count() as u32)
            .sum()
    }

    /// Snapshot for display or JSON output. Errors on a never-started
    /// session.
    pub fn summary(&self) -> Result<SessionSummary> {
        let started_at = self
            .started_at
            .ok_or_else(|| Error::Session("session not started".into()))?;

        Ok(SessionSummary {
            id: self.id,
            started_at,
            completed_at: self.completed_at,
            total_exercises: self.exercises.len(),
            total_sets: self.total_sets(),
            completed_sets: self.completed_sets_count(),
            workout_complete: self.workout_complete(),
        })
    }
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Exercise;

    fn exercise(name: &str, sets: u32, rest: u32) -> Exercise {
        Exercise {
            sets,
            rest_seconds: rest,
            ..Exercise::with_defaults(name, "Workout")
        }
    }

    fn started(exercises: Vec<Exercise>) -> SessionEngine {
        let mut engine = SessionEngine::new();
        engine.start(exercises).unwrap();
        engine
    }

    #[test]
    fn test_start_refuses_empty_plan() {
        let mut engine = SessionEngine::new();
        let err = engine.start(vec![]).unwrap_err();
        assert!(matches!(err, Error::EmptyPlan));
        assert_eq!(*engine.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_start_initializes_cursor_and_sets() {
        let engine = started(vec![exercise("Squat", 3, 60)]);

        assert_eq!(engine.cursor(), Some((0, 0)));
        assert!(!engine.is_resting());
        assert!(!engine.workout_complete());
        assert_eq!(engine.exercises()[0].completed_sets, vec![false; 3]);
    }

    #[test]
    fn test_checking_non_last_set_starts_rest() {
        let mut engine = started(vec![exercise("Squat", 4, 90)]);

        engine.toggle_set(0, 0).unwrap();

        assert!(engine.is_resting());
        assert_eq!(engine.cursor(), Some((0, 0)));
        assert_eq!(engine.timer().unwrap().remaining(), 90);
    }

    #[test]
    fn test_checking_last_set_starts_no_rest() {
        let mut engine = started(vec![
            exercise("Squat", 4, 90),
            exercise("Lunge", 2, 60),
        ]);

        engine.toggle_set(0, 3).unwrap();

        assert!(!engine.is_resting());
        assert!(engine.timer().is_none());
    }

    #[test]
    fn test_unchecking_never_starts_rest() {
        let mut engine = started(vec![exercise("Squat", 3, 60)]);

        engine.toggle_set(0, 0).unwrap();
        engine.skip_rest();
        engine.toggle_set(0, 0).unwrap(); // uncheck

        assert!(!engine.is_resting());
        assert!(!engine.exercises()[0].completed_sets[0]);
    }

    #[test]
    fn test_progress_invariant_across_toggles() {
        let mut engine = started(vec![exercise("A", 2, 0), exercise("B", 3, 0)]);

        let toggles = [(0, 0), (1, 1), (0, 0), (1, 0), (0, 1), (0, 0)];
        for (ex, set) in toggles {
            engine.toggle_set(ex, set).unwrap();

            let checked: u32 = engine
                .exercises()
                .iter()
                .map(|e| e.completed_count() as u32)
                .sum();
            let expected = f64::from(checked) / f64::from(engine.total_sets());
            assert_eq!(engine.overall_progress(), expected);
        }
    }

    #[test]
    fn test_tick_to_zero_raises_alert_then_acknowledge_advances() {
        let mut engine = started(vec![exercise("Squat", 3, 2)]);

        engine.toggle_set(0, 0).unwrap();
        assert!(engine.is_resting());

        engine.tick();
        assert!(engine.is_resting());

        engine.tick(); // reaches zero
        assert!(!engine.is_resting());
        assert!(engine.rest_alert());
        assert_eq!(engine.cursor(), Some((0, 0))); // not advanced yet

        engine.acknowledge_rest();
        assert!(!engine.rest_alert());
        assert_eq!(engine.cursor(), Some((0, 1)));
    }

    #[test]
    fn test_skip_rest_bypasses_acknowledgment() {
        let mut engine = started(vec![exercise("Squat", 3, 60)]);

        engine.toggle_set(0, 0).unwrap();
        engine.skip_rest();

        assert!(!engine.is_resting());
        assert!(!engine.rest_alert());
        assert_eq!(engine.cursor(), Some((0, 1)));
    }

    #[test]
    fn test_advance_moves_to_next_exercise() {
        let mut engine = started(vec![exercise("A", 2, 10), exercise("B", 2, 10)]);

        // Check A's first set, rest, acknowledge: cursor -> (0, 1)
        engine.toggle_set(0, 0).unwrap();
        engine.timer_elapsed();
        engine.acknowledge_rest();
        assert_eq!(engine.cursor(), Some((0, 1)));

        // Check B's first set, skip: cursor was moved to (1, 0) by the
        // toggle, so the skip lands on (1, 1)
        engine.toggle_set(1, 0).unwrap();
        assert_eq!(engine.cursor(), Some((1, 0)));
        engine.skip_rest();
        assert_eq!(engine.cursor(), Some((1, 1)));
    }

    #[test]
    fn test_acknowledge_past_final_set_completes() {
        let mut engine = started(vec![exercise("A", 1, 0), exercise("B", 1, 0)]);

        // Force the cursor to B's only set, then advance past it
        engine.toggle_set(0, 0).unwrap(); // last set of A, no rest
        assert_eq!(engine.cursor(), Some((0, 0)));

        // Advance manually through the alert path
        if let SessionPhase::Active { .. } = engine.phase() {
            engine.rest_alert = true;
            engine.acknowledge_rest(); // -> (1, 0)
            engine.rest_alert = true;
            engine.acknowledge_rest(); // past the end
        }
        assert!(engine.workout_complete());
    }

    #[test]
    fn test_full_completion_without_acknowledgment() {
        let mut engine = started(vec![exercise("A", 2, 60), exercise("B", 1, 60)]);

        engine.toggle_set(0, 0).unwrap();
        engine.skip_rest();
        engine.toggle_set(0, 1).unwrap();
        engine.toggle_set(1, 0).unwrap();

        assert!(engine.workout_complete());
        assert!(engine.timer().is_none());
        assert_eq!(engine.overall_progress(), 1.0);
    }

    #[test]
    fn test_completion_fires_even_when_final_set_is_not_last_of_exercise() {
        // Out-of-order completion: the final unchecked set is a non-last
        // set, which would normally start a rest. Completion wins and the
        // timer is dropped.
        let mut engine = started(vec![exercise("A", 3, 60)]);

        engine.toggle_set(0, 2).unwrap();
        engine.toggle_set(0, 1).unwrap();
        engine.skip_rest();
        engine.toggle_set(0, 0).unwrap();

        assert!(engine.workout_complete());
        assert!(engine.timer().is_none());
        assert!(!engine.is_resting());
    }

    #[test]
    fn test_uncheck_does_not_reverse_completion() {
        let mut engine = started(vec![exercise("A", 1, 0)]);

        engine.toggle_set(0, 0).unwrap();
        assert!(engine.workout_complete());

        engine.toggle_set(0, 0).unwrap(); // uncheck after the fact
        assert!(engine.workout_complete());
        assert!(!engine.exercises()[0].completed_sets[0]);
    }

    #[test]
    fn test_display_order_partitions_stably() {
        let mut engine = started(vec![
            exercise("A", 1, 0),
            exercise("B", 2, 0),
            exercise("C", 1, 0),
        ]);

        // Complete A and C, leave B untouched
        engine.toggle_set(0, 0).unwrap();
        engine.toggle_set(2, 0).unwrap();

        assert_eq!(engine.display_order(), vec![1, 0, 2]);
    }

    #[test]
    fn test_active_set_highlight() {
        let mut engine = started(vec![exercise("A", 3, 60)]);

        assert!(engine.is_active_set(0, 0));
        assert!(!engine.is_active_set(0, 1));

        engine.toggle_set(0, 0).unwrap();
        // Resting: nothing is active
        assert!(!engine.is_active_set(0, 0));
        assert!(!engine.is_active_set(0, 1));

        engine.skip_rest();
        assert!(engine.is_active_set(0, 1));
    }

    #[test]
    fn test_completed_highlight_suppressed_during_own_rest() {
        let mut engine = started(vec![exercise("A", 3, 60), exercise("B", 2, 60)]);

        // Check a set in B first so it reads as completed regardless
        engine.toggle_set(1, 1).unwrap(); // last set of B, no rest
        assert!(engine.shows_completed(1, 1));

        // Check A's first set: resting suppresses its completed color
        engine.toggle_set(0, 0).unwrap();
        assert!(engine.is_resting());
        assert!(engine.exercises()[0].completed_sets[0]);
        assert!(!engine.shows_completed(0, 0));
        // The other exercise's checked set is unaffected
        assert!(engine.shows_completed(1, 1));

        // Once the rest is over the set shows as completed
        engine.timer_elapsed();
        assert!(engine.shows_completed(0, 0));
    }

    #[test]
    fn test_zero_rest_elapses_immediately() {
        let mut engine = started(vec![exercise("A", 2, 0)]);

        engine.toggle_set(0, 0).unwrap();

        assert!(!engine.is_resting());
        assert!(engine.rest_alert());
        engine.acknowledge_rest();
        assert_eq!(engine.cursor(), Some((0, 1)));
    }

    #[test]
    fn test_pause_and_resume_gate_ticks() {
        let mut engine = started(vec![exercise("A", 2, 5)]);

        engine.toggle_set(0, 0).unwrap();
        engine.pause_timer();
        engine.tick();
        assert_eq!(engine.timer().unwrap().remaining(), 5);

        engine.resume_timer();
        engine.tick();
        assert_eq!(engine.timer().unwrap().remaining(), 4);
    }

    #[test]
    fn test_toggle_out_of_bounds_is_an_error() {
        let mut engine = started(vec![exercise("A", 2, 0)]);
        assert!(engine.toggle_set(5, 0).is_err());
        assert!(engine.toggle_set(0, 9).is_err());
    }

    #[test]
    fn test_toggle_before_start_is_an_error() {
        let mut engine = SessionEngine::new();
        assert!(engine.toggle_set(0, 0).is_err());
    }

    #[test]
    fn test_summary_reflects_progress() {
        let mut engine = started(vec![exercise("A", 2, 0), exercise("B", 1, 0)]);
        engine.toggle_set(0, 0).unwrap();

        let summary = engine.summary().unwrap();
        assert_eq!(summary.total_exercises, 2);
        assert_eq!(summary.total_sets, 3);
        assert_eq!(summary.completed_sets, 1);
        assert!(!summary.workout_complete);
        assert!(summary.completed_at.is_none());

        engine.toggle_set(0, 1).unwrap();
        engine.toggle_set(1, 0).unwrap();
        let summary = engine.summary().unwrap();
        assert!(summary.workout_complete);
        assert!(summary.completed_at.is_some());
    }
}

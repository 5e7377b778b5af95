#![forbid(unsafe_code)]

//! Core domain model and session logic for the AI Trainer workout system.
//!
//! This crate provides:
//! - Domain types (exercises, session state, summaries)
//! - Workout plan parsing (markdown dialect -> exercises)
//! - Session engine (set tracking, rest handling, completion)
//! - Rest timer (tick-driven countdown)

pub mod types;
pub mod error;
pub mod parser;
pub mod session;
pub mod timer;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use parser::{parse_workout, parse_workout_with, workout_stats};
pub use session::{SessionEngine, SessionPhase};
pub use timer::RestTimer;
pub use config::Config;

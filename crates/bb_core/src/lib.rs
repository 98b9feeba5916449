//! # bb_core - Block-Coded Football Match Simulation Engine
//!
//! This library simulates 4v4 football matches whose players are driven by
//! block programs authored in a visual editor, one program per team.
//!
//! ## Features
//! - 100% deterministic simulation (same seed + same programs = same match)
//! - Sandboxed per-tick script execution with per-player fault isolation
//! - Authoring-time recursion safety check for the block language
//! - JSON program format and serializable per-tick snapshots
//!
//! The host owns the loop: build a [`Field`], compile three programs into
//! [`CompiledPrograms`], construct a [`MatchEngine`], then call
//! [`MatchEngine::tick`] at frame rate and drain events between ticks.

// Game loop indexes a fixed roster; ranged loops over it read clearer.
#![allow(clippy::needless_range_loop)]

pub mod ball;
pub mod engine;
pub mod error;
pub mod events;
pub mod field;
pub mod geometry;
pub mod player;
pub mod script;
pub mod snapshot;

pub use ball::Ball;
pub use engine::{Locator, MatchEngine, Period};
pub use error::{EngineError, Result};
pub use events::EngineEvent;
pub use field::Field;
pub use geometry::Point;
pub use player::{Player, PlayerId, PlayerState};
pub use script::{
    check_insertion, check_program, BlockProgram, CompiledProgram, CompiledPrograms,
    RecursionViolation,
};
pub use snapshot::TickSnapshot;

//! Per-tick state snapshot for the presentation layer.

use serde::Serialize;

use crate::engine::Period;
use crate::geometry::{Dir, Point};
use crate::player::{PlayerId, PlayerState};

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub coord: Point,
    pub angle: f32,
    pub dir: Dir,
    pub state: PlayerState,
    pub energy: f32,
    pub own_team: bool,
    /// Id of the last executed block, for spectator/debug UI.
    pub last_block_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BallView {
    /// Render position: at the owner's feet while owned.
    pub coord: Point,
    pub angle: f32,
    pub velocity: f32,
    pub owner: Option<PlayerId>,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Serialize)]
pub struct TickSnapshot {
    pub time: f32,
    /// Zero-padded whole-number clock, e.g. "07".
    pub time_display: String,
    pub own_score: u8,
    pub opp_score: u8,
    pub period: Period,
    pub halted: bool,
    pub players: Vec<PlayerView>,
    pub ball: BallView,
}

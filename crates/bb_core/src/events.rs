//! Events surfaced to the host between ticks.

use serde::Serialize;

use crate::engine::Period;
use crate::player::PlayerId;

/// Engine-to-host notifications, drained once per frame by the host.
///
/// Recursion violations are not events: they are reported synchronously
/// from the authoring-time checker before a program ever runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EngineEvent {
    /// Play is halted and a kickoff is pending; the host answers with
    /// `MatchEngine::kick_off`.
    KickOffReady { period: Period },
    /// A goal was scored and attributed.
    GoalScored { own_team: bool, scorer: Option<PlayerId> },
    /// The second period ended; final score attached.
    MatchFinished { own_score: u8, opp_score: u8 },
}

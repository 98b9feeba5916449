//! Authored block-graph model.
//!
//! This is the serialized form a block editor produces: up to four event
//! handlers keyed on ball possession, plus named action definitions. It is
//! data, never host-language source; execution goes through the
//! closure-tree interpreter in `interp`.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A whole authored program for one team.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockProgram {
    #[serde(default)]
    pub events: Vec<EventHandler>,
    #[serde(default)]
    pub actions: Vec<ActionDef>,
}

impl BlockProgram {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(EngineError::from)
    }
}

/// Possession condition gating an event handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTrigger {
    /// I own the ball.
    BallMine,
    /// A teammate owns the ball.
    BallTeammate,
    /// An opponent owns the ball.
    BallOpponent,
    /// Nobody owns the ball.
    BallNone,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventHandler {
    pub trigger: EventTrigger,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

/// A user-named action definition. The scripting language has no loops, so
/// these are the only construct the recursion checker has to police.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDef {
    pub name: String,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

/// A statement block, optionally carrying the editor's block id so the
/// engine can report "last block used" per player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stmt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub kind: StmtKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtKind {
    Move {
        target: TargetExpr,
    },
    Sprint {
        target: TargetExpr,
    },
    Shoot {
        target: TargetExpr,
    },
    // Struct-like so it flattens into the statement map like the others.
    CallForBall {},
    If {
        cond: CondExpr,
        #[serde(default)]
        then: Vec<Stmt>,
        #[serde(default, rename = "else")]
        otherwise: Vec<Stmt>,
    },
    /// Invoke a named action definition.
    CallAction {
        name: String,
    },
}

/// Attack/defense role filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Atk,
    Dfs,
}

/// Left/right side filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Right,
    Left,
}

/// A position-or-player reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetExpr {
    /// The ball's current position.
    Ball,
    /// The executing player.
    Myself,
    /// A goal mouth, relative to the executing player's team.
    Goal { own: bool },
    /// A grid cell in the executing player's own frame of reference.
    Grid { col: u8, row: u8 },
    /// The player's formation target spot.
    DefaultPosition,
    /// Midpoint between two references.
    Middle { a: Box<TargetExpr>, b: Box<TargetExpr> },
    /// Nearest/farthest roster player matching the filters, measured from
    /// `reference`.
    Player {
        own_team: bool,
        #[serde(default)]
        role: Option<Role>,
        #[serde(default)]
        side: Option<Side>,
        near: bool,
        reference: Box<TargetExpr>,
    },
}

/// Boolean-valued query. Evaluation is three-valued: an undecidable
/// condition yields null, and an `if` on null runs neither branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CondExpr {
    /// Am I the teammate closest to `to`?
    Closest { to: TargetExpr },
    /// Is `item` inside the given grid cell (0 = wildcard axis)?
    InGrid { item: TargetExpr, col: u8, row: u8 },
    /// Does `player` match the given role/side filters?
    RoleAndSide {
        player: TargetExpr,
        #[serde(default)]
        role: Option<Role>,
        #[serde(default)]
        side: Option<Side>,
    },
    Compare { left: NumExpr, op: Cmp, right: NumExpr },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cmp {
    Lower,
    Greater,
}

/// Numeric-valued query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumExpr {
    Energy { player: TargetExpr },
    Distance { from: TargetExpr, to: TargetExpr },
    /// Elapsed match-clock time.
    ElapsedTime,
    /// Current score of my team (`own = true`) or the opponents'.
    Score { own: bool },
    Num { value: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_round_trips_through_json() {
        let json = r#"{
            "events": [
                {
                    "trigger": "ball_mine",
                    "body": [
                        {"id": "b1", "shoot": {"target": {"goal": {"own": false}}}}
                    ]
                },
                {
                    "trigger": "ball_teammate",
                    "body": [
                        {"id": "b2", "call_for_ball": {}}
                    ]
                },
                {
                    "trigger": "ball_none",
                    "body": [
                        {
                            "if": {
                                "cond": {"closest": {"to": "ball"}},
                                "then": [{"sprint": {"target": "ball"}}],
                                "else": [{"call_action": {"name": "hold_position"}}]
                            }
                        }
                    ]
                }
            ],
            "actions": [
                {"name": "hold_position", "body": [{"move": {"target": "default_position"}}]}
            ]
        }"#;
        let program = BlockProgram::from_json(json).unwrap();
        assert_eq!(program.events.len(), 3);
        assert_eq!(program.actions.len(), 1);
        assert_eq!(program.events[0].trigger, EventTrigger::BallMine);
        assert_eq!(program.events[0].body[0].id.as_deref(), Some("b1"));

        let back = serde_json::to_string(&program).unwrap();
        let again = BlockProgram::from_json(&back).unwrap();
        assert_eq!(again.actions[0].name, "hold_position");
    }

    #[test]
    fn test_invalid_json_is_a_load_error() {
        assert!(BlockProgram::from_json("{ not json").is_err());
    }
}

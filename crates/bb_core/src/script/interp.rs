//! Closure-tree interpreter for compiled behavior programs.
//!
//! One invocation runs one player's program for one tick, with exactly two
//! bindings: the engine handle (`game`) and the player id. Every world
//! effect goes through the engine's fixed primitive surface; there is no
//! other way for a program to touch match state, and references never
//! outlive the call.
//!
//! Failures are contained: `run` returns a `ScriptError` which the
//! orchestrator logs, aborting only that player's turn for that tick.

use thiserror::Error;

use crate::engine::{Locator, MatchEngine};
use crate::player::PlayerId;

use super::blocks::{CondExpr, EventTrigger, NumExpr, Role, Side, Stmt, StmtKind, TargetExpr};
use super::compile::CompiledProgram;

/// A contained per-player runtime fault. Never crosses the tick boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("call to unknown action '{0}'")]
    UnknownAction(String),
    /// Step budget exhausted. Cannot happen for a program that went
    /// through `compile`, but keeps a hand-built graph from wedging a tick.
    #[error("execution step budget exhausted")]
    BudgetExhausted,
}

/// Evaluation steps allowed per invocation. Generous: authored programs
/// are acyclic and tiny. Also bounds nested call depth, keeping a cyclic
/// hand-built graph from blowing the stack.
const STEP_BUDGET: u32 = 1024;

struct Ctx<'a> {
    game: &'a mut MatchEngine,
    player: PlayerId,
    fuel: u32,
}

impl Ctx<'_> {
    fn spend(&mut self) -> Result<(), ScriptError> {
        self.fuel = self.fuel.checked_sub(1).ok_or(ScriptError::BudgetExhausted)?;
        Ok(())
    }
}

/// Executes `program` for one player. Each matching event handler body
/// runs in authored order.
pub(crate) fn run(
    program: &CompiledProgram,
    game: &mut MatchEngine,
    player: PlayerId,
) -> Result<(), ScriptError> {
    let mut ctx = Ctx { game, player, fuel: STEP_BUDGET };
    for handler in &program.program.events {
        if trigger_matches(handler.trigger, &ctx) {
            exec_body(program, &mut ctx, &handler.body)?;
        }
    }
    Ok(())
}

fn trigger_matches(trigger: EventTrigger, ctx: &Ctx<'_>) -> bool {
    let me = ctx.player;
    match (trigger, ctx.game.ball_owner()) {
        (EventTrigger::BallMine, Some(owner)) => owner == me,
        (EventTrigger::BallTeammate, Some(owner)) => {
            owner != me && ctx.game.player(owner).own_team == ctx.game.player(me).own_team
        }
        (EventTrigger::BallOpponent, Some(owner)) => {
            ctx.game.player(owner).own_team != ctx.game.player(me).own_team
        }
        (EventTrigger::BallNone, None) => true,
        _ => false,
    }
}

fn exec_body(
    program: &CompiledProgram,
    ctx: &mut Ctx<'_>,
    body: &[Stmt],
) -> Result<(), ScriptError> {
    for stmt in body {
        ctx.spend()?;
        if let Some(id) = &stmt.id {
            ctx.game.use_block(ctx.player, id);
        }
        match &stmt.kind {
            StmtKind::Move { target } => {
                let locator = eval_target(program, ctx, target)?;
                ctx.game.move_player(ctx.player, &locator, false);
            }
            StmtKind::Sprint { target } => {
                let locator = eval_target(program, ctx, target)?;
                ctx.game.move_player(ctx.player, &locator, true);
            }
            StmtKind::Shoot { target } => {
                let locator = eval_target(program, ctx, target)?;
                ctx.game.shoot(ctx.player, &locator);
            }
            StmtKind::CallForBall {} => ctx.game.call_for_ball(ctx.player),
            StmtKind::If { cond, then, otherwise } => {
                // Three-valued: a null condition runs neither branch.
                match eval_cond(program, ctx, cond)? {
                    Some(true) => exec_body(program, ctx, then)?,
                    Some(false) => exec_body(program, ctx, otherwise)?,
                    None => {}
                }
            }
            StmtKind::CallAction { name } => {
                let index = *program
                    .actions
                    .get(name)
                    .ok_or_else(|| ScriptError::UnknownAction(name.clone()))?;
                exec_body(program, ctx, &program.program.actions[index].body)?;
            }
        }
    }
    Ok(())
}

fn eval_target(
    program: &CompiledProgram,
    ctx: &mut Ctx<'_>,
    target: &TargetExpr,
) -> Result<Locator, ScriptError> {
    ctx.spend()?;
    let me = ctx.player;
    Ok(match target {
        TargetExpr::Ball => Locator::Point(ctx.game.ball_position()),
        TargetExpr::Myself => Locator::Player(me),
        TargetExpr::Goal { own } => {
            // Resolve a team-relative goal to an absolute mouth.
            if ctx.game.player(me).own_team == *own {
                Locator::OwnGoal
            } else {
                Locator::OppGoal
            }
        }
        TargetExpr::Grid { col, row } => {
            let invert = !ctx.game.player(me).own_team;
            Locator::Point(ctx.game.grid_cell(invert, *col, *row))
        }
        TargetExpr::DefaultPosition => Locator::Point(ctx.game.default_position(me)),
        TargetExpr::Middle { a, b } => {
            let a = eval_target(program, ctx, a)?;
            let b = eval_target(program, ctx, b)?;
            Locator::Point(ctx.game.locate(&a).midpoint(ctx.game.locate(&b)))
        }
        TargetExpr::Player { own_team, role, side, near, reference } => {
            let reference = eval_target(program, ctx, reference)?;
            Locator::Player(ctx.game.get_player(
                me,
                *own_team,
                role.map(|r| r == Role::Atk),
                side.map(|s| s == Side::Right),
                *near,
                &reference,
            ))
        }
    })
}

fn eval_cond(
    program: &CompiledProgram,
    ctx: &mut Ctx<'_>,
    cond: &CondExpr,
) -> Result<Option<bool>, ScriptError> {
    ctx.spend()?;
    Ok(match cond {
        CondExpr::Closest { to } => {
            let reference = eval_target(program, ctx, to)?;
            Some(ctx.game.is_closest(ctx.player, &reference))
        }
        CondExpr::InGrid { item, col, row } => {
            let item = eval_target(program, ctx, item)?;
            let invert = !ctx.game.player(ctx.player).own_team;
            Some(ctx.game.item_in_grid(invert, &item, *col, *row))
        }
        CondExpr::RoleAndSide { player, role, side } => {
            let locator = eval_target(program, ctx, player)?;
            match locator {
                Locator::Player(id) => {
                    let player = ctx.game.player(id);
                    let role_ok = role.map_or(true, |r| (r == Role::Atk) == player.atk_role);
                    let side_ok = side.map_or(true, |s| (s == Side::Right) == player.right_side);
                    Some(role_ok && side_ok)
                }
                _ => None,
            }
        }
        CondExpr::Compare { left, op, right } => {
            match (eval_num(program, ctx, left)?, eval_num(program, ctx, right)?) {
                (Some(left), Some(right)) => Some(match op {
                    super::blocks::Cmp::Lower => left < right,
                    super::blocks::Cmp::Greater => left > right,
                }),
                _ => None,
            }
        }
    })
}

fn eval_num(
    program: &CompiledProgram,
    ctx: &mut Ctx<'_>,
    num: &NumExpr,
) -> Result<Option<f32>, ScriptError> {
    ctx.spend()?;
    Ok(match num {
        NumExpr::Energy { player } => match eval_target(program, ctx, player)? {
            Locator::Player(id) => Some(ctx.game.player(id).energy()),
            // Energy of a plain position is undecidable, not an error.
            _ => None,
        },
        NumExpr::Distance { from, to } => {
            let from = eval_target(program, ctx, from)?;
            let to = eval_target(program, ctx, to)?;
            Some(ctx.game.locate(&from).distance(ctx.game.locate(&to)))
        }
        NumExpr::ElapsedTime => Some(ctx.game.elapsed_time()),
        NumExpr::Score { own } => {
            let my_team = ctx.game.player(ctx.player).own_team;
            Some(f32::from(ctx.game.score(my_team == *own)))
        }
        NumExpr::Num { value } => Some(*value),
    })
}

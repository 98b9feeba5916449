//! Block-graph validation and compilation.
//!
//! Compilation happens once per program load; the result is immutable and
//! reused every tick for every eligible player of its team. There is no
//! process-wide program cache: the host owns a `CompiledPrograms` value
//! and hands it to the engine constructor.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{EngineError, Result};
use crate::field::consts;

use super::blocks::{BlockProgram, CondExpr, NumExpr, Stmt, StmtKind, TargetExpr};
use super::recursion;

/// A validated, ready-to-run behavior program for one team.
#[derive(Debug)]
pub struct CompiledProgram {
    pub(crate) program: BlockProgram,
    pub(crate) actions: HashMap<String, usize>,
}

impl CompiledProgram {
    /// Validates the graph (recursion safety, dangling action calls, grid
    /// index ranges) and freezes it for execution. A compiled program can
    /// therefore never panic the tick loop.
    pub fn compile(program: BlockProgram) -> Result<Arc<Self>> {
        recursion::check_program(&program)
            .map_err(|violation| EngineError::RecursiveAction(violation.action))?;

        let actions: HashMap<String, usize> = program
            .actions
            .iter()
            .enumerate()
            .map(|(index, action)| (action.name.clone(), index))
            .collect();

        let mut bodies: Vec<&[Stmt]> =
            program.events.iter().map(|handler| handler.body.as_slice()).collect();
        bodies.extend(program.actions.iter().map(|action| action.body.as_slice()));
        for body in bodies {
            check_known_actions(body, &actions)?;
            check_grid_indices(body)?;
        }

        Ok(Arc::new(Self { program, actions }))
    }

    /// Parses and compiles a JSON block graph in one step.
    pub fn from_json(json: &str) -> Result<Arc<Self>> {
        Self::compile(BlockProgram::from_json(json)?)
    }
}

fn check_grid_indices(body: &[Stmt]) -> Result<()> {
    for stmt in body {
        match &stmt.kind {
            StmtKind::Move { target } | StmtKind::Sprint { target } | StmtKind::Shoot { target } => {
                check_target(target)?;
            }
            StmtKind::If { cond, then, otherwise } => {
                check_cond(cond)?;
                check_grid_indices(then)?;
                check_grid_indices(otherwise)?;
            }
            StmtKind::CallForBall {} | StmtKind::CallAction { .. } => {}
        }
    }
    Ok(())
}

fn check_target(target: &TargetExpr) -> Result<()> {
    let max_col = consts::COLUMNS_COUNT as u8;
    let max_row = consts::ROWS_COUNT as u8;
    match target {
        TargetExpr::Grid { col, row } => {
            if !(1..=max_col).contains(col) || !(1..=max_row).contains(row) {
                return Err(EngineError::GridIndexOutOfRange { col: *col, row: *row });
            }
        }
        TargetExpr::Middle { a, b } => {
            check_target(a)?;
            check_target(b)?;
        }
        TargetExpr::Player { reference, .. } => check_target(reference)?,
        _ => {}
    }
    Ok(())
}

fn check_cond(cond: &CondExpr) -> Result<()> {
    match cond {
        CondExpr::Closest { to } => check_target(to)?,
        CondExpr::InGrid { item, col, row } => {
            check_target(item)?;
            // 0 is the wildcard axis here.
            if *col > consts::COLUMNS_COUNT as u8 || *row > consts::ROWS_COUNT as u8 {
                return Err(EngineError::GridIndexOutOfRange { col: *col, row: *row });
            }
        }
        CondExpr::RoleAndSide { player, .. } => check_target(player)?,
        CondExpr::Compare { left, right, .. } => {
            check_num(left)?;
            check_num(right)?;
        }
    }
    Ok(())
}

fn check_num(num: &NumExpr) -> Result<()> {
    match num {
        NumExpr::Energy { player } => check_target(player)?,
        NumExpr::Distance { from, to } => {
            check_target(from)?;
            check_target(to)?;
        }
        _ => {}
    }
    Ok(())
}

fn check_known_actions(body: &[Stmt], actions: &HashMap<String, usize>) -> Result<()> {
    for stmt in body {
        match &stmt.kind {
            StmtKind::CallAction { name } => {
                if !actions.contains_key(name) {
                    return Err(EngineError::UnknownAction(name.clone()));
                }
            }
            StmtKind::If { then, otherwise, .. } => {
                check_known_actions(then, actions)?;
                check_known_actions(otherwise, actions)?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// The three programs a match runs: one per team plus the pre-kickoff
/// walk-on routine.
#[derive(Debug, Clone)]
pub struct CompiledPrograms {
    pub own: Arc<CompiledProgram>,
    pub opp: Arc<CompiledProgram>,
    pub entering: Arc<CompiledProgram>,
}

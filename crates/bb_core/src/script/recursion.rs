//! Authoring-time recursion safety checker.
//!
//! The block language has no loop construct, so the only way an authored
//! program can fail to terminate is an action definition that transitively
//! calls itself. That must be rejected when the blocks are connected, not
//! when the program runs: a tick-time stack overflow would take the whole
//! match down.
//!
//! The walk goes *upward*: starting from a call block, take the called
//! name as the root of the path, find the innermost enclosing definition,
//! then continue from every call site of that definition. Reaching a name
//! already on the upward path proves a cycle; definitions proven safe are
//! memoized, so the finite graph guarantees the walk halts either way.

use std::collections::{BTreeMap, BTreeSet};

use super::blocks::{BlockProgram, Stmt, StmtKind};

/// A rejected edit, naming the first definition re-encountered on the
/// upward walk. Surfaced to the author as a correctable condition: the
/// connecting move is undone, nothing crashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecursionViolation {
    pub action: String,
}

/// Where calls to each action name appear: the enclosing definition name,
/// or `None` for a call site at event-handler level.
type CallSites = BTreeMap<String, Vec<Option<String>>>;

fn collect_calls(body: &[Stmt], enclosing: Option<&str>, sites: &mut CallSites) {
    for stmt in body {
        match &stmt.kind {
            StmtKind::CallAction { name } => {
                sites.entry(name.clone()).or_default().push(enclosing.map(str::to_owned));
            }
            StmtKind::If { then, otherwise, .. } => {
                collect_calls(then, enclosing, sites);
                collect_calls(otherwise, enclosing, sites);
            }
            _ => {}
        }
    }
}

/// Serializes the program graph into a call-site lookup.
fn call_sites(program: &BlockProgram) -> CallSites {
    let mut sites = CallSites::new();
    for handler in &program.events {
        collect_calls(&handler.body, None, &mut sites);
    }
    for action in &program.actions {
        collect_calls(&action.body, Some(&action.name), &mut sites);
    }
    sites
}

fn walk_up(
    sites: &CallSites,
    enclosing: Option<&str>,
    path: &mut Vec<String>,
    safe: &mut BTreeSet<String>,
) -> Result<(), RecursionViolation> {
    let enclosing = match enclosing {
        Some(name) => name,
        // Event-level call sites cannot be called back into.
        None => return Ok(()),
    };
    if path.iter().any(|seen| seen == enclosing) {
        return Err(RecursionViolation { action: enclosing.to_owned() });
    }
    if safe.contains(enclosing) {
        return Ok(());
    }
    path.push(enclosing.to_owned());
    if let Some(callers) = sites.get(enclosing) {
        for caller in callers {
            walk_up(sites, caller.as_deref(), path, safe)?;
        }
    }
    path.pop();
    safe.insert(enclosing.to_owned());
    Ok(())
}

/// Editor-facing check: would connecting a call to `called_action` under
/// `enclosing_action` (or under an event handler, when `None`) create a
/// cycle in `program`?
pub fn check_insertion(
    program: &BlockProgram,
    enclosing_action: Option<&str>,
    called_action: &str,
) -> Result<(), RecursionViolation> {
    let sites = call_sites(program);
    let mut path = vec![called_action.to_owned()];
    walk_up(&sites, enclosing_action, &mut path, &mut BTreeSet::new())
}

/// Whole-graph validation: every call block is checked as if it had just
/// been connected. Used by `compile` before a program is ever executed.
pub fn check_program(program: &BlockProgram) -> Result<(), RecursionViolation> {
    let sites = call_sites(program);
    for (called, enclosings) in &sites {
        for enclosing in enclosings {
            let mut path = vec![called.clone()];
            walk_up(&sites, enclosing.as_deref(), &mut path, &mut BTreeSet::new())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::blocks::{ActionDef, EventHandler, EventTrigger, TargetExpr};

    fn call(name: &str) -> Stmt {
        Stmt { id: None, kind: StmtKind::CallAction { name: name.to_owned() } }
    }

    fn action(name: &str, body: Vec<Stmt>) -> ActionDef {
        ActionDef { name: name.to_owned(), body }
    }

    fn move_stmt() -> Stmt {
        Stmt { id: None, kind: StmtKind::Move { target: TargetExpr::Ball } }
    }

    #[test]
    fn test_direct_recursion_names_the_action() {
        let program = BlockProgram {
            events: vec![],
            actions: vec![action("a", vec![call("a")])],
        };
        let err = check_program(&program).unwrap_err();
        assert_eq!(err.action, "a");
    }

    #[test]
    fn test_mutual_recursion_names_first_reencountered() {
        let program = BlockProgram {
            events: vec![],
            actions: vec![action("a", vec![call("b")]), action("b", vec![call("a")])],
        };
        // Checking the call to "a" inside "b": the path starts at [a],
        // walks up to b, then to b's caller a, which repeats.
        let err = check_insertion(&program, Some("b"), "a").unwrap_err();
        assert_eq!(err.action, "a");
    }

    #[test]
    fn test_dag_of_calls_is_accepted() {
        let program = BlockProgram {
            events: vec![EventHandler {
                trigger: EventTrigger::BallNone,
                body: vec![call("a"), call("b")],
            }],
            actions: vec![
                action("a", vec![call("c"), move_stmt()]),
                action("b", vec![call("c")]),
                action("c", vec![move_stmt()]),
            ],
        };
        assert!(check_program(&program).is_ok());
    }

    #[test]
    fn test_cycle_through_if_branch_is_found() {
        let nested = Stmt {
            id: None,
            kind: StmtKind::If {
                cond: crate::script::blocks::CondExpr::Closest { to: TargetExpr::Ball },
                then: vec![call("a")],
                otherwise: vec![],
            },
        };
        let program = BlockProgram {
            events: vec![],
            actions: vec![action("a", vec![call("b")]), action("b", vec![nested])],
        };
        assert!(check_program(&program).is_err());
    }

    #[test]
    fn test_event_level_call_terminates_walk() {
        let program = BlockProgram {
            events: vec![EventHandler { trigger: EventTrigger::BallMine, body: vec![call("a")] }],
            actions: vec![action("a", vec![move_stmt()])],
        };
        assert!(check_insertion(&program, None, "a").is_ok());
    }
}

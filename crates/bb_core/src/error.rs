//! Engine error taxonomy.
//!
//! Script *runtime* faults are deliberately not part of this enum: they are
//! contained inside a single player's turn (see `script::interp`) and never
//! surface to the engine API.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// An authored program would let an action call itself, directly or
    /// through other actions. Carries the first re-encountered action name
    /// so the editor can point at the offending definition.
    #[error("action '{0}' would call itself")]
    RecursiveAction(String),

    /// A call block references an action definition that does not exist.
    #[error("unknown action '{0}'")]
    UnknownAction(String),

    /// A grid block addresses a cell outside the 5x5 field. 0 is only
    /// valid as a wildcard axis in grid conditions, never as a target.
    #[error("grid cell ({col}, {row}) is outside the field")]
    GridIndexOutOfRange { col: u8, row: u8 },

    /// A behavior program could not be parsed; the match must not start.
    #[error("behavior program failed to load: {0}")]
    ProgramLoad(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

//! Errors surfaced by `dispatch`

use thiserror::Error;

/// Boxed error type produced by failing commands.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a dispatch call failed.
///
/// A failure never rolls back a state commit that already happened; it is
/// reported once the rest of the command chain has drained.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A command settled with an error.
    #[error("command failed: {0}")]
    Command(#[source] BoxError),

    /// The host dropped the commit signal without completing it.
    #[error("state host dropped the commit signal before acknowledging the commit")]
    CommitDropped,

    /// An action was reached through more command hops than the configured limit.
    #[error("action `{action}` reached at chain depth {depth}, limit is {limit}")]
    ChainTooDeep {
        action: &'static str,
        depth: usize,
        limit: usize,
    },
}

impl DispatchError {
    /// Returns the command's own error, if this is a command failure.
    pub fn command_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            DispatchError::Command(source) => Some(source.as_ref()),
            _ => None,
        }
    }
}

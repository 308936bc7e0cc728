//! Router error types.

use shared_types::{CommandName, ServiceName};
use thiserror::Error;

/// Registry or router construction failures. All are startup errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// Declared commands without a handler.
    #[error("service '{service}' has no handler for: {missing:?}")]
    MissingHandlers {
        service: ServiceName,
        missing: Vec<CommandName>,
    },

    /// A handler was registered for a command another service owns.
    #[error("command '{command}' does not belong to service '{service}'")]
    ForeignCommand {
        service: ServiceName,
        command: CommandName,
    },

    /// Two handlers registered for one command.
    #[error("duplicate handler for command '{0}'")]
    DuplicateHandler(CommandName),

    /// Concurrency of zero would never process anything.
    #[error("router concurrency must be greater than zero")]
    ZeroConcurrency,

    #[error("router concurrency {requested} exceeds the maximum of {max}")]
    ConcurrencyTooHigh { requested: usize, max: usize },
}
